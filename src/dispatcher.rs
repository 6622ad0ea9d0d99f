//! The event dispatcher: maps one timer event to at most one action.
//!
//! Each call to [`Dispatcher::dispatch`] reads the settings row afresh, then
//! picks exactly one of: request a forced shutdown, send one email, do
//! nothing, or log a warning about an unknown event. Nothing is retained
//! between calls.

use crate::{
    config::Config,
    core::{
        ConfigStore, EventContext, EventLog, HostInfo, Mailer, NotificationConfig, Outcome,
        Severity, ShutdownPolicy, ShutdownRequester, UpsEvent,
    },
    error::DispatchError,
    event_log::TracingEventLog,
    host::SystemHost,
    notification::LettreMailer,
    shutdown::CommandShutdownRequester,
    store::SqliteConfigStore,
    subject,
};
use anyhow::Result;
use chrono::format::{Item, StrftimeItems};
use std::sync::Arc;
use tracing::{debug, instrument};

/// A ready-to-run dispatcher with all of its collaborators.
pub struct Dispatcher {
    store: Arc<dyn ConfigStore>,
    mailer: Arc<dyn Mailer>,
    shutdown: Arc<dyn ShutdownRequester>,
    event_log: Arc<dyn EventLog>,
    host: Arc<dyn HostInfo>,
    date_format: String,
}

impl Dispatcher {
    /// Creates a new `DispatcherBuilder` to construct a `Dispatcher`.
    pub fn builder(config: Config) -> DispatcherBuilder {
        DispatcherBuilder::new(config)
    }

    /// Handles one invocation.
    ///
    /// Every failure is written to the event log before it is returned.
    #[instrument(skip(self, context), fields(notify_type = %context.notify_type, ups = %context.ups_name))]
    pub async fn dispatch(
        &self,
        event_name: Option<&str>,
        context: &EventContext,
    ) -> Result<Outcome, DispatchError> {
        let result = self.handle(event_name, context).await;
        if let Err(e) = &result {
            self.event_log.record(Severity::Error, &e.to_string());
        }
        result
    }

    async fn handle(
        &self,
        event_name: Option<&str>,
        context: &EventContext,
    ) -> Result<Outcome, DispatchError> {
        let name = match event_name {
            Some(name) if !name.trim().is_empty() => name,
            _ => return Err(DispatchError::InvalidInvocation),
        };
        let event = UpsEvent::parse(name);
        let config = self.load_config().await?;
        debug!(%event, row = config.id, "Dispatching UPS event");

        match event {
            UpsEvent::OnBattery => {
                if config.shutdown_policy != ShutdownPolicy::OnBattery {
                    return Ok(Outcome::Skipped);
                }
                self.event_log.record(Severity::Info, "issuing shutdown");
                self.shutdown
                    .request_shutdown()
                    .await
                    .map_err(|e| DispatchError::ShutdownRequestFailed(format!("{e:#}")))?;
                Ok(Outcome::ShutdownRequested)
            }
            UpsEvent::Email | UpsEvent::CommBad | UpsEvent::CommOk => {
                if !config.email_notify_enabled {
                    return Ok(Outcome::Skipped);
                }
                self.notify(&config, context).await?;
                Ok(Outcome::NotificationSent)
            }
            // Power came back after a timer already fired; the ONBATT
            // notification has been sent, so there is nothing left to do.
            UpsEvent::Online => Ok(Outcome::Skipped),
            UpsEvent::Unrecognized(name) => {
                self.event_log
                    .record(Severity::Warning, &format!("Unrecognized command: {name}"));
                Ok(Outcome::Unrecognized(name))
            }
        }
    }

    async fn load_config(&self) -> Result<NotificationConfig, DispatchError> {
        match self.store.latest().await {
            Ok(Some(config)) => Ok(config),
            Ok(None) => Err(DispatchError::ConfigUnavailable(
                "no UPS settings row found".to_string(),
            )),
            Err(e) => Err(DispatchError::ConfigUnavailable(format!("{e:#}"))),
        }
    }

    async fn notify(
        &self,
        config: &NotificationConfig,
        context: &EventContext,
    ) -> Result<(), DispatchError> {
        let date = self.host.now().format(&self.date_format).to_string();
        let subject = subject::render(&config.subject_template, &date, &self.host.hostname());

        self.mailer
            .send(&subject, &context.message_body(), &config.to_email)
            .await
            // Transport errors already print their cause.
            .map_err(|e| DispatchError::NotificationFailed(e.to_string()))
    }
}

/// Builder for the dispatcher.
///
/// By default every collaborator is built from the configuration; each one
/// can be overridden, which is how tests substitute fakes.
pub struct DispatcherBuilder {
    config: Config,
    store_override: Option<Arc<dyn ConfigStore>>,
    mailer_override: Option<Arc<dyn Mailer>>,
    shutdown_override: Option<Arc<dyn ShutdownRequester>>,
    event_log_override: Option<Arc<dyn EventLog>>,
    host_override: Option<Arc<dyn HostInfo>>,
}

impl DispatcherBuilder {
    /// Creates a new `DispatcherBuilder` with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            store_override: None,
            mailer_override: None,
            shutdown_override: None,
            event_log_override: None,
            host_override: None,
        }
    }

    /// Overrides the configuration store.
    pub fn store_override(mut self, store: Arc<dyn ConfigStore>) -> Self {
        self.store_override = Some(store);
        self
    }

    /// Overrides the mail transport.
    pub fn mailer_override(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer_override = Some(mailer);
        self
    }

    /// Overrides the shutdown requester.
    pub fn shutdown_override(mut self, shutdown: Arc<dyn ShutdownRequester>) -> Self {
        self.shutdown_override = Some(shutdown);
        self
    }

    /// Overrides the event log.
    pub fn event_log_override(mut self, event_log: Arc<dyn EventLog>) -> Self {
        self.event_log_override = Some(event_log);
        self
    }

    /// Overrides the clock and host name.
    pub fn host_override(mut self, host: Arc<dyn HostInfo>) -> Self {
        self.host_override = Some(host);
        self
    }

    /// Builds any collaborators that were not overridden.
    pub fn build(self) -> Result<Dispatcher> {
        let config = self.config;

        let date_format = config.mail.date_format.clone();
        if StrftimeItems::new(&date_format).any(|item| matches!(item, Item::Error)) {
            anyhow::bail!("invalid mail.date_format: {date_format}");
        }

        let store = match self.store_override {
            Some(store) => store,
            None => Arc::new(SqliteConfigStore::from_config(&config.database)),
        };
        let mailer = match self.mailer_override {
            Some(mailer) => mailer,
            None => Arc::new(LettreMailer::from_config(&config.mail)?),
        };
        let shutdown = match self.shutdown_override {
            Some(shutdown) => shutdown,
            None => Arc::new(CommandShutdownRequester::from_config(&config.shutdown)),
        };
        let event_log = match self.event_log_override {
            Some(event_log) => event_log,
            None => Arc::new(TracingEventLog::new(config.log_tag.clone())),
        };
        let host = match self.host_override {
            Some(host) => host,
            None => Arc::new(SystemHost),
        };

        Ok(Dispatcher {
            store,
            mailer,
            shutdown,
            event_log,
            host,
            date_format,
        })
    }
}
