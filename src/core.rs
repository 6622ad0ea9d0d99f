//! Core domain types and collaborator traits for the UPS event dispatcher
//!
//! This module defines the data read from the configuration store, the fixed
//! event vocabulary, and the trait contracts through which the dispatcher
//! talks to the outside world.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The UPS notification settings row, as stored by the configuration UI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct NotificationConfig {
    /// Row identifier. The highest identifier is the authoritative row.
    pub id: i64,
    /// Whether email notifications are sent at all
    pub email_notify_enabled: bool,
    /// Recipient address, or several separated by `;` or `,`
    pub to_email: String,
    /// Subject line with `%d` (date) and `%h` (hostname) placeholders
    pub subject_template: String,
    /// When the host should be shut down
    pub shutdown_policy: ShutdownPolicy,
}

/// The stored shutdown mode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ShutdownPolicy {
    /// `batt`: shut down as soon as the UPS reports it is on battery.
    OnBattery,
    /// `lowbatt`: leave it to the monitoring daemon's low-battery handling.
    #[default]
    LowBattery,
    /// Any other stored value.
    Other(String),
}

impl ShutdownPolicy {
    pub fn parse(value: &str) -> Self {
        match value {
            "batt" => Self::OnBattery,
            "lowbatt" => Self::LowBattery,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ShutdownPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnBattery => write!(f, "batt"),
            Self::LowBattery => write!(f, "lowbatt"),
            Self::Other(value) => write!(f, "{}", value),
        }
    }
}

/// A timer event name, as passed by the scheduling daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsEvent {
    /// `ONBATT`: the UPS switched to battery power.
    OnBattery,
    /// `EMAIL`: generic notification timer.
    Email,
    /// `COMMBAD`: communication with the UPS was lost.
    CommBad,
    /// `COMMOK`: communication with the UPS was restored.
    CommOk,
    /// `ONLINE`: line power restored.
    Online,
    /// Anything outside the vocabulary. Matching is case-sensitive.
    Unrecognized(String),
}

impl UpsEvent {
    pub fn parse(name: &str) -> Self {
        match name {
            "ONBATT" => Self::OnBattery,
            "EMAIL" => Self::Email,
            "COMMBAD" => Self::CommBad,
            "COMMOK" => Self::CommOk,
            "ONLINE" => Self::Online,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

impl fmt::Display for UpsEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OnBattery => "ONBATT",
            Self::Email => "EMAIL",
            Self::CommBad => "COMMBAD",
            Self::CommOk => "COMMOK",
            Self::Online => "ONLINE",
            Self::Unrecognized(name) => name,
        };
        f.write_str(name)
    }
}

/// Display-only context supplied by the calling daemon.
///
/// Neither field is ever inspected for control decisions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventContext {
    /// Human-readable description of the event (`NOTIFYTYPE`)
    pub notify_type: String,
    /// Identifier of the UPS unit (`UPSNAME`)
    pub ups_name: String,
}

impl EventContext {
    pub fn new(notify_type: impl Into<String>, ups_name: impl Into<String>) -> Self {
        Self {
            notify_type: notify_type.into(),
            ups_name: ups_name.into(),
        }
    }

    /// The notification body: `"<notifyType> - <upsName>"`.
    pub fn message_body(&self) -> String {
        format!("{} - {}", self.notify_type, self.ups_name)
    }
}

/// What a successful dispatch did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A forced shutdown was requested from the monitoring daemon.
    ShutdownRequested,
    /// One notification email was handed to the mail transport.
    NotificationSent,
    /// A recognized event whose action is disabled or a no-op.
    Skipped,
    /// The event name is outside the vocabulary; a warning was logged.
    Unrecognized(String),
}

/// Severity of an event-log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

// =============================================================================
// Collaborator Traits
// =============================================================================

/// Reads the authoritative notification settings.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Fetches the most recently inserted row.
    ///
    /// # Returns
    /// * `Ok(Some(config))` with the row of highest identifier
    /// * `Ok(None)` if the store holds no rows
    /// * `Err` if the store cannot be reached or read
    async fn latest(&self) -> Result<Option<NotificationConfig>>;
}

/// Sends a notification email.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends one plain-text message.
    ///
    /// # Arguments
    /// * `subject` - The fully substituted subject line
    /// * `body` - The message body
    /// * `recipient` - Destination address(es) as stored in the settings row
    async fn send(&self, subject: &str, body: &str, recipient: &str) -> Result<()>;
}

/// Asks the UPS monitoring daemon to begin a forced shutdown.
#[async_trait]
pub trait ShutdownRequester: Send + Sync {
    /// Issues the request. Success only means the daemon accepted it.
    async fn request_shutdown(&self) -> Result<()>;
}

/// Accepts tagged, human-readable log entries. Fire-and-forget.
pub trait EventLog: Send + Sync {
    fn record(&self, severity: Severity, message: &str);
}

/// Supplies the current time and host name for subject substitution.
pub trait HostInfo: Send + Sync {
    fn now(&self) -> DateTime<Local>;
    fn hostname(&self) -> String;
}
