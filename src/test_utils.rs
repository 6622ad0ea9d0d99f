//! In-memory collaborators for exercising the dispatcher without a database,
//! a mail relay or a monitoring daemon.

use crate::core::{
    ConfigStore, EventLog, HostInfo, Mailer, NotificationConfig, Severity, ShutdownRequester,
};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

/// Fake configuration store returning a fixed answer.
pub struct FakeConfigStore {
    response: Result<Option<NotificationConfig>, String>,
    reads: AtomicUsize,
}

impl FakeConfigStore {
    pub fn with_row(row: NotificationConfig) -> Self {
        Self::new(Ok(Some(row)))
    }

    pub fn failing(error: &str) -> Self {
        Self::new(Err(error.to_string()))
    }

    fn new(response: Result<Option<NotificationConfig>, String>) -> Self {
        Self {
            response,
            reads: AtomicUsize::new(0),
        }
    }

    /// How many times `latest` was called.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfigStore for FakeConfigStore {
    async fn latest(&self) -> Result<Option<NotificationConfig>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.response.clone().map_err(|e| anyhow!(e))
    }
}

/// One message handed to [`RecordingMailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub subject: String,
    pub body: String,
    pub recipient: String,
}

/// Records sent mail, or fails every send once `fail_with` was called.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
    failure: Mutex<Option<String>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(&self, error: &str) {
        *self.failure.lock().unwrap() = Some(error.to_string());
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, subject: &str, body: &str, recipient: &str) -> Result<()> {
        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(anyhow!(error));
        }
        self.sent.lock().unwrap().push(SentMail {
            subject: subject.to_string(),
            body: body.to_string(),
            recipient: recipient.to_string(),
        });
        Ok(())
    }
}

/// Counts shutdown requests. Failed requests are counted too.
#[derive(Default)]
pub struct RecordingShutdown {
    requests: AtomicUsize,
    failure: Mutex<Option<String>>,
}

impl RecordingShutdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(&self, error: &str) {
        *self.failure.lock().unwrap() = Some(error.to_string());
    }

    pub fn count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ShutdownRequester for RecordingShutdown {
    async fn request_shutdown(&self) -> Result<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        match self.failure.lock().unwrap().clone() {
            Some(error) => Err(anyhow!(error)),
            None => Ok(()),
        }
    }
}

/// Keeps every event-log entry in memory.
#[derive(Default, Clone)]
pub struct RecordingEventLog {
    entries: Arc<Mutex<Vec<(Severity, String)>>>,
}

impl RecordingEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Severity, String)> {
        self.entries.lock().unwrap().clone()
    }

    /// Number of entries with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| *s == severity)
            .count()
    }
}

impl EventLog for RecordingEventLog {
    fn record(&self, severity: Severity, message: &str) {
        self.entries
            .lock()
            .unwrap()
            .push((severity, message.to_string()));
    }
}

/// A stopped clock and a fixed host name.
pub struct FixedHost {
    now: DateTime<Local>,
    hostname: String,
}

impl FixedHost {
    /// `local_time` is `YYYY-MM-DDTHH:MM:SS` in the local time zone.
    pub fn new(local_time: &str, hostname: &str) -> Self {
        let naive = NaiveDateTime::parse_from_str(local_time, "%Y-%m-%dT%H:%M:%S")
            .expect("valid timestamp");
        let now = Local
            .from_local_datetime(&naive)
            .earliest()
            .expect("local time exists");
        Self {
            now,
            hostname: hostname.to_string(),
        }
    }
}

impl HostInfo for FixedHost {
    fn now(&self) -> DateTime<Local> {
        self.now
    }

    fn hostname(&self) -> String {
        self.hostname.clone()
    }
}
