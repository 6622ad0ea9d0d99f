#![allow(dead_code)]
//! Shared fixtures for integration tests.

use rusqlite::{params, Connection};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use upsdispatch::{
    config::Config,
    core::ConfigStore,
    test_utils::{FixedHost, RecordingEventLog, RecordingMailer, RecordingShutdown},
    Dispatcher,
};

pub const TEST_HOSTNAME: &str = "nas01";
pub const TEST_TIME: &str = "2026-10-18T09:30:00";

/// A temporary settings database with the `services_ups` table.
pub struct UpsSettingsDb {
    _dir: TempDir,
    pub path: PathBuf,
}

impl UpsSettingsDb {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("freenas-v1.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch(
                "CREATE TABLE services_ups (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    ups_emailnotify BOOL NOT NULL,
                    ups_toemail VARCHAR(120) NOT NULL,
                    ups_subject VARCHAR(120) NOT NULL,
                    ups_shutdown VARCHAR(120) NOT NULL
                );",
            )
            .unwrap();
        Self { _dir: dir, path }
    }

    /// Inserts a row the way the configuration UI does and returns its id.
    pub fn insert(&self, email: bool, to: &str, subject: &str, shutdown: &str) -> i64 {
        let conn = Connection::open(&self.path).unwrap();
        conn.execute(
            "INSERT INTO services_ups (ups_emailnotify, ups_toemail, ups_subject, ups_shutdown)
             VALUES (?1, ?2, ?3, ?4)",
            params![email, to, subject, shutdown],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    pub fn config(&self) -> Config {
        let mut config = Config::default();
        config.database.path = self.path.clone();
        config.database.busy_timeout_ms = 200;
        config.mail.date_format = "%Y-%m-%d %H:%M:%S".to_string();
        config
    }
}

/// A dispatcher wired to recording collaborators.
pub struct TestDispatcher {
    pub dispatcher: Dispatcher,
    pub mailer: Arc<RecordingMailer>,
    pub shutdown: Arc<RecordingShutdown>,
    pub log: Arc<RecordingEventLog>,
}

impl TestDispatcher {
    /// Uses the real SQLite store configured in `config`.
    pub fn new(config: Config) -> Self {
        Self::build(config, None)
    }

    pub fn with_store(config: Config, store: Arc<dyn ConfigStore>) -> Self {
        Self::build(config, Some(store))
    }

    fn build(config: Config, store: Option<Arc<dyn ConfigStore>>) -> Self {
        let mailer = Arc::new(RecordingMailer::new());
        let shutdown = Arc::new(RecordingShutdown::new());
        let log = Arc::new(RecordingEventLog::new());

        let mut builder = Dispatcher::builder(config)
            .mailer_override(mailer.clone())
            .shutdown_override(shutdown.clone())
            .event_log_override(log.clone())
            .host_override(Arc::new(FixedHost::new(TEST_TIME, TEST_HOSTNAME)));
        if let Some(store) = store {
            builder = builder.store_override(store);
        }

        Self {
            dispatcher: builder.build().unwrap(),
            mailer,
            shutdown,
            log,
        }
    }
}
