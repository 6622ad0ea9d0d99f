//! SQLite-backed configuration store.
//!
//! The UPS settings live in the `services_ups` table of the appliance's
//! configuration database, which is owned and written by the configuration
//! UI. The dispatcher opens it read-only on every fetch and never caches a
//! row, so a policy change takes effect on the very next event.

use crate::config::DatabaseConfig;
use crate::core::{ConfigStore, NotificationConfig, ShutdownPolicy};
use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task;
use tracing::{debug, instrument};

/// Selects the row of highest identifier.
const LATEST_ROW_SQL: &str = "SELECT id, ups_emailnotify, ups_toemail, ups_subject, ups_shutdown \
     FROM services_ups ORDER BY id DESC LIMIT 1";

/// Reads the UPS settings from a SQLite database file.
#[derive(Debug, Clone)]
pub struct SqliteConfigStore {
    path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteConfigStore {
    pub fn new(path: impl Into<PathBuf>, busy_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            busy_timeout,
        }
    }

    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self::new(
            config.path.clone(),
            Duration::from_millis(config.busy_timeout_ms),
        )
    }

    /// Opens the database and reads the latest row in a blocking manner.
    fn fetch_latest(path: &Path, busy_timeout: Duration) -> Result<Option<NotificationConfig>> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("cannot open {}", path.display()))?;
        conn.busy_timeout(busy_timeout)?;

        let row = conn
            .query_row(LATEST_ROW_SQL, [], row_to_config)
            .optional()
            .context("cannot query services_ups")?;
        Ok(row)
    }
}

fn row_to_config(row: &Row) -> rusqlite::Result<NotificationConfig> {
    let shutdown: Option<String> = row.get(4)?;
    Ok(NotificationConfig {
        id: row.get(0)?,
        email_notify_enabled: row.get::<_, Option<i64>>(1)?.unwrap_or(0) != 0,
        to_email: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        subject_template: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        shutdown_policy: ShutdownPolicy::parse(shutdown.as_deref().unwrap_or_default()),
    })
}

#[async_trait]
impl ConfigStore for SqliteConfigStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn latest(&self) -> Result<Option<NotificationConfig>> {
        let path = self.path.clone();
        let busy_timeout = self.busy_timeout;
        let row = task::spawn_blocking(move || Self::fetch_latest(&path, busy_timeout))
            .await
            .context("configuration read task failed")??;

        match &row {
            Some(config) => debug!(id = config.id, "Loaded UPS settings row"),
            None => debug!("services_ups holds no rows"),
        }
        Ok(row)
    }
}
