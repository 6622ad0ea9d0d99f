//! Configuration management for the dispatcher
//!
//! This module defines the `Config` struct holding the dispatcher's own
//! settings: where the UPS settings database lives and how to reach the mail
//! and shutdown collaborators. It uses the `figment` crate to layer defaults,
//! an optional TOML file, environment variables and command-line overrides.
//!
//! The UPS notification settings themselves are not part of this struct; they
//! are read from the database on every invocation (see `store`).

use crate::cli::Cli;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Used when `--config` is not given. Skipped if the file does not exist.
pub const DEFAULT_CONFIG_PATH: &str = "/usr/local/etc/upsdispatch.toml";

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// The logging level for the application.
    pub log_level: String,
    /// Tag attached to every event-log entry.
    pub log_tag: String,
    /// Location of the UPS settings database.
    pub database: DatabaseConfig,
    /// Mail transport settings.
    pub mail: MailConfig,
    /// How to request a forced shutdown from the monitoring daemon.
    pub shutdown: ShutdownConfig,
}

/// Location of the UPS settings database.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite file holding the `services_ups` table.
    pub path: PathBuf,
    /// How long to wait for a locked database before giving up.
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/data/freenas-v1.db"),
            busy_timeout_ms: 5000,
        }
    }
}

/// The mail transport to hand notifications to.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MailTransportKind {
    /// Pipe the message to the local sendmail binary.
    #[default]
    Sendmail,
    /// Submit the message to an SMTP relay.
    Smtp,
}

/// Mail transport settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct MailConfig {
    pub transport: MailTransportKind,
    /// Sender mailbox, e.g. `UPS Monitor <root@nas.local>`.
    pub from: String,
    /// Path of the sendmail binary.
    pub sendmail_command: String,
    /// SMTP relay settings, used when `transport = "smtp"`.
    pub smtp: SmtpConfig,
    /// Upper bound on a single send.
    pub timeout_seconds: u64,
    /// `chrono` format string used for the `%d` subject placeholder.
    pub date_format: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            transport: MailTransportKind::Sendmail,
            from: "root@localhost".to_string(),
            sendmail_command: "/usr/sbin/sendmail".to_string(),
            smtp: SmtpConfig::default(),
            timeout_seconds: 30,
            date_format: "%a %b %e %H:%M:%S %Z %Y".to_string(),
        }
    }
}

/// SMTP relay settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Upgrade the connection with STARTTLS.
    pub starttls: bool,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 25,
            username: None,
            password: None,
            starttls: false,
        }
    }
}

/// How to request a forced shutdown from the monitoring daemon.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ShutdownConfig {
    /// The daemon's control binary.
    pub command: String,
    /// Arguments that request a forced shutdown.
    pub args: Vec<String>,
    /// Upper bound on the control call.
    pub timeout_seconds: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            command: "/usr/local/sbin/upsmon".to_string(),
            args: vec!["-c".to_string(), "fsd".to_string()],
            timeout_seconds: 30,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_tag: "upssched-cmd".to_string(),
            database: DatabaseConfig::default(),
            mail: MailConfig::default(),
            shutdown: ShutdownConfig::default(),
        }
    }
}

impl Config {
    /// Loads the configuration by layering sources: defaults, TOML file,
    /// environment, and CLI args.
    ///
    /// An explicit `--config` file must exist; the default path is optional.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        match &cli.config {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("configuration file not found: {}", path.display());
                }
                figment = figment.merge(Toml::file(path));
            }
            None => figment = figment.merge(Toml::file(DEFAULT_CONFIG_PATH)),
        }

        let config: Config = figment
            // e.g. UPSDISPATCH_DATABASE__PATH=/tmp/test.db
            .merge(Env::prefixed("UPSDISPATCH_").split("__"))
            .merge(cli.clone())
            .extract()?;
        Ok(config)
    }
}
