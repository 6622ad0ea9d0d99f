//! Command-Line Interface (CLI) argument parsing.
//!
//! The scheduling daemon invokes the dispatcher with a single positional event
//! name and passes the display context through the `NOTIFYTYPE` and `UPSNAME`
//! environment variables. The remaining flags are overrides that are merged on
//! top of the TOML file and `UPSDISPATCH_*` environment variables.

use crate::core::EventContext;
use clap::Parser;
use figment::{
    value::{Dict, Map, Tag, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// Dispatches UPS timer events to shutdown requests and email notifications.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The timer event name (ONBATT, EMAIL, COMMBAD, COMMOK, ONLINE).
    #[arg(value_name = "EVENT")]
    pub event: Option<String>,

    /// Path to the TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the SQLite database holding the UPS settings.
    #[arg(long, value_name = "FILE")]
    pub database: Option<PathBuf>,

    /// Logging level (e.g. "debug", "warn").
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Human-readable description of the event.
    #[arg(long, env = "NOTIFYTYPE", default_value = "", hide_env_values = true)]
    pub notify_type: String,

    /// Identifier of the UPS unit.
    #[arg(long, env = "UPSNAME", default_value = "", hide_env_values = true)]
    pub ups_name: String,
}

impl Cli {
    /// The display context passed through by the calling daemon.
    pub fn event_context(&self) -> EventContext {
        EventContext::new(self.notify_type.clone(), self.ups_name.clone())
    }
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(level) = &self.log_level {
            dict.insert("log_level".into(), Value::from(level.clone()));
        }

        if let Some(path) = &self.database {
            let mut database = Dict::new();
            database.insert(
                "path".into(),
                Value::from(path.to_string_lossy().into_owned()),
            );
            dict.insert("database".into(), Value::Dict(Tag::Default, database));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
