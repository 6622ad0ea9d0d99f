//! upsdispatch - UPS timer event dispatcher
//!
//! Invoked by the UPS scheduling daemon with one event name. Exits 0 when the
//! event was handled (including no-ops and unknown names), non-zero when the
//! settings could not be read or a required action failed.

use clap::Parser;
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use upsdispatch::{cli::Cli, config::Config, DispatchError, Dispatcher};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration by layering sources: defaults, file, environment, and CLI args.
    let config = match Config::load(&cli) {
        Ok(config) => config,
        Err(err) => {
            // Logging is not configured yet, so fall back to the default filter.
            init_logging("info");
            let err = DispatchError::ConfigUnavailable(format!("{err:#}"));
            error!("Failed to load configuration: {}", err);
            return ExitCode::from(&err);
        }
    };

    init_logging(&config.log_level);
    debug!(database = %config.database.path.display(), transport = ?config.mail.transport, "Configuration loaded");

    let dispatcher = match Dispatcher::builder(config).build() {
        Ok(dispatcher) => dispatcher,
        Err(err) => {
            let err = DispatchError::ConfigUnavailable(format!("{err:#}"));
            error!("Failed to initialize dispatcher: {}", err);
            return ExitCode::from(&err);
        }
    };

    match dispatcher
        .dispatch(cli.event.as_deref(), &cli.event_context())
        .await
    {
        Ok(outcome) => {
            debug!(?outcome, "Event handled");
            ExitCode::SUCCESS
        }
        Err(err) => ExitCode::from(&err),
    }
}

/// Installs the stderr subscriber. `RUST_LOG` takes precedence over `level`.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(false),
        )
        .with(filter)
        .init();
}
