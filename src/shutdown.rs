//! Forced-shutdown requests to the UPS monitoring daemon.
//!
//! The request is a control call (`upsmon -c fsd` by default). Its success only
//! means the daemon accepted the request; carrying out the shutdown is the
//! daemon's job.

use crate::config::ShutdownConfig;
use crate::core::ShutdownRequester;
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Requests a shutdown by running the daemon's control command.
#[derive(Debug, Clone)]
pub struct CommandShutdownRequester {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandShutdownRequester {
    pub fn new(command: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(config: &ShutdownConfig) -> Self {
        Self::new(
            config.command.clone(),
            config.args.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }
}

#[async_trait]
impl ShutdownRequester for CommandShutdownRequester {
    #[instrument(skip(self), fields(command = %self.command))]
    async fn request_shutdown(&self) -> Result<()> {
        let child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("cannot run {}", self.command))?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output.with_context(|| format!("{} did not complete", self.command))?,
            Err(_) => bail!("{} timed out after {:?}", self.command, self.timeout),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            );
        }

        debug!("Monitoring daemon accepted the shutdown request");
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn requester(command: &str, args: &[&str], timeout: Duration) -> CommandShutdownRequester {
        CommandShutdownRequester::new(
            command,
            args.iter().map(|a| a.to_string()).collect(),
            timeout,
        )
    }

    #[tokio::test]
    async fn test_zero_exit_is_success() {
        let r = requester("true", &[], Duration::from_secs(5));
        assert!(r.request_shutdown().await.is_ok());
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_failure() {
        let r = requester("false", &[], Duration::from_secs(5));
        let err = r.request_shutdown().await.unwrap_err();
        assert!(err.to_string().contains("exited with"));
    }

    #[tokio::test]
    async fn test_stderr_is_reported() {
        let r = requester(
            "sh",
            &["-c", "echo 'upsmon not running' >&2; exit 1"],
            Duration::from_secs(5),
        );
        let err = r.request_shutdown().await.unwrap_err();
        assert!(err.to_string().contains("upsmon not running"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_failure() {
        let r = requester("/nonexistent/upsmon", &["-c", "fsd"], Duration::from_secs(5));
        let err = r.request_shutdown().await.unwrap_err();
        assert!(err.to_string().contains("cannot run"));
    }

    #[tokio::test]
    async fn test_hung_daemon_is_bounded() {
        let r = requester("sleep", &["10"], Duration::from_millis(200));
        let err = r.request_shutdown().await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
