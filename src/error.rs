//! Dispatch failure kinds and their process exit codes.

use std::process::ExitCode;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("invalid invocation: an event name argument is required")]
    InvalidInvocation,

    #[error("UPS configuration unavailable: {0}")]
    ConfigUnavailable(String),

    #[error("notification failed: {0}")]
    NotificationFailed(String),

    #[error("shutdown request failed: {0}")]
    ShutdownRequestFailed(String),
}

impl DispatchError {
    /// The sysexits-style code the process exits with for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidInvocation => 64,
            Self::ConfigUnavailable(_) => 78,
            Self::NotificationFailed(_) => 75,
            Self::ShutdownRequestFailed(_) => 70,
        }
    }
}

impl From<&DispatchError> for ExitCode {
    fn from(err: &DispatchError) -> Self {
        ExitCode::from(err.exit_code())
    }
}
