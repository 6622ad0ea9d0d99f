//! Host facts used in notification subjects.

use crate::core::HostInfo;
use chrono::{DateTime, Local};
use tracing::warn;

/// Reads the wall clock and the system host name.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl HostInfo for SystemHost {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn hostname(&self) -> String {
        match hostname::get() {
            Ok(name) => name.to_string_lossy().into_owned(),
            Err(e) => {
                warn!(error = %e, "Cannot read host name, using localhost");
                "localhost".to_string()
            }
        }
    }
}
