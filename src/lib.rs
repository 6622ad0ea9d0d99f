//! upsdispatch - UPS timer event dispatcher
//!
//! The UPS scheduling daemon runs this once per fired timer with the event
//! name as its argument. The dispatcher reads the current UPS notification
//! settings and turns the event into a forced-shutdown request, a notification
//! email, or nothing.

pub mod cli;
pub mod config;
pub mod core;
pub mod dispatcher;
pub mod error;
pub mod event_log;
pub mod host;
pub mod notification;
pub mod shutdown;
pub mod store;
pub mod subject;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export core types for convenience
pub use crate::core::*;
pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use error::DispatchError;
