//! Outbound notifications.
//!
//! The dispatcher only depends on the `Mailer` trait from `core`; this module
//! holds the production implementation backed by `lettre`.
pub mod mail;

pub use mail::LettreMailer;
