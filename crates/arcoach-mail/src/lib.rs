//! SendGrid-compatible v3 mail-send client used to deliver nudges.

pub mod client;
pub mod error;

pub use client::MailClient;
pub use error::MailError;
