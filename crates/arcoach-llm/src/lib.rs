//! OpenAI-compatible chat-completions client used to write nudge messages.

pub mod client;
pub mod error;

pub use client::LlmClient;
pub use error::LlmError;
