//! Google Sheets backing for ARC: the pipeline sheet as a [`PipelineSource`]
//! and the hidden nudge log as a [`NudgeHistoryStore`].
//!
//! [`PipelineSource`]: arcoach_core::PipelineSource
//! [`NudgeHistoryStore`]: arcoach_core::NudgeHistoryStore

pub mod client;
pub mod error;
pub mod nudge_log;
pub mod pipeline;

pub use client::{a1_range, quote_sheet_name, SheetsClient};
pub use error::SheetsError;
pub use nudge_log::SheetNudgeLog;
pub use pipeline::SheetPipelineSource;
