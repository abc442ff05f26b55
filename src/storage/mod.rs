//! Storage Layer
//!
//! SQLite persistence for prompt history and usage, fed by the engine's
//! event stream through [`Recorder`].

pub mod database;
pub mod history;
pub mod recorder;
pub mod usage;

pub use database::{Database, PoolConfig, SharedDatabase};
pub use history::HistoryStore;
pub use recorder::Recorder;
pub use usage::{StoredUsage, UsageStore, UsageSummary};

use chrono::{DateTime, SecondsFormat, Utc};

/// Fixed-width RFC 3339 so text ordering matches time ordering
pub(crate) fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}
