//! Row stores for hourly observations and daily aggregates.
//!
//! Both stores live in memory and persist to CSV tables under the data
//! directory. Whole-table writes go through a temp file and a rename, so a
//! long-running reader can notice the new file and [`Refresh::reload`].

pub mod daily;
pub mod filter;
pub mod hourly;
pub mod table;

pub use daily::DailyStore;
pub use filter::{Page, PageRequest, RecordFilter};
pub use hourly::{HourlyStore, InsertSummary};

use crate::error::Result;
use std::path::{Path, PathBuf};

/// A file-backed store that can tell when its table was rewritten by
/// someone else.
pub trait Refresh {
    /// True when the backing file differs from the one last read or written.
    /// In-memory stores are never stale.
    fn is_stale(&self) -> bool;

    /// Replaces the in-memory rows with the current file contents.
    fn reload(&mut self) -> Result<()>;
}

pub const HOURLY_FILE: &str = "hourly.csv";
pub const DAILY_FILE: &str = "daily.csv";

pub fn hourly_path(data_dir: &Path) -> PathBuf {
    data_dir.join(HOURLY_FILE)
}

pub fn daily_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DAILY_FILE)
}
