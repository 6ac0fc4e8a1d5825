use crate::error::Result;
use crate::records::DailyAggregate;
use crate::store::filter::RecordFilter;
use crate::store::Refresh;
use crate::store::table::{Fingerprint, fingerprint, read_rows, replace_rows};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::info;

/// One aggregate per date, ordered by date. Only ever replaced as a whole.
#[derive(Debug, Default)]
pub struct DailyStore {
    path: Option<PathBuf>,
    rows: Vec<DailyAggregate>,
    seen: Fingerprint,
}

impl DailyStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let seen = fingerprint(&path);
        let mut rows: Vec<DailyAggregate> = read_rows(&path)?;
        rows.sort_by_key(|r| r.date);
        rows.dedup_by_key(|r| r.date);
        info!(path = %path.display(), rows = rows.len(), "Daily store loaded");
        Ok(Self {
            path: Some(path),
            rows,
            seen,
        })
    }

    /// Swaps in a complete new set of aggregates.
    ///
    /// The file is written first and atomically renamed into place; memory is
    /// only updated once the file write succeeded.
    pub fn replace_all(&mut self, mut rows: Vec<DailyAggregate>) -> Result<usize> {
        rows.sort_by_key(|r| r.date);
        if let Some(path) = &self.path {
            replace_rows(path, &rows)?;
            self.seen = fingerprint(path);
        }
        self.rows = rows;
        Ok(self.rows.len())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DailyAggregate> {
        self.rows.iter()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DailyAggregate> {
        self.rows
            .binary_search_by_key(&date, |r| r.date)
            .ok()
            .map(|i| &self.rows[i])
    }

    pub fn query(&self, filter: &RecordFilter) -> Vec<&DailyAggregate> {
        self.rows
            .iter()
            .filter(|r| filter.matches(r.date, &r.seasons_mode))
            .collect()
    }
}

impl Refresh for DailyStore {
    fn is_stale(&self) -> bool {
        self.path.as_deref().is_some_and(|p| fingerprint(p) != self.seen)
    }

    fn reload(&mut self) -> Result<()> {
        if let Some(path) = self.path.clone() {
            *self = Self::open(path)?;
        }
        Ok(())
    }
}
