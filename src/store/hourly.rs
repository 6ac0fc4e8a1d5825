use crate::error::Result;
use crate::records::HourlyRecord;
use crate::store::filter::RecordFilter;
use crate::store::Refresh;
use crate::store::table::{Fingerprint, fingerprint, read_rows, replace_rows};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Outcome of an ignore-conflicts bulk insert.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct InsertSummary {
    pub inserted: usize,
    pub duplicates: usize,
}

/// Hourly records keyed and ordered by (date, hour).
#[derive(Debug, Default)]
pub struct HourlyStore {
    path: Option<PathBuf>,
    rows: BTreeMap<(NaiveDate, u8), HourlyRecord>,
    seen: Fingerprint,
}

impl HourlyStore {
    /// Store with no backing file.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Loads the store from `path`; a missing file yields an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut store = Self {
            path: Some(path.clone()),
            rows: BTreeMap::new(),
            seen: fingerprint(&path),
        };
        let loaded: Vec<HourlyRecord> = read_rows(&path)?;
        let summary = store.insert_ignore_conflicts(loaded);
        info!(path = %path.display(), rows = summary.inserted, "Hourly store loaded");
        Ok(store)
    }

    /// Inserts records, silently skipping any whose (date, hour) already exists.
    pub fn insert_ignore_conflicts<I>(&mut self, records: I) -> InsertSummary
    where
        I: IntoIterator<Item = HourlyRecord>,
    {
        let mut summary = InsertSummary::default();
        for record in records {
            match self.rows.entry(record.key()) {
                std::collections::btree_map::Entry::Occupied(_) => summary.duplicates += 1,
                std::collections::btree_map::Entry::Vacant(slot) => {
                    slot.insert(record);
                    summary.inserted += 1;
                }
            }
        }
        summary
    }

    pub fn truncate(&mut self) {
        self.rows.clear();
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All records ordered by (date, hour).
    pub fn iter(&self) -> impl Iterator<Item = &HourlyRecord> {
        self.rows.values()
    }

    pub fn get(&self, date: NaiveDate, hour: u8) -> Option<&HourlyRecord> {
        self.rows.get(&(date, hour))
    }

    pub fn query(&self, filter: &RecordFilter) -> Vec<&HourlyRecord> {
        self.iter()
            .filter(|r| filter.matches(r.date, &r.seasons))
            .collect()
    }

    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.rows.keys().next()?.0;
        let last = self.rows.keys().next_back()?.0;
        Some((first, last))
    }

    /// Writes the whole store back to its file, if it has one.
    pub fn save(&mut self) -> Result<()> {
        if let Some(path) = &self.path {
            replace_rows(path, self.rows.values())?;
            self.seen = fingerprint(path);
        }
        Ok(())
    }
}

impl Refresh for HourlyStore {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn record(day: u32, hour: u8, rides: u32) -> HourlyRecord {
        HourlyRecord {
            date: NaiveDate::from_ymd_opt(2018, 1, day).unwrap(),
            hour,
            rented_bike_count: rides,
            temperature_c: -5.2,
            humidity_pct: 37.0,
            windspeed_ms: 2.2,
            visibility_10m: 2000.0,
            dew_point_c: -17.6,
            solar_radiation_mj_m2: 0.0,
            rainfall_mm: 0.0,
            snowfall_cm: 0.0,
            seasons: "Winter".to_string(),
            holiday: "No Holiday".to_string(),
            functioning_day: "Yes".to_string(),
        }
    }

    #[test]
    fn test_duplicate_keys_skipped() {
        let mut store = HourlyStore::in_memory();
        let summary = store.insert_ignore_conflicts(vec![record(1, 0, 254), record(1, 1, 204)]);
        assert_eq!(summary, InsertSummary { inserted: 2, duplicates: 0 });

        let summary = store.insert_ignore_conflicts(vec![record(1, 0, 999), record(1, 2, 173)]);
        assert_eq!(summary, InsertSummary { inserted: 1, duplicates: 1 });
        assert_eq!(store.len(), 3);
        // first write wins
        let date = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        assert_eq!(store.get(date, 0).unwrap().rented_bike_count, 254);
    }

    #[test]
    fn test_iter_ordered_by_date_then_hour() {
        let mut store = HourlyStore::in_memory();
        store.insert_ignore_conflicts(vec![record(2, 0, 1), record(1, 5, 2), record(1, 3, 3)]);
        let keys: Vec<(u32, u8)> = store
            .iter()
            .map(|r| (chrono::Datelike::day(&r.date), r.hour))
            .collect();
        assert_eq!(keys, vec![(1, 3), (1, 5), (2, 0)]);
    }

    #[test]
    fn test_date_bounds_and_truncate() {
        let mut store = HourlyStore::in_memory();
        assert_eq!(store.date_bounds(), None);

        store.insert_ignore_conflicts(vec![record(3, 0, 1), record(1, 0, 1), record(2, 0, 1)]);
        let (start, end) = store.date_bounds().unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2018, 1, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2018, 1, 3).unwrap());

        store.truncate();
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hourly.csv");

        let mut store = HourlyStore::open(&path).unwrap();
        store.insert_ignore_conflicts(vec![record(1, 0, 254), record(1, 1, 204)]);
        store.save().unwrap();

        let reopened = HourlyStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.iter().next(), store.iter().next());
    }

    #[test]
    fn test_reload_picks_up_external_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hourly.csv");

        let mut reader = HourlyStore::open(&path).unwrap();
        assert!(!reader.is_stale());

        let mut writer = HourlyStore::open(&path).unwrap();
        writer.insert_ignore_conflicts(vec![record(1, 0, 254), record(1, 1, 204)]);
        writer.save().unwrap();
        assert!(!writer.is_stale());

        assert!(reader.is_stale());
        reader.reload().unwrap();
        assert!(!reader.is_stale());
        assert_eq!(reader.len(), 2);
    }

    #[test]
    fn test_in_memory_never_stale() {
        let store = HourlyStore::in_memory();
        assert!(!store.is_stale());
    }
}
