use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt::Display;
use std::str::FromStr;

pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const MAX_PAGE_SIZE: usize = 1000;

/// Optional query filters: inclusive date range and exact season match.
/// A blank parameter (`?season=`) counts as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordFilter {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub start: Option<NaiveDate>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub end: Option<NaiveDate>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub season: Option<String>,
}

impl RecordFilter {
    pub fn matches(&self, date: NaiveDate, season: &str) -> bool {
        self.start.is_none_or(|s| date >= s)
            && self.end.is_none_or(|e| date <= e)
            && self.season.as_deref().is_none_or(|s| s == season)
    }
}

/// 1-based page request; missing values fall back to the defaults.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageRequest {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page: Option<usize>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page_size: Option<usize>,
}

/// Query strings carry every value as text; empty or whitespace-only means unset.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: usize,
    pub page: usize,
    pub page_size: usize,
    pub results: Vec<T>,
}

impl PageRequest {
    pub fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> usize {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Cuts one page out of an already filtered, ordered sequence.
    pub fn apply<T: Clone>(&self, rows: &[&T]) -> Page<T> {
        let page = self.page();
        let page_size = self.page_size();
        let results = rows
            .iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .map(|r| (*r).clone())
            .collect();

        Page {
            count: rows.len(),
            page,
            page_size,
            results,
        }
    }
}
