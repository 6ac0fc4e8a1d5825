//! Data types produced by the analysis pipeline.

use chrono::NaiveDate;
use serde::Serialize;

/// Result of a daily aggregation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    /// The hourly store was empty; the daily store was left as it was.
    NothingToDo,
    /// The daily store now holds exactly `days` aggregates.
    Built { days: usize },
}

/// Headline figures over a filtered slice of the hourly store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasicKpis {
    pub rows: usize,
    pub total_rides: u64,
    pub avg_temp_c: f64,
    pub avg_humidity_pct: f64,
    pub avg_rides_per_hour: f64,
}

/// Mean rides per weekday × hour. Rows run Sunday..Saturday.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyHeatmap {
    pub matrix: Vec<Vec<f64>>,
    pub weekdays: Vec<&'static str>,
    pub hours: Vec<u8>,
}

/// First and last date present in the hourly store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateBounds {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}
