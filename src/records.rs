//! Row types for the hourly and daily stores.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One observation of rides and weather for a single (date, hour).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRecord {
    pub date: NaiveDate,
    pub hour: u8,

    // target
    pub rented_bike_count: u32,

    // weather
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub windspeed_ms: f64,
    pub visibility_10m: f64,
    pub dew_point_c: f64,
    pub solar_radiation_mj_m2: f64,
    pub rainfall_mm: f64,
    pub snowfall_cm: f64,

    // categorical labels
    pub seasons: String,
    pub holiday: String,
    pub functioning_day: String,
}

impl HourlyRecord {
    /// Store key; unique across the hourly store.
    pub fn key(&self) -> (NaiveDate, u8) {
        (self.date, self.hour)
    }

    pub fn is_holiday(&self) -> bool {
        is_holiday_label(&self.holiday)
    }

    pub fn is_functioning(&self) -> bool {
        is_functioning_label(&self.functioning_day)
    }
}

/// Any label mentioning "holiday", case-insensitively, flags the hour.
/// This includes the dataset's "No Holiday" value.
pub fn is_holiday_label(label: &str) -> bool {
    label.to_lowercase().contains("holiday")
}

/// Functioning-day labels count as "yes" when they start with `y`.
pub fn is_functioning_label(label: &str) -> bool {
    label.trim().to_lowercase().starts_with('y')
}

/// Per-date summary rebuilt wholesale from the hourly store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub total_rides: u64,
    pub avg_temp_c: f64,
    pub avg_humidity_pct: f64,
    pub avg_windspeed_ms: f64,
    pub roll7_total: Option<f64>,
    pub roll30_total: Option<f64>,
    pub seasons_mode: String,
    pub holiday_any: bool,
    pub functioning_all_yes: bool,
}
