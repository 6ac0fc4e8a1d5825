//! Feature construction for the demand model.
//!
//! Both request shapes (one concrete hour, or a whole hypothetical day) end
//! up as [`FeatureVector`]s laid out exactly as [`FEATURE_NAMES`]. Engineered
//! history features (lags, same-hour rolling means, 24h deltas) have no
//! streaming history at request time and are always 0.0.

use crate::analyzers::utility::mean;
use crate::error::{Error, Result};
use crate::records::HourlyRecord;
use crate::store::HourlyStore;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::f64::consts::PI;

pub const HOURS_PER_DAY: u8 = 24;

/// Model input columns, in order.
pub const FEATURE_NAMES: [&str; 32] = [
    "hour",
    "temperature_c",
    "humidity_pct",
    "windspeed_ms",
    "visibility_10m",
    "dew_point_c",
    "solar_radiation_mj_m2",
    "rainfall_mm",
    "snowfall_cm",
    "weekday",
    "month",
    "seasons",
    "holiday",
    "functioning_day",
    "hour_sin",
    "hour_cos",
    "month_sin",
    "month_cos",
    "lag_1",
    "lag_24",
    "roll3_same_hour",
    "roll7_same_hour",
    "delta_temperature_c_24h",
    "delta_humidity_pct_24h",
    "delta_windspeed_ms_24h",
    "delta_visibility_10m_24h",
    "delta_dew_point_c_24h",
    "delta_solar_radiation_mj_m2_24h",
    "delta_rainfall_mm_24h",
    "delta_snowfall_cm_24h",
    "rain_flag",
    "snow_flag",
];

/// History-dependent features fixed to zero at inference time.
const HISTORY_FEATURES: [&str; 12] = [
    "lag_1",
    "lag_24",
    "roll3_same_hour",
    "roll7_same_hour",
    "delta_temperature_c_24h",
    "delta_humidity_pct_24h",
    "delta_windspeed_ms_24h",
    "delta_visibility_10m_24h",
    "delta_dew_point_c_24h",
    "delta_solar_radiation_mj_m2_24h",
    "delta_rainfall_mm_24h",
    "delta_snowfall_cm_24h",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Category(String),
}

impl FeatureValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FeatureValue::Number(v) => Some(*v),
            FeatureValue::Category(_) => None,
        }
    }
}

/// Ordered name → value mapping fed to the regressor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureVector {
    entries: Vec<(&'static str, FeatureValue)>,
}

impl FeatureVector {
    fn push_number(&mut self, name: &'static str, value: f64) {
        self.entries.push((name, FeatureValue::Number(value)));
    }

    fn push_category(&mut self, name: &'static str, value: &str) {
        self.entries
            .push((name, FeatureValue::Category(value.to_string())));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FeatureValue)> + '_ {
        self.entries.iter().map(|(name, value)| (*name, value))
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }
}

/// The eight weather measurements of one hour.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Weather {
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub windspeed_ms: f64,
    pub visibility_10m: f64,
    pub dew_point_c: f64,
    pub solar_radiation_mj_m2: f64,
    pub rainfall_mm: f64,
    pub snowfall_cm: f64,
}

impl Weather {
    pub fn from_record(r: &HourlyRecord) -> Self {
        Self {
            temperature_c: r.temperature_c,
            humidity_pct: r.humidity_pct,
            windspeed_ms: r.windspeed_ms,
            visibility_10m: r.visibility_10m,
            dew_point_c: r.dew_point_c,
            solar_radiation_mj_m2: r.solar_radiation_mj_m2,
            rainfall_mm: r.rainfall_mm,
            snowfall_cm: r.snowfall_cm,
        }
    }
}

/// Calendar labels supplied with a request.
#[derive(Debug, Clone, PartialEq)]
pub struct DayLabels {
    pub seasons: String,
    pub holiday: String,
    pub functioning_day: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourInput {
    pub date: NaiveDate,
    pub hour: u8,
    pub weather: Weather,
    pub labels: DayLabels,
}

/// What a prediction request asks about.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureContext {
    /// One concrete hour with observed weather.
    Hour(HourInput),
    /// All 24 hours of `date`, weather synthesized from season history.
    Day { date: NaiveDate, labels: DayLabels },
}

/// Weekday with Monday = 0 through Sunday = 6.
pub fn weekday_index(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_monday()
}

fn cyclical(value: f64, period: f64) -> (f64, f64) {
    let angle = 2.0 * PI * value / period;
    (angle.sin(), angle.cos())
}

/// Builds the feature vector for one concrete hour.
pub fn hour_features(input: &HourInput) -> FeatureVector {
    let w = &input.weather;
    let month = input.date.month();
    let (hour_sin, hour_cos) = cyclical(f64::from(input.hour), 24.0);
    let (month_sin, month_cos) = cyclical(f64::from(month), 12.0);

    let mut v = FeatureVector::default();
    v.push_number("hour", f64::from(input.hour));
    v.push_number("temperature_c", w.temperature_c);
    v.push_number("humidity_pct", w.humidity_pct);
    v.push_number("windspeed_ms", w.windspeed_ms);
    v.push_number("visibility_10m", w.visibility_10m);
    v.push_number("dew_point_c", w.dew_point_c);
    v.push_number("solar_radiation_mj_m2", w.solar_radiation_mj_m2);
    v.push_number("rainfall_mm", w.rainfall_mm);
    v.push_number("snowfall_cm", w.snowfall_cm);
    v.push_number("weekday", f64::from(weekday_index(input.date)));
    v.push_number("month", f64::from(month));
    v.push_category("seasons", &input.labels.seasons);
    v.push_category("holiday", &input.labels.holiday);
    v.push_category("functioning_day", &input.labels.functioning_day);
    v.push_number("hour_sin", hour_sin);
    v.push_number("hour_cos", hour_cos);
    v.push_number("month_sin", month_sin);
    v.push_number("month_cos", month_cos);
    for name in HISTORY_FEATURES {
        v.push_number(name, 0.0);
    }
    v.push_number("rain_flag", if w.rainfall_mm > 0.0 { 1.0 } else { 0.0 });
    v.push_number("snow_flag", if w.snowfall_cm > 0.0 { 1.0 } else { 0.0 });
    v
}

/// Mean weather per hour of day over every record of one season.
///
/// Hours with no history stay `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalWeather {
    pub season: String,
    pub by_hour: [Option<Weather>; HOURS_PER_DAY as usize],
}

impl SeasonalWeather {
    /// Averages `records` whose `seasons` equals `season`, grouped by hour.
    ///
    /// Fails with [`Error::NoData`] when no record matches.
    pub fn from_history<'a, I>(records: I, season: &str) -> Result<Self>
    where
        I: IntoIterator<Item = &'a HourlyRecord>,
    {
        let mut grouped: Vec<Vec<Weather>> = vec![Vec::new(); HOURS_PER_DAY as usize];
        for r in records {
            if r.seasons == season && r.hour < HOURS_PER_DAY {
                grouped[usize::from(r.hour)].push(Weather::from_record(r));
            }
        }

        if grouped.iter().all(Vec::is_empty) {
            return Err(Error::NoData(season.to_string()));
        }

        let mut by_hour = [None; HOURS_PER_DAY as usize];
        for (slot, samples) in by_hour.iter_mut().zip(&grouped) {
            if !samples.is_empty() {
                *slot = Some(average(samples));
            }
        }

        Ok(Self {
            season: season.to_string(),
            by_hour,
        })
    }

    /// Weather for `hour`, all zeros when the season never saw that hour.
    pub fn at(&self, hour: u8) -> Weather {
        self.by_hour
            .get(usize::from(hour))
            .copied()
            .flatten()
            .unwrap_or_default()
    }
}

fn average(samples: &[Weather]) -> Weather {
    let field = |f: fn(&Weather) -> f64| mean(&samples.iter().map(f).collect::<Vec<_>>());
    Weather {
        temperature_c: field(|w| w.temperature_c),
        humidity_pct: field(|w| w.humidity_pct),
        windspeed_ms: field(|w| w.windspeed_ms),
        visibility_10m: field(|w| w.visibility_10m),
        dew_point_c: field(|w| w.dew_point_c),
        solar_radiation_mj_m2: field(|w| w.solar_radiation_mj_m2),
        rainfall_mm: field(|w| w.rainfall_mm),
        snowfall_cm: field(|w| w.snowfall_cm),
    }
}

/// Builds the 24 hourly feature vectors for a hypothetical day.
pub fn day_features(date: NaiveDate, labels: &DayLabels, weather: &SeasonalWeather) -> Vec<FeatureVector> {
    (0..HOURS_PER_DAY)
        .map(|hour| {
            hour_features(&HourInput {
                date,
                hour,
                weather: weather.at(hour),
                labels: labels.clone(),
            })
        })
        .collect()
}

/// Turns a [`FeatureContext`] into model-ready vectors, using the hourly
/// store as history for seasonal synthesis.
pub struct FeatureBuilder<'a> {
    history: &'a HourlyStore,
}

impl<'a> FeatureBuilder<'a> {
    pub fn new(history: &'a HourlyStore) -> Self {
        Self { history }
    }

    /// One vector for [`FeatureContext::Hour`], 24 for [`FeatureContext::Day`].
    pub fn build(&self, context: &FeatureContext) -> Result<Vec<FeatureVector>> {
        match context {
            FeatureContext::Hour(input) => Ok(vec![hour_features(input)]),
            FeatureContext::Day { date, labels } => {
                let weather = SeasonalWeather::from_history(self.history.iter(), &labels.seasons)?;
                Ok(day_features(*date, labels, &weather))
            }
        }
    }
}
