//! Prediction endpoints.
//!
//! Request bodies are taken as raw JSON so every absent field can be named
//! in the rejection instead of failing on the first one serde trips over.

use super::AppState;
use super::error::ApiError;
use crate::error::{Error, Result};
use crate::features::{DayLabels, HourInput, Weather};
use crate::services::{DayPrediction, HourPrediction};
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value};
use std::sync::Arc;

const HOUR_FIELDS: [&str; 13] = [
    "date",
    "hour",
    "temperature_c",
    "humidity_pct",
    "windspeed_ms",
    "visibility_10m",
    "dew_point_c",
    "solar_radiation_mj_m2",
    "rainfall_mm",
    "snowfall_cm",
    "seasons",
    "holiday",
    "functioning_day",
];

const DAY_FIELDS: [&str; 4] = ["date", "seasons", "holiday", "functioning_day"];

pub fn add_route(app: Router<Arc<AppState>>) -> Router<Arc<AppState>> {
    app.route("/predict/hour", post(predict_hour))
        .route("/predict/day", post(predict_day))
}

pub async fn predict_hour(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> std::result::Result<Json<HourPrediction>, ApiError> {
    let input = hour_request(&body)?;
    Ok(Json(state.predictor.predict_hour(&input)?))
}

pub async fn predict_day(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> std::result::Result<Json<DayPrediction>, ApiError> {
    let (date, labels) = day_request(&body)?;
    let hourly = state.hourly().await?;
    Ok(Json(state.predictor.predict_day(&hourly, date, labels)?))
}

fn object(body: &Value) -> Result<&Map<String, Value>> {
    body.as_object()
        .ok_or_else(|| Error::invalid("body", "expected a JSON object"))
}

fn absent<'a>(obj: &Map<String, Value>, fields: &[&'a str]) -> Vec<&'a str> {
    fields
        .iter()
        .copied()
        .filter(|f| obj.get(*f).is_none_or(Value::is_null))
        .collect()
}

pub fn hour_request(body: &Value) -> Result<HourInput> {
    let obj = object(body)?;
    let missing = absent(obj, &HOUR_FIELDS);
    if !missing.is_empty() {
        return Err(Error::MissingFields(missing.into_iter().map(String::from).collect()));
    }

    let hour = number(obj, "hour")?;
    if hour.fract() != 0.0 || !(0.0..=23.0).contains(&hour) {
        return Err(Error::invalid("hour", "expected an integer between 0 and 23"));
    }

    Ok(HourInput {
        date: date(obj)?,
        hour: hour as u8,
        weather: Weather {
            temperature_c: number(obj, "temperature_c")?,
            humidity_pct: number(obj, "humidity_pct")?,
            windspeed_ms: number(obj, "windspeed_ms")?,
            visibility_10m: number(obj, "visibility_10m")?,
            dew_point_c: number(obj, "dew_point_c")?,
            solar_radiation_mj_m2: number(obj, "solar_radiation_mj_m2")?,
            rainfall_mm: number(obj, "rainfall_mm")?,
            snowfall_cm: number(obj, "snowfall_cm")?,
        },
        labels: labels(obj)?,
    })
}

pub fn day_request(body: &Value) -> Result<(NaiveDate, DayLabels)> {
    let obj = object(body)?;
    if let Some(first) = absent(obj, &DAY_FIELDS).first() {
        return Err(Error::MissingFields(vec![first.to_string()]));
    }
    Ok((date(obj)?, labels(obj)?))
}

fn labels(obj: &Map<String, Value>) -> Result<DayLabels> {
    Ok(DayLabels {
        seasons: text(obj, "seasons")?,
        holiday: text(obj, "holiday")?,
        functioning_day: text(obj, "functioning_day")?,
    })
}

fn number(obj: &Map<String, Value>, field: &str) -> Result<f64> {
    let parsed = match obj.get(field) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::invalid(field, "expected a number"))
}

fn text(obj: &Map<String, Value>, field: &str) -> Result<String> {
    match obj.get(field) {
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        _ => Err(Error::invalid(field, "expected a string")),
    }
}

fn date(obj: &Map<String, Value>) -> Result<NaiveDate> {
    let raw = match obj.get("date") {
        Some(Value::String(s)) => s.trim(),
        _ => return Err(Error::invalid("date", "expected a date string")),
    };
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .ok_or_else(|| Error::invalid("date", format!("unrecognised date {raw:?}")))
}
