//! Read-only listing and lookup of hourly records and daily aggregates.

use super::AppState;
use super::error::ApiError;
use crate::records::{DailyAggregate, HourlyRecord};
use crate::store::{Page, PageRequest, RecordFilter};
use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use std::sync::Arc;

pub fn add_route(app: Router<Arc<AppState>>) -> Router<Arc<AppState>> {
    app.route("/hourly", get(list_hourly))
        .route("/hourly/{date}/{hour}", get(get_hourly))
        .route("/daily", get(list_daily))
        .route("/daily/{date}", get(get_daily))
}

pub async fn list_hourly(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<RecordFilter>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<HourlyRecord>>, ApiError> {
    let hourly = state.hourly().await?;
    Ok(Json(page.apply(&hourly.query(&filter))))
}

pub async fn get_hourly(
    State(state): State<Arc<AppState>>,
    Path((date, hour)): Path<(NaiveDate, u8)>,
) -> Result<Json<HourlyRecord>, ApiError> {
    state
        .hourly()
        .await?
        .get(date, hour)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("hourly record {date} {hour:02}")))
}

pub async fn list_daily(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<RecordFilter>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<DailyAggregate>>, ApiError> {
    let daily = state.daily().await?;
    Ok(Json(page.apply(&daily.query(&filter))))
}

pub async fn get_daily(
    State(state): State<Arc<AppState>>,
    Path(date): Path<NaiveDate>,
) -> Result<Json<DailyAggregate>, ApiError> {
    state
        .daily()
        .await?
        .get(date)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("daily aggregate {date}")))
}
