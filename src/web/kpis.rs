use super::AppState;
use super::error::ApiError;
use crate::analyzers::kpis::{basic_kpis, date_bounds, hourly_heatmap};
use crate::analyzers::types::{BasicKpis, DateBounds, HourlyHeatmap};
use crate::store::RecordFilter;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

pub fn add_route(app: Router<Arc<AppState>>) -> Router<Arc<AppState>> {
    app.route("/meta/date-bounds", get(meta_date_bounds))
        .route("/kpis/basic", get(kpis_basic))
        .route("/kpis/hourly-heatmap", get(kpis_hourly_heatmap))
}

pub async fn meta_date_bounds(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DateBounds>, ApiError> {
    Ok(Json(date_bounds(&*state.hourly().await?)))
}

pub async fn kpis_basic(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<RecordFilter>,
) -> Result<Json<BasicKpis>, ApiError> {
    Ok(Json(basic_kpis(&state.hourly().await?.query(&filter))))
}

pub async fn kpis_hourly_heatmap(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<RecordFilter>,
) -> Result<Json<HourlyHeatmap>, ApiError> {
    Ok(Json(hourly_heatmap(&state.hourly().await?.query(&filter))))
}
