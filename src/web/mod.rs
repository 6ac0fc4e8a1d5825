//! HTTP API over the hourly and daily stores plus the predictor.
//!
//! Stores sit behind read-write locks. Each request checks whether `ingest`
//! or `build-daily` rewrote a store file since it was last read and reloads
//! it before answering.

mod error;
mod kpis;
mod predict;
mod records;

pub use error::ApiError;

use crate::error::Result;
use crate::services::PredictionService;
use crate::store::{DailyStore, HourlyStore, Refresh};
use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{RwLock, RwLockReadGuard};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub const API_PREFIX: &str = "/api/v1";

pub struct AppState {
    hourly: RwLock<HourlyStore>,
    daily: RwLock<DailyStore>,
    pub predictor: PredictionService,
}

impl AppState {
    pub fn new(hourly: HourlyStore, daily: DailyStore, predictor: PredictionService) -> Self {
        Self {
            hourly: RwLock::new(hourly),
            daily: RwLock::new(daily),
            predictor,
        }
    }

    /// The hourly store as currently on disk.
    pub async fn hourly(&self) -> Result<RwLockReadGuard<'_, HourlyStore>> {
        current(&self.hourly, "hourly").await
    }

    /// The daily store as currently on disk.
    pub async fn daily(&self) -> Result<RwLockReadGuard<'_, DailyStore>> {
        current(&self.daily, "daily").await
    }
}

async fn current<'a, S: Refresh>(
    lock: &'a RwLock<S>,
    name: &str,
) -> Result<RwLockReadGuard<'a, S>> {
    {
        let store = lock.read().await;
        if !store.is_stale() {
            return Ok(store);
        }
    }

    // another request may have reloaded while we waited
    let mut store = lock.write().await;
    if store.is_stale() {
        store.reload()?;
        info!(store = name, "Store file changed, reloaded");
    }
    Ok(store.downgrade())
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = add_routes(
        Router::new(),
        &[records::add_route, kpis::add_route, predict::add_route],
    );

    Router::new()
        .route("/healthcheck", get(healthcheck))
        .nest(API_PREFIX, api)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(addr: &str, state: Arc<AppState>) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Listening");
    axum::serve(listener, router(state)).await
}

async fn healthcheck() -> &'static str {
    "OK"
}

fn add_routes<T>(app: Router<T>, funcs: &[fn(Router<T>) -> Router<T>]) -> Router<T> {
    let mut app = app;
    for func in funcs {
        app = func(app);
    }
    app
}
