use crate::analyzers::aggregate::aggregate_daily;
use crate::analyzers::types::BuildStatus;
use crate::error::Result;
use crate::store::{DailyStore, HourlyStore};
use tracing::info;

/// Rebuilds the daily store from the full hourly store.
///
/// An empty hourly store is reported as [`BuildStatus::NothingToDo`] and
/// leaves the daily store untouched. Otherwise every existing aggregate is
/// replaced; nothing is merged with earlier runs, so identical hourly input
/// always yields an identical daily store.
#[tracing::instrument(skip_all, fields(hourly_rows = hourly.len()))]
pub fn build_daily_aggregates(hourly: &HourlyStore, daily: &mut DailyStore) -> Result<BuildStatus> {
    if hourly.is_empty() {
        info!("No hourly data to aggregate");
        return Ok(BuildStatus::NothingToDo);
    }

    let days = aggregate_daily(hourly.iter());
    let written = daily.replace_all(days)?;

    info!(days = written, "Daily aggregates rebuilt");
    Ok(BuildStatus::Built { days: written })
}
