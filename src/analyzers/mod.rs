//! Hourly to daily aggregation and KPI summaries.
//!
//! The aggregator groups hourly records by date, reduces each group to a
//! [`DailyAggregate`](crate::records::DailyAggregate) and adds trailing
//! rolling means. KPI helpers summarise filtered slices of the hourly store
//! for the read API.

pub mod aggregate;
pub mod analyzer;
pub mod kpis;
pub mod types;
pub mod utility;
