//! Model seams and the prediction service built on them.
//!
//! [`Regressor`] is the contract of a fitted model, [`ModelSource`] finds and
//! loads one, and [`PredictionService`] wires feature construction to the
//! lazily loaded model.

pub mod prediction;
pub mod regressor;

pub use prediction::{DayPrediction, HourPrediction, PredictionService};
pub use regressor::{ModelSource, Regressor};
