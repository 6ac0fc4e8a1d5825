use crate::analyzers::utility::round2;
use crate::error::{Error, Result};
use crate::features::{
    DayLabels, FeatureBuilder, FeatureContext, FeatureVector, HOURS_PER_DAY, HourInput, hour_features,
};
use crate::services::regressor::{ModelSource, Regressor};
use crate::store::HourlyStore;
use chrono::NaiveDate;
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourPrediction {
    pub predicted_rented_bike_count: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayPrediction {
    pub date: NaiveDate,
    pub hours: Vec<u8>,
    pub pred: Vec<f64>,
}

/// Serves predictions from a model loaded at most once.
///
/// A failed load is not cached, so a model dropped into place later is
/// picked up by the next request. Once loaded the model is shared read-only.
pub struct PredictionService {
    source: Box<dyn ModelSource>,
    model: OnceCell<Arc<dyn Regressor>>,
}

impl PredictionService {
    pub fn new(source: impl ModelSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            model: OnceCell::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    pub fn model(&self) -> Result<&Arc<dyn Regressor>> {
        self.model.get_or_try_init(|| {
            let model = self.source.load()?;
            info!(version = model.version(), features = model.feature_names().len(), "Model loaded");
            Ok(model)
        })
    }

    /// Runs a batch through the model after checking its column layout.
    pub fn predict(&self, batch: &[FeatureVector]) -> Result<Vec<f64>> {
        let model = self.model()?;
        for row in batch {
            check_layout(model.feature_names(), row)?;
        }
        let out = model.predict(batch)?;
        debug!(rows = batch.len(), "Batch predicted");
        Ok(out)
    }

    pub fn predict_hour(&self, input: &HourInput) -> Result<HourPrediction> {
        let yhat = self.predict(&[hour_features(input)])?;
        let value = yhat.first().copied().unwrap_or_default();
        Ok(HourPrediction {
            predicted_rented_bike_count: round2(value),
        })
    }

    /// Predicts all 24 hours of `date`; the season must have hourly history.
    pub fn predict_day(&self, history: &HourlyStore, date: NaiveDate, labels: DayLabels) -> Result<DayPrediction> {
        let vectors = FeatureBuilder::new(history).build(&FeatureContext::Day { date, labels })?;
        let yhat = self.predict(&vectors)?;
        Ok(DayPrediction {
            date,
            hours: (0..HOURS_PER_DAY).collect(),
            pred: yhat.into_iter().map(round2).collect(),
        })
    }
}

fn check_layout(expected: &[String], row: &FeatureVector) -> Result<()> {
    let matches = expected.len() == row.len() && expected.iter().zip(row.names()).all(|(e, a)| e == a);
    if matches {
        return Ok(());
    }
    Err(Error::FeatureMismatch {
        expected: expected.to_vec(),
        actual: row.names().map(str::to_string).collect(),
    })
}
