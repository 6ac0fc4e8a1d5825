//! Traits for the pre-trained demand model and where it comes from.

use crate::error::Result;
use crate::features::FeatureVector;
use std::sync::Arc;

/// A fitted regression model. Implementations are immutable once loaded.
pub trait Regressor: Send + Sync {
    /// Artifact version label, e.g. `"v2"`.
    fn version(&self) -> &str;

    /// Ordered input columns the model was fit on.
    fn feature_names(&self) -> &[String];

    /// Predicted ride counts, one per input row.
    fn predict(&self, batch: &[FeatureVector]) -> Result<Vec<f64>>;
}

/// Locates and loads a [`Regressor`] artifact.
pub trait ModelSource: Send + Sync {
    fn load(&self) -> Result<Arc<dyn Regressor>>;
}
