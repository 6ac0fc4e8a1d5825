use crate::error::{Error, Result};
use crate::features::{FeatureValue, FeatureVector};
use crate::services::Regressor;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Linear model over numeric features with per-category offsets.
///
/// Stored as JSON:
/// ```json
/// {
///   "version": "v2",
///   "features": ["hour", "temperature_c", "seasons"],
///   "intercept": 120.0,
///   "weights": { "hour": 12.5, "temperature_c": 18.0 },
///   "categories": { "seasons": { "Winter": -250.0, "Summer": 310.0 } }
/// }
/// ```
/// Numeric features without a weight and category values never seen in
/// training contribute nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub version: String,
    pub features: Vec<String>,
    pub intercept: f64,
    #[serde(default)]
    pub weights: HashMap<String, f64>,
    #[serde(default)]
    pub categories: HashMap<String, HashMap<String, f64>>,
}

impl LinearModel {
    /// Reads and validates an artifact file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let model: LinearModel = serde_json::from_str(&content).map_err(|e| Error::ModelArtifact {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        model.validate().map_err(|reason| Error::ModelArtifact {
            path: path.to_path_buf(),
            reason,
        })?;
        Ok(model)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.features.is_empty() {
            return Err("empty feature list".to_string());
        }

        let mut seen = HashSet::new();
        if let Some(dup) = self.features.iter().find(|f| !seen.insert(f.as_str())) {
            return Err(format!("duplicate feature {dup:?}"));
        }

        let unknown = self
            .weights
            .keys()
            .chain(self.categories.keys())
            .find(|k| !seen.contains(k.as_str()));
        if let Some(name) = unknown {
            return Err(format!("weight for unlisted feature {name:?}"));
        }

        let non_finite = !self.intercept.is_finite()
            || self.weights.values().any(|w| !w.is_finite())
            || self
                .categories
                .values()
                .flat_map(HashMap::values)
                .any(|w| !w.is_finite());
        if non_finite {
            return Err("non-finite coefficient".to_string());
        }
        Ok(())
    }

    fn score(&self, row: &FeatureVector) -> f64 {
        row.iter().fold(self.intercept, |acc, (name, value)| {
            let term = match value {
                FeatureValue::Number(v) => self.weights.get(name).map_or(0.0, |w| w * v),
                FeatureValue::Category(c) => self
                    .categories
                    .get(name)
                    .and_then(|levels| levels.get(c))
                    .copied()
                    .unwrap_or(0.0),
            };
            acc + term
        })
    }
}

impl Regressor for LinearModel {
    fn version(&self) -> &str {
        &self.version
    }

    fn feature_names(&self) -> &[String] {
        &self.features
    }

    fn predict(&self, batch: &[FeatureVector]) -> Result<Vec<f64>> {
        Ok(batch.iter().map(|row| self.score(row)).collect())
    }
}
