//! Error taxonomy shared by the library.
//!
//! Row-level ingestion problems are not represented here: the parser recovers
//! from them locally and counts them in its report.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Missing fields: {0:?}")]
    MissingFields(Vec<String>),

    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("No weather stats for season {0:?}")]
    NoData(String),

    #[error("No trained model found in {dir} (tried {tried:?})")]
    ModelNotFound { dir: PathBuf, tried: Vec<String> },

    #[error("Model artifact {path}: {reason}")]
    ModelArtifact { path: PathBuf, reason: String },

    #[error("Feature layout mismatch: model expects {expected:?}, got {actual:?}")]
    FeatureMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("Missing required columns: {0:?}")]
    MissingColumns(Vec<String>),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Error::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by the caller's request rather than the service.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::MissingFields(_) | Error::InvalidField { .. } | Error::NoData(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
