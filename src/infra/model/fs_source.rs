use crate::error::{Error, Result};
use crate::infra::model::LinearModel;
use crate::services::{ModelSource, Regressor};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Artifact file names, newest first.
pub const MODEL_CANDIDATES: [&str; 2] = ["model_v2.json", "model_v1.json"];

/// Loads the first artifact in preference order found under `dir`.
pub struct FsModelSource {
    dir: PathBuf,
    candidates: Vec<String>,
}

impl FsModelSource {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self::with_candidates(dir, MODEL_CANDIDATES.iter().map(|s| s.to_string()).collect())
    }

    pub fn with_candidates(dir: impl AsRef<Path>, candidates: Vec<String>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            candidates,
        }
    }

    /// The artifact that would be loaded right now, if any.
    pub fn locate(&self) -> Option<PathBuf> {
        self.candidates
            .iter()
            .map(|name| self.dir.join(name))
            .find(|path| path.is_file())
    }
}

impl ModelSource for FsModelSource {
    #[tracing::instrument(skip(self), fields(dir = %self.dir.display()))]
    fn load(&self) -> Result<Arc<dyn Regressor>> {
        let Some(path) = self.locate() else {
            debug!(tried = ?self.candidates, "No model artifact present");
            return Err(Error::ModelNotFound {
                dir: self.dir.clone(),
                tried: self.candidates.clone(),
            });
        };

        let model = LinearModel::from_path(&path)?;
        info!(path = %path.display(), version = %model.version, "Model artifact read");
        Ok(Arc::new(model))
    }
}
