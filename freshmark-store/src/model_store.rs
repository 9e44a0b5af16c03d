use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use freshmark_engine::predictor::{ModelArtifact, PricePredictor};

use crate::StoreError;

/// Loads a fitted model artifact from disk, once at startup. The resulting
/// predictor is read-only and shared for the life of the process; a missing
/// or unreadable artifact makes every predicting path unavailable.
pub struct JsonModelStore {
    path: PathBuf,
}

impl JsonModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<PricePredictor, StoreError> {
        let file = File::open(&self.path).map_err(|e| {
            StoreError::ModelUnavailable(format!("{}: {}", self.path.display(), e))
        })?;
        let artifact: ModelArtifact = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| StoreError::ModelUnavailable(format!("{}: {}", self.path.display(), e)))?;

        let predictor = PricePredictor::from_artifact(artifact)
            .map_err(|e| StoreError::ModelUnavailable(e.to_string()))?;
        tracing::info!(path = %self.path.display(), "price model loaded");
        Ok(predictor)
    }
}
