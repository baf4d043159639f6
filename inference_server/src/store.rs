use data_ingestion::fetcher::KlineSource;
use log::info;
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::TrainableClassifier;
use crate::error::ModelError;
use crate::trainer;

/// A single persisted model at a fixed path.
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn load<C: TrainableClassifier>(&self) -> Result<C, ModelError> {
        let bytes = fs::read(&self.path).map_err(|source| ModelError::Io {
            path: self.path.clone(),
            source,
        })?;
        C::from_bytes(&bytes).map_err(|e| ModelError::Corrupt {
            path: self.path.clone(),
            source: Box::new(e),
        })
    }

    pub fn save<C: TrainableClassifier>(&self, model: &C) -> Result<(), ModelError> {
        let bytes = model.to_bytes()?;
        let io_err = |source| ModelError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(&self.path, bytes).map_err(io_err)?;
        Ok(())
    }

    /// Load the persisted model, or train and persist one if none exists.
    /// A file that exists but cannot be decoded is an error, never retrained.
    pub async fn load_or_train<C, R>(
        &self,
        source: &dyn KlineSource,
        rng: &mut R,
    ) -> Result<C, ModelError>
    where
        C: TrainableClassifier,
        R: Rng + ?Sized,
    {
        if self.exists() {
            let model = self.load()?;
            info!("Loaded model from {}", self.path.display());
            return Ok(model);
        }

        info!("No model at {}, training a new one", self.path.display());
        let model = trainer::train(source, rng).await?;
        self.save(&model)?;
        info!("Saved model to {}", self.path.display());
        Ok(model)
    }
}
