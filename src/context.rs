//! Application context: the store plus the served model handle.
//!
//! Readers take a cheap `Arc` clone of the current model. A training run
//! builds its artifact without holding the lock, persists it, and only then
//! swaps the pointer, so readers never observe a half-replaced model and a
//! failed run leaves both store and served model untouched.

use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};

use story_points_core::{
    Estimate, EstimationModel, EstimatorError, ModelInfo, TaskRecord, Trainer, TrainingRecord,
    TrainingStats,
};

use crate::db::Database;

#[derive(Clone)]
pub struct AppContext {
    inner: Arc<Inner>,
}

struct Inner {
    db: Database,
    trainer: Trainer,
    model: RwLock<Option<Arc<EstimationModel>>>,
    /// Serializes training runs; the model lock stays free for readers meanwhile.
    training: std::sync::Mutex<()>,
}

impl AppContext {
    /// Build the context, loading a stored model if there is a usable one.
    pub fn new(db: Database, trainer: Trainer) -> Self {
        let model = match db.load_model() {
            Ok(Some(model)) => {
                tracing::info!(model_id = %model.id, "Loaded stored model");
                Some(Arc::new(model))
            }
            Ok(None) => {
                tracing::info!("No stored model found");
                None
            }
            Err(e) => {
                tracing::error!("Failed to load stored model, starting untrained: {:#}", e);
                None
            }
        };

        Self {
            inner: Arc::new(Inner {
                db,
                trainer,
                model: RwLock::new(model),
                training: std::sync::Mutex::new(()),
            }),
        }
    }

    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    /// The model currently served, if any.
    pub fn model(&self) -> Option<Arc<EstimationModel>> {
        self.inner
            .model
            .read()
            .expect("model lock poisoned")
            .clone()
    }

    pub fn is_trained(&self) -> bool {
        self.model().is_some()
    }

    pub fn status(&self) -> ModelInfo {
        self.model()
            .map(|model| model.info())
            .unwrap_or_else(ModelInfo::untrained)
    }

    pub fn estimate(&self, task: &TaskRecord) -> Result<Estimate, EstimatorError> {
        let model = self.model().ok_or(EstimatorError::UntrainedModel)?;
        model.estimate(task)
    }

    /// Train a new model, persist it, then make it the served one.
    pub fn train(&self, records: Vec<TrainingRecord>) -> Result<TrainingStats> {
        let _guard = self.inner.training.lock().expect("training lock poisoned");

        let model = self
            .inner
            .trainer
            .train(records)
            .context("Training failed")?;
        self.inner
            .db
            .save_model(&model)
            .context("Failed to persist trained model")?;

        let stats = model.stats().clone();
        *self.inner.model.write().expect("model lock poisoned") = Some(Arc::new(model));
        Ok(stats)
    }

    /// Train on the seed set when no model is served. Returns whether it trained.
    pub fn bootstrap_if_untrained(&self) -> Result<bool> {
        if self.is_trained() {
            return Ok(false);
        }
        tracing::info!("No trained model, training on built-in examples");
        self.train(Vec::new())?;
        Ok(true)
    }
}
