//! Core of the story point estimator.
//!
//! # Pipeline
//!
//! A [`TaskRecord`] flows through three encoders whose outputs are
//! concatenated by the [`FeatureAssembler`]:
//!
//! - [`text::TextFeatures`]: 17 lexical, readability and keyword statistics.
//! - [`metadata`]: attachment count, priority code and task type code.
//! - [`TermImportanceEncoder`]: up to 100 TF-IDF weights over a fitted
//!   vocabulary of unigrams and bigrams.
//!
//! The resulting vector feeds a [`RandomForest`] regressor whose continuous
//! output is snapped onto the [`scale`] of allowed story points.
//!
//! # Training
//!
//! [`Trainer`] merges caller records with the built-in [`seed`] examples,
//! fits the encoder and the forest, evaluates every split and, when the model
//! overfits badly, tries a smaller forest. The result is an immutable
//! [`EstimationModel`] that is only ever replaced as a whole.

pub mod assembler;
pub mod error;
pub mod estimator;
pub mod forest;
pub mod metadata;
pub mod metrics;
pub mod record;
pub mod scale;
pub mod seed;
pub mod split;
pub mod stats;
pub mod text;
pub mod tfidf;
pub mod trainer;

pub use assembler::FeatureAssembler;
pub use error::{EstimatorError, Result};
pub use estimator::{Estimate, EstimateDiagnostics, EstimationModel, ModelInfo, FORMAT_VERSION};
pub use forest::{ForestConfig, RandomForest};
pub use record::{TaskRecord, TrainingRecord};
pub use stats::{OverfittingLevel, OverfittingSeverity, SplitKind, TrainingStats};
pub use tfidf::TermImportanceEncoder;
pub use trainer::{Trainer, TrainerConfig};
