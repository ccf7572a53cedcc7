use thiserror::Error;

/// Errors raised by feature assembly, the regressor and the training loop.
#[derive(Debug, Error)]
pub enum EstimatorError {
    #[error("Model not trained. Please train the model first.")]
    UntrainedModel,

    #[error("Feature vector has {actual} entries but the model was fitted on {expected}")]
    FeatureMismatch { expected: usize, actual: usize },

    #[error("No training samples available")]
    EmptyTrainingSet,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unsupported model format version {0}")]
    UnsupportedVersion(String),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EstimatorError>;
