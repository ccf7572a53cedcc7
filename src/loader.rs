//! Local dataset files of labelled tasks.
//!
//! A file holds either a JSON array of task objects or an object with a
//! `tasks` array. Each element is read with the prioritized key lists of
//! [`TrainingRecord::from_json`] and must additionally carry a target within
//! 1..=100, which is rounded to a whole number.

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use story_points_core::TrainingRecord;

pub const MIN_STORY_POINTS: f64 = 1.0;
pub const MAX_STORY_POINTS: f64 = 100.0;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Dataset {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Dataset {0} must be an array of tasks or an object with a \"tasks\" array")]
    Shape(PathBuf),
}

/// Load and validate every task of a dataset file.
pub fn load_file(path: &Path) -> Result<Vec<TrainingRecord>, LoaderError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&content).map_err(|source| LoaderError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let items = task_items(&value).ok_or_else(|| LoaderError::Shape(path.to_path_buf()))?;
    let records: Vec<TrainingRecord> = items.iter().filter_map(validate_record).collect();

    tracing::info!(
        path = %path.display(),
        total = items.len(),
        valid = records.len(),
        "Loaded dataset"
    );
    Ok(records)
}

/// Load several files, concatenating their records in order.
pub fn load_files(paths: &[PathBuf]) -> Result<Vec<TrainingRecord>, LoaderError> {
    let mut records = Vec::new();
    for path in paths {
        records.extend(load_file(path)?);
    }
    Ok(records)
}

fn task_items(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(object) => object.get("tasks").and_then(Value::as_array),
        _ => None,
    }
}

/// Dataset-level validation on top of the record's own field checks.
pub fn validate_record(value: &Value) -> Option<TrainingRecord> {
    let mut record = TrainingRecord::from_json(value)?;
    if !(MIN_STORY_POINTS..=MAX_STORY_POINTS).contains(&record.story_points) {
        return None;
    }
    record.story_points = record.story_points.round();
    Some(record)
}
