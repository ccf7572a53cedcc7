//! Builds the model input vector for a task.
//!
//! Layout, fixed for the lifetime of a fitted model:
//!
//! | range    | source                                         |
//! |----------|------------------------------------------------|
//! | 0..17    | [`TextFeatures`] in [`TEXT_FEATURE_NAMES`] order |
//! | 17..20   | attachments, priority code, task type code     |
//! | 20..     | term weights in vocabulary order               |
//!
//! Reordering any of these invalidates every stored model.

use serde::{Deserialize, Serialize};

use crate::metadata::{self, METADATA_FEATURE_COUNT, METADATA_FEATURE_NAMES};
use crate::record::TaskRecord;
use crate::text::{TextFeatures, TEXT_FEATURE_COUNT, TEXT_FEATURE_NAMES};
use crate::tfidf::TermImportanceEncoder;

/// Width of the vector before term features are appended.
pub const BASE_FEATURE_COUNT: usize = TEXT_FEATURE_COUNT + METADATA_FEATURE_COUNT;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureAssembler {
    encoder: TermImportanceEncoder,
}

impl FeatureAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encoder(&self) -> &TermImportanceEncoder {
        &self.encoder
    }

    /// Fit the term encoder on `corpus`, replacing its vocabulary.
    pub fn fit_terms<S: AsRef<str>>(&mut self, corpus: &[S]) {
        self.encoder.fit(corpus);
    }

    /// Vector width this assembler produces.
    pub fn feature_count(&self) -> usize {
        BASE_FEATURE_COUNT + self.encoder.vocabulary_size()
    }

    pub fn assemble(&self, task: &TaskRecord) -> Vec<f64> {
        let text = TextFeatures::extract(&task.title, &task.description);
        self.assemble_with(task, &text)
    }

    /// Like [`assemble`](Self::assemble) with text features already extracted.
    pub fn assemble_with(&self, task: &TaskRecord, text: &TextFeatures) -> Vec<f64> {
        let mut vector = text.to_vec();
        vector.reserve(METADATA_FEATURE_COUNT + self.encoder.vocabulary_size());

        vector.push(metadata::encode_attachments(task.attachments_count) as f64);
        vector.push(metadata::encode_priority(task.priority.as_deref()) as f64);
        vector.push(metadata::encode_task_type(task.task_type.as_deref()) as f64);
        vector.extend(self.encoder.encode(&task.combined_text()));

        vector
    }

    /// Names matching [`assemble`](Self::assemble) position by position.
    pub fn feature_names(&self) -> Vec<String> {
        TEXT_FEATURE_NAMES
            .iter()
            .chain(METADATA_FEATURE_NAMES.iter())
            .map(|name| name.to_string())
            .chain(self.encoder.terms().iter().map(|term| format!("tfidf_{}", term)))
            .collect()
    }
}
