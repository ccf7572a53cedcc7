//! The fitted estimation model and the inference path.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assembler::FeatureAssembler;
use crate::error::{EstimatorError, Result};
use crate::forest::RandomForest;
use crate::metadata;
use crate::record::TaskRecord;
use crate::scale;
use crate::stats::TrainingStats;
use crate::text::TextFeatures;

/// Version tag of the serialized artifact.
pub const FORMAT_VERSION: &str = "2.0";

pub const MODEL_TYPE: &str = "RandomForest with text, metadata and TF-IDF features";

pub const BASE_CONFIDENCE: f64 = 0.7;
pub const MAX_CONFIDENCE: f64 = 0.95;
const DESCRIPTION_BONUS: f64 = 0.1;
const ATTACHMENTS_BONUS: f64 = 0.05;
const PRIORITY_BONUS: f64 = 0.05;
/// Descriptions longer than this (in characters) count as substantive.
const SUBSTANTIVE_DESCRIPTION: usize = 30;

const TOP_FEATURES: usize = 5;
const TOP_TERMS: usize = 5;
const REASONING_FACTORS: usize = 3;

/// Forest, term encoder and statistics of one training run.
///
/// Only ever built complete by the trainer or by loading a stored artifact,
/// and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimationModel {
    pub id: Uuid,
    pub version: String,
    pub fitted: bool,
    forest: RandomForest,
    assembler: FeatureAssembler,
    stats: TrainingStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub name: String,
    pub importance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermScore {
    pub term: String,
    pub score: f64,
}

/// Explanatory output of an estimate. Not used in the decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateDiagnostics {
    pub raw_prediction: f64,
    pub feature_count: usize,
    pub has_description: bool,
    pub has_attachments: bool,
    pub has_priority: bool,
    pub has_task_type: bool,

    pub title_length: usize,
    pub description_length: usize,
    pub word_count: usize,
    pub complexity_score: f64,

    pub complexity_high: usize,
    pub complexity_medium: usize,
    pub complexity_low: usize,
    pub effort_high: usize,
    pub effort_medium: usize,
    pub effort_low: usize,

    pub has_ui_words: bool,
    pub has_backend_words: bool,
    pub has_integration_words: bool,
    pub has_testing_words: bool,

    pub flesch_reading_ease: f64,
    pub flesch_kincaid_grade: f64,

    pub tfidf_feature_count: usize,
    pub tfidf_max_score: f64,
    pub tfidf_mean_score: f64,

    pub top_features: Vec<FeatureImportance>,
    pub top_tfidf_terms: Vec<TermScore>,

    pub priority_encoded: u8,
    pub attachments_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub story_points: u32,
    pub confidence: f64,
    pub reasoning: String,
    pub features: EstimateDiagnostics,
}

/// Status view of the served model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub is_trained: bool,
    pub training_stats: Option<TrainingStats>,
    pub model_type: String,
}

impl ModelInfo {
    pub fn untrained() -> Self {
        Self {
            is_trained: false,
            training_stats: None,
            model_type: MODEL_TYPE.to_string(),
        }
    }
}

impl EstimationModel {
    pub fn new(
        forest: RandomForest,
        assembler: FeatureAssembler,
        stats: TrainingStats,
    ) -> Result<Self> {
        let model = Self {
            id: Uuid::new_v4(),
            version: FORMAT_VERSION.to_string(),
            fitted: true,
            forest,
            assembler,
            stats,
        };
        model.check_consistency()?;
        Ok(model)
    }

    fn check_consistency(&self) -> Result<()> {
        if !self.fitted || !self.forest.is_fitted() {
            return Err(EstimatorError::UntrainedModel);
        }
        let expected = self.forest.n_features();
        let actual = self.assembler.feature_count();
        if expected != actual {
            return Err(EstimatorError::FeatureMismatch { expected, actual });
        }
        Ok(())
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    pub fn assembler(&self) -> &FeatureAssembler {
        &self.assembler
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            is_trained: self.fitted,
            training_stats: Some(self.stats.clone()),
            model_type: MODEL_TYPE.to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restore a stored artifact, rejecting other format versions and
    /// artifacts whose parts disagree on the vector width.
    pub fn from_json(json: &str) -> Result<Self> {
        let model: Self = serde_json::from_str(json)?;
        if model.version != FORMAT_VERSION {
            return Err(EstimatorError::UnsupportedVersion(model.version));
        }
        model.check_consistency()?;
        Ok(model)
    }

    /// Continuous score for `task`.
    pub fn predict(&self, task: &TaskRecord) -> Result<f64> {
        self.forest.predict(&self.assembler.assemble(task))
    }

    pub fn estimate(&self, task: &TaskRecord) -> Result<Estimate> {
        let text = TextFeatures::extract(&task.title, &task.description);
        let vector = self.assembler.assemble_with(task, &text);
        let raw_prediction = self.forest.predict(&vector)?;
        let story_points = scale::discretize(raw_prediction);

        let top_features = self.top_features();
        let mut reasoning = format!(
            "Estimated {} points based on comprehensive text analysis",
            story_points
        );
        if !top_features.is_empty() {
            let factors: Vec<&str> = top_features
                .iter()
                .take(REASONING_FACTORS)
                .map(|f| f.name.as_str())
                .collect();
            reasoning.push_str(&format!(". Key factors: {}", factors.join(", ")));
        }

        let combined = task.combined_text();
        let encoder = self.assembler.encoder();
        let term_vector = encoder.encode(&combined);
        let (tfidf_max_score, tfidf_mean_score) = if term_vector.is_empty() {
            (0.0, 0.0)
        } else {
            (
                term_vector.iter().copied().fold(f64::MIN, f64::max),
                term_vector.iter().sum::<f64>() / term_vector.len() as f64,
            )
        };
        let top_tfidf_terms = encoder
            .top_terms(&combined, TOP_TERMS)
            .into_iter()
            .map(|(term, score)| TermScore { term, score })
            .collect();

        let features = EstimateDiagnostics {
            raw_prediction,
            feature_count: vector.len(),
            has_description: !task.description.is_empty(),
            has_attachments: task.attachments_count.unwrap_or(0) > 0,
            has_priority: has_priority(task),
            has_task_type: task.task_type.as_deref().is_some_and(|t| !t.is_empty()),
            title_length: text.title_length,
            description_length: text.description_length,
            word_count: text.word_count,
            complexity_score: round_to(text.complexity_score(), 3),
            complexity_high: text.complexity_high,
            complexity_medium: text.complexity_medium,
            complexity_low: text.complexity_low,
            effort_high: text.effort_high,
            effort_medium: text.effort_medium,
            effort_low: text.effort_low,
            has_ui_words: text.has_ui_words,
            has_backend_words: text.has_backend_words,
            has_integration_words: text.has_integration_words,
            has_testing_words: text.has_testing_words,
            flesch_reading_ease: round_to(text.flesch_reading_ease, 2),
            flesch_kincaid_grade: round_to(text.flesch_kincaid_grade, 2),
            tfidf_feature_count: term_vector.len(),
            tfidf_max_score,
            tfidf_mean_score,
            top_features,
            top_tfidf_terms,
            priority_encoded: metadata::encode_priority(task.priority.as_deref()),
            attachments_count: metadata::encode_attachments(task.attachments_count),
        };

        Ok(Estimate {
            story_points,
            confidence: confidence(task),
            reasoning,
            features,
        })
    }

    /// Highest learned importances paired with their feature names.
    pub fn top_features(&self) -> Vec<FeatureImportance> {
        let mut ranked: Vec<FeatureImportance> = self
            .assembler
            .feature_names()
            .into_iter()
            .zip(self.forest.feature_importances())
            .map(|(name, &importance)| FeatureImportance { name, importance })
            .collect();

        ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        ranked.truncate(TOP_FEATURES);
        ranked
    }
}

/// Heuristic confidence: a base value plus bonuses for a substantive
/// description, attachments and a priority, capped at [`MAX_CONFIDENCE`].
pub fn confidence(task: &TaskRecord) -> f64 {
    let mut confidence = BASE_CONFIDENCE;
    if task.description.chars().count() > SUBSTANTIVE_DESCRIPTION {
        confidence += DESCRIPTION_BONUS;
    }
    if task.attachments_count.unwrap_or(0) > 0 {
        confidence += ATTACHMENTS_BONUS;
    }
    if has_priority(task) {
        confidence += PRIORITY_BONUS;
    }
    round_to(confidence.min(MAX_CONFIDENCE), 2)
}

fn has_priority(task: &TaskRecord) -> bool {
    task.priority.as_deref().is_some_and(|p| !p.trim().is_empty())
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
