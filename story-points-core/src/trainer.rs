//! Training orchestration: merge, fit, split, evaluate, detect overfitting.
//!
//! The trainer is pure: it returns a complete [`EstimationModel`] or an error
//! and never leaves partial state behind. Persisting and serving the result
//! is up to the caller.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::assembler::FeatureAssembler;
use crate::error::{EstimatorError, Result};
use crate::estimator::{EstimationModel, MODEL_TYPE};
use crate::forest::{ForestConfig, RandomForest};
use crate::metrics::{mean_absolute_error, r2_score};
use crate::record::TrainingRecord;
use crate::scale;
use crate::seed::default_training_records;
use crate::split::{train_test_split, SplitPlan};
use crate::stats::{
    Adjustment, OverfittingReport, OverfittingSeverity, SplitMetrics, TrainingStats,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerConfig {
    pub forest: ForestConfig,
    pub simplified_forest: ForestConfig,
    pub split_seed: u64,
    /// Samples needed for a train/validation/test split.
    pub three_way_min_samples: usize,
    /// Samples needed to hold out a test split at all.
    pub holdout_min_samples: usize,
    /// Share held out of the three-way split for validation plus test.
    pub holdout_fraction: f64,
    /// Share of the hold-out that becomes the test split.
    pub validation_share: f64,
    /// Test share of the two-way split.
    pub test_fraction: f64,
    pub mild_gap: f64,
    pub severe_gap: f64,
    /// How much the simplified forest must shrink the gap to be adopted.
    pub min_gap_improvement: f64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            forest: ForestConfig::standard(),
            simplified_forest: ForestConfig::simplified(),
            split_seed: 42,
            three_way_min_samples: 100,
            holdout_min_samples: 10,
            holdout_fraction: 0.3,
            validation_share: 0.5,
            test_fraction: 0.2,
            mild_gap: 0.2,
            severe_gap: 0.5,
            min_gap_improvement: 0.1,
        }
    }
}

impl TrainerConfig {
    pub fn validate(&self) -> Result<()> {
        self.forest.validate()?;
        self.simplified_forest.validate()?;

        for (name, value) in [
            ("holdout_fraction", self.holdout_fraction),
            ("validation_share", self.validation_share),
            ("test_fraction", self.test_fraction),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(EstimatorError::InvalidConfig(format!(
                    "{} must be within (0, 1), got {}",
                    name, value
                )));
            }
        }

        if self.holdout_min_samples < 2 {
            return Err(EstimatorError::InvalidConfig(
                "holdout_min_samples must be at least 2".into(),
            ));
        }
        if self.three_way_min_samples < self.holdout_min_samples {
            return Err(EstimatorError::InvalidConfig(
                "three_way_min_samples must not be below holdout_min_samples".into(),
            ));
        }
        if self.mild_gap > self.severe_gap {
            return Err(EstimatorError::InvalidConfig(
                "mild_gap must not exceed severe_gap".into(),
            ));
        }
        Ok(())
    }

    /// Choose the split for `n_samples`.
    pub fn plan_split(&self, n_samples: usize) -> SplitPlan {
        let indices: Vec<usize> = (0..n_samples).collect();

        if n_samples >= self.three_way_min_samples {
            let (train, holdout) =
                train_test_split(&indices, self.holdout_fraction, self.split_seed);
            let (validation, test) =
                train_test_split(&holdout, self.validation_share, self.split_seed);
            SplitPlan::ThreeWay {
                train,
                validation,
                test,
            }
        } else if n_samples >= self.holdout_min_samples {
            let (train, test) = train_test_split(&indices, self.test_fraction, self.split_seed);
            SplitPlan::TrainTest { train, test }
        } else {
            SplitPlan::Resubstitution { all: indices }
        }
    }
}

/// Whether the simplified forest shrank the gap by more than `min_improvement`.
pub fn adopt_simplified(original_gap: f64, simplified_gap: f64, min_improvement: f64) -> bool {
    simplified_gap < original_gap - min_improvement
}

struct Dataset {
    x: Vec<Vec<f64>>,
    y: Vec<f64>,
}

impl Dataset {
    fn rows(&self, indices: &[usize]) -> (Vec<Vec<f64>>, Vec<f64>) {
        let x = indices.iter().map(|&i| self.x[i].clone()).collect();
        let y = indices.iter().map(|&i| self.y[i]).collect();
        (x, y)
    }
}

/// Metrics of one forest on every split of a plan.
struct Evaluation {
    train: SplitMetrics,
    validation: Option<SplitMetrics>,
    test: SplitMetrics,
}

impl Evaluation {
    fn gap(&self) -> Option<f64> {
        self.validation.map(|validation| validation.mae - self.train.mae)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Train on `records` plus the built-in seed examples.
    pub fn train(&self, records: Vec<TrainingRecord>) -> Result<EstimationModel> {
        let supplied = records.len();
        let mut merged = records;
        merged.extend(default_training_records());
        if merged.is_empty() {
            return Err(EstimatorError::EmptyTrainingSet);
        }

        info!(
            supplied,
            total = merged.len(),
            "Training story point model"
        );

        let corpus: Vec<String> = merged.iter().map(|r| r.task.combined_text()).collect();
        let mut assembler = FeatureAssembler::new();
        assembler.fit_terms(&corpus);

        let data = Dataset {
            x: merged.iter().map(|r| assembler.assemble(&r.task)).collect(),
            y: merged.iter().map(|r| r.story_points).collect(),
        };
        let feature_count = assembler.feature_count();

        let plan = self.config.plan_split(data.y.len());
        info!(
            split = ?plan.kind(),
            train = plan.train().len(),
            validation = plan.validation().map_or(0, <[usize]>::len),
            test = plan.test().len(),
            "Split training data"
        );

        let (train_x, train_y) = data.rows(plan.train());
        let mut forest = RandomForest::new(self.config.forest.clone());
        forest.fit(&train_x, &train_y)?;
        let mut evaluation = evaluate(&forest, &data, &plan)?;
        log_evaluation(&evaluation);

        let mut overfitting = None;
        let mut simplification_attempted = false;
        let mut adjustment = None;

        if let Some(gap) = evaluation.gap() {
            let severity =
                OverfittingSeverity::classify(gap, self.config.mild_gap, self.config.severe_gap);
            let report = OverfittingReport::new(gap, severity);
            match severity {
                OverfittingSeverity::Healthy => info!(gap, "Good generalization"),
                OverfittingSeverity::Mild => info!(gap, "Mild overfitting detected"),
                OverfittingSeverity::Severe => warn!(
                    gap,
                    level = ?report.level,
                    train_mae = evaluation.train.mae,
                    "Severe overfitting detected, trying a simplified forest"
                ),
            }
            overfitting = Some(report);

            if severity == OverfittingSeverity::Severe {
                simplification_attempted = true;
                let mut simplified = RandomForest::new(self.config.simplified_forest.clone());
                simplified.fit(&train_x, &train_y)?;
                let simplified_eval = evaluate(&simplified, &data, &plan)?;
                let simplified_gap = simplified_eval.gap().unwrap_or(gap);

                if adopt_simplified(gap, simplified_gap, self.config.min_gap_improvement) {
                    info!(
                        original_gap = gap,
                        adjusted_gap = simplified_gap,
                        "Overfitting reduced, switching to simplified forest"
                    );
                    adjustment = Some(Adjustment {
                        method: format!(
                            "Reduced complexity ({})",
                            self.config.simplified_forest.describe()
                        ),
                        original_gap: gap,
                        adjusted_gap: simplified_gap,
                    });
                    forest = simplified;
                    evaluation = simplified_eval;
                    log_evaluation(&evaluation);
                } else {
                    warn!(
                        original_gap = gap,
                        simplified_gap,
                        "Simplified forest did not help, keeping original"
                    );
                }
            }
        }

        let stats = TrainingStats {
            split_kind: plan.kind(),
            total_samples: data.y.len(),
            feature_count,
            train: evaluation.train,
            validation: evaluation.validation,
            test: evaluation.test,
            mae: evaluation.test.mae,
            r2: evaluation.test.r2,
            overfitting,
            simplification_attempted,
            adjustment,
            model_type: MODEL_TYPE.to_string(),
            trained_at: Utc::now(),
        };

        info!(
            samples = stats.total_samples,
            features = stats.feature_count,
            mae = stats.mae,
            r2 = stats.r2,
            gap = ?stats.overfitting_gap(),
            adjusted = stats.model_adjusted(),
            "Model trained"
        );

        EstimationModel::new(forest, assembler, stats)
    }
}

fn evaluate(forest: &RandomForest, data: &Dataset, plan: &SplitPlan) -> Result<Evaluation> {
    Ok(Evaluation {
        train: split_metrics(forest, data, plan.train())?,
        validation: plan
            .validation()
            .map(|indices| split_metrics(forest, data, indices))
            .transpose()?,
        test: split_metrics(forest, data, plan.test())?,
    })
}

/// MAE on discretized predictions against raw targets, R² on raw predictions.
fn split_metrics(
    forest: &RandomForest,
    data: &Dataset,
    indices: &[usize],
) -> Result<SplitMetrics> {
    let (x, y) = data.rows(indices);
    let raw = forest.predict_many(&x)?;
    let snapped: Vec<f64> = raw.iter().map(|&p| scale::discretize(p) as f64).collect();

    Ok(SplitMetrics {
        samples: indices.len(),
        mae: mean_absolute_error(&y, &snapped),
        r2: r2_score(&y, &raw),
    })
}

fn log_evaluation(evaluation: &Evaluation) {
    debug!(samples = evaluation.train.samples, mae = evaluation.train.mae, "Train split");
    if let Some(validation) = evaluation.validation {
        debug!(samples = validation.samples, mae = validation.mae, "Validation split");
    }
    debug!(samples = evaluation.test.samples, mae = evaluation.test.mae, "Test split");
}
