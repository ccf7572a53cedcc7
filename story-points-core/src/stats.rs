//! Statistics recorded for each training run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use crate::split::SplitKind;

/// Error and fit of one split, measured on discretized predictions for MAE
/// and on raw predictions for R².
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitMetrics {
    pub samples: usize,
    pub mae: f64,
    pub r2: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverfittingSeverity {
    Healthy,
    /// Flagged only, never corrected.
    Mild,
    /// Triggers a retry with a simplified forest.
    Severe,
}

impl OverfittingSeverity {
    pub fn classify(gap: f64, mild_threshold: f64, severe_threshold: f64) -> Self {
        if gap > severe_threshold {
            Self::Severe
        } else if gap > mild_threshold {
            Self::Mild
        } else {
            Self::Healthy
        }
    }

    pub fn is_overfitting(self) -> bool {
        !matches!(self, Self::Healthy)
    }
}

/// Finer label reported next to the severity: severe gaps above
/// [`HIGH_GAP`](Self::HIGH_GAP) are `High`, the rest `Medium`; mild gaps are `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverfittingLevel {
    Low,
    Medium,
    High,
}

impl OverfittingLevel {
    pub const HIGH_GAP: f64 = 1.0;

    pub fn grade(gap: f64, severity: OverfittingSeverity) -> Option<Self> {
        match severity {
            OverfittingSeverity::Healthy => None,
            OverfittingSeverity::Mild => Some(Self::Low),
            OverfittingSeverity::Severe if gap > Self::HIGH_GAP => Some(Self::High),
            OverfittingSeverity::Severe => Some(Self::Medium),
        }
    }
}

pub const SEVERE_OVERFITTING_RECOMMENDATIONS: [&str; 4] = [
    "Increase training data size",
    "Reduce model complexity (max_depth, n_estimators)",
    "Add more regularization",
    "Use feature selection to reduce dimensionality",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverfittingReport {
    /// Validation MAE minus training MAE of the first fit.
    pub gap: f64,
    pub severity: OverfittingSeverity,
    #[serde(default)]
    pub detected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<OverfittingLevel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recommendations: Vec<String>,
}

impl OverfittingReport {
    pub fn new(gap: f64, severity: OverfittingSeverity) -> Self {
        let recommendations = match severity {
            OverfittingSeverity::Severe => SEVERE_OVERFITTING_RECOMMENDATIONS
                .iter()
                .map(|r| r.to_string())
                .collect(),
            _ => Vec::new(),
        };
        Self {
            gap,
            severity,
            detected: severity.is_overfitting(),
            level: OverfittingLevel::grade(gap, severity),
            recommendations,
        }
    }
}

/// Recorded when the simplified forest replaced the original one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub method: String,
    pub original_gap: f64,
    pub adjusted_gap: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingStats {
    pub split_kind: SplitKind,
    pub total_samples: usize,
    pub feature_count: usize,
    pub train: SplitMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<SplitMetrics>,
    pub test: SplitMetrics,
    /// Test split MAE.
    pub mae: f64,
    /// Test split R².
    pub r2: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overfitting: Option<OverfittingReport>,
    #[serde(default)]
    pub simplification_attempted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjustment: Option<Adjustment>,
    pub model_type: String,
    pub trained_at: DateTime<Utc>,
}

impl TrainingStats {
    pub fn model_adjusted(&self) -> bool {
        self.adjustment.is_some()
    }

    /// Validation minus training MAE of the model in production.
    pub fn overfitting_gap(&self) -> Option<f64> {
        self.validation.map(|validation| validation.mae - self.train.mae)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_gaps_by_threshold() {
        use OverfittingSeverity::*;
        let classify = |gap| OverfittingSeverity::classify(gap, 0.2, 0.5);
        assert_eq!(classify(0.1), Healthy);
        assert_eq!(classify(0.2), Healthy);
        assert_eq!(classify(0.3), Mild);
        assert_eq!(classify(0.5), Mild);
        assert_eq!(classify(0.51), Severe);
        assert_eq!(classify(-1.0), Healthy);
    }

    #[test]
    fn only_severe_reports_carry_recommendations() {
        let severe = OverfittingReport::new(0.8, OverfittingSeverity::Severe);
        assert_eq!(severe.recommendations.len(), 4);
        assert!(OverfittingReport::new(0.3, OverfittingSeverity::Mild).recommendations.is_empty());
    }

    #[test]
    fn grades_severe_gaps_above_one_as_high() {
        let report = |gap, severity| OverfittingReport::new(gap, severity);

        let high = report(1.2, OverfittingSeverity::Severe);
        assert!(high.detected);
        assert_eq!(high.level, Some(OverfittingLevel::High));
        assert_eq!(report(1.0, OverfittingSeverity::Severe).level, Some(OverfittingLevel::Medium));
        assert_eq!(report(0.6, OverfittingSeverity::Severe).level, Some(OverfittingLevel::Medium));
        assert_eq!(report(0.3, OverfittingSeverity::Mild).level, Some(OverfittingLevel::Low));

        let healthy = report(0.1, OverfittingSeverity::Healthy);
        assert!(!healthy.detected);
        assert_eq!(healthy.level, None);

        let json = serde_json::to_value(&high).unwrap();
        assert_eq!(json["level"], "High");
        assert_eq!(json["detected"], true);
    }

    #[test]
    fn severity_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&OverfittingSeverity::Severe).unwrap(),
            "\"severe\""
        );
        assert_eq!(serde_json::to_string(&SplitKind::ThreeWay).unwrap(), "\"three_way\"");
    }
}
