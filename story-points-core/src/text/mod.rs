//! Lexical, readability and keyword features of a task's title and description.

pub mod keywords;
pub mod readability;

use serde::{Deserialize, Serialize};

use self::keywords::*;
use self::readability::Readability;

/// Number of entries produced by [`TextFeatures::to_vec`].
pub const TEXT_FEATURE_COUNT: usize = 17;

/// Feature names in vector order.
pub const TEXT_FEATURE_NAMES: [&str; TEXT_FEATURE_COUNT] = [
    "title_length",
    "description_length",
    "total_text_length",
    "word_count",
    "flesch_reading_ease",
    "flesch_kincaid_grade",
    "automated_readability_index",
    "complexity_high",
    "complexity_medium",
    "complexity_low",
    "effort_high_effort",
    "effort_medium_effort",
    "effort_low_effort",
    "has_ui_words",
    "has_backend_words",
    "has_integration_words",
    "has_testing_words",
];

/// Lowercase, replace everything but ASCII letters with spaces, collapse whitespace.
pub fn clean_text(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| {
            if c.is_ascii_alphabetic() || c.is_whitespace() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect();

    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Title and description joined by a space, trimmed.
pub fn combine(title: &str, description: &str) -> String {
    format!("{} {}", title, description).trim().to_string()
}

/// The 17 text features of a task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextFeatures {
    pub title_length: usize,
    pub description_length: usize,
    pub total_text_length: usize,
    pub word_count: usize,
    pub flesch_reading_ease: f64,
    pub flesch_kincaid_grade: f64,
    pub automated_readability_index: f64,
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
}

impl TextFeatures {
    pub fn extract(title: &str, description: &str) -> Self {
        let combined = combine(title, description);
        let clean = clean_text(&combined);

        let readability = if combined.is_empty() {
            Readability::default()
        } else {
            Readability::of(&combined)
        };

        Self {
            title_length: title.chars().count(),
            description_length: description.chars().count(),
            total_text_length: combined.chars().count(),
            word_count: clean.split_whitespace().count(),
            flesch_reading_ease: readability.flesch_reading_ease,
            flesch_kincaid_grade: readability.flesch_kincaid_grade,
            automated_readability_index: readability.automated_readability_index,
            complexity_high: count_occurrences(&clean, COMPLEXITY_HIGH),
            complexity_medium: count_occurrences(&clean, COMPLEXITY_MEDIUM),
            complexity_low: count_occurrences(&clean, COMPLEXITY_LOW),
            effort_high: count_occurrences(&clean, EFFORT_HIGH),
            effort_medium: count_occurrences(&clean, EFFORT_MEDIUM),
            effort_low: count_occurrences(&clean, EFFORT_LOW),
            has_ui_words: contains_any(&clean, UI_WORDS),
            has_backend_words: contains_any(&clean, BACKEND_WORDS),
            has_integration_words: contains_any(&clean, INTEGRATION_WORDS),
            has_testing_words: contains_any(&clean, TESTING_WORDS),
        }
    }

    /// Weighted keyword density: `(3·high + 2·medium + low) / max(1, words)`.
    pub fn complexity_score(&self) -> f64 {
        let weighted = self.complexity_high * 3 + self.complexity_medium * 2 + self.complexity_low;
        weighted as f64 / self.word_count.max(1) as f64
    }

    /// Features in the order of [`TEXT_FEATURE_NAMES`].
    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.title_length as f64,
            self.description_length as f64,
            self.total_text_length as f64,
            self.word_count as f64,
            self.flesch_reading_ease,
            self.flesch_kincaid_grade,
            self.automated_readability_index,
            self.complexity_high as f64,
            self.complexity_medium as f64,
            self.complexity_low as f64,
            self.effort_high as f64,
            self.effort_medium as f64,
            self.effort_low as f64,
            flag(self.has_ui_words),
            flag(self.has_backend_words),
            flag(self.has_integration_words),
            flag(self.has_testing_words),
        ]
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}
