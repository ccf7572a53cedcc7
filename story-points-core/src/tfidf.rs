//! Corpus-fitted TF-IDF encoder over unigrams and bigrams.
//!
//! Tokens are runs of two or more letters from the cleaned text, English stop
//! words are dropped before bigrams are formed, and the vocabulary keeps the
//! `max_features` terms with the highest corpus frequency (ties broken
//! alphabetically). Vectors use raw counts times smoothed IDF,
//! `ln((1 + n) / (1 + df)) + 1`, followed by L2 normalisation.

mod stop_words;

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::text::clean_text;

pub use self::stop_words::ENGLISH_STOP_WORDS;

/// Vocabulary cap used by the estimator.
pub const MAX_TERMS: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "EncoderState", into = "EncoderState")]
pub struct TermImportanceEncoder {
    max_features: usize,
    /// Vocabulary in index order (alphabetical).
    terms: Vec<String>,
    idf: Vec<f64>,
    index: HashMap<String, usize>,
    fitted: bool,
}

/// Persisted form; the term lookup table is rebuilt on load.
#[derive(Serialize, Deserialize)]
struct EncoderState {
    max_features: usize,
    terms: Vec<String>,
    idf: Vec<f64>,
    fitted: bool,
}

impl From<EncoderState> for TermImportanceEncoder {
    fn from(state: EncoderState) -> Self {
        let mut encoder = Self {
            max_features: state.max_features,
            terms: state.terms,
            idf: state.idf,
            index: HashMap::new(),
            fitted: state.fitted,
        };
        encoder.rebuild_index();
        encoder
    }
}

impl From<TermImportanceEncoder> for EncoderState {
    fn from(encoder: TermImportanceEncoder) -> Self {
        Self {
            max_features: encoder.max_features,
            terms: encoder.terms,
            idf: encoder.idf,
            fitted: encoder.fitted,
        }
    }
}

impl Default for TermImportanceEncoder {
    fn default() -> Self {
        Self::new(MAX_TERMS)
    }
}

impl TermImportanceEncoder {
    pub fn new(max_features: usize) -> Self {
        Self {
            max_features,
            terms: Vec::new(),
            idf: Vec::new(),
            index: HashMap::new(),
            fitted: false,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    pub fn vocabulary_size(&self) -> usize {
        self.terms.len()
    }

    /// Terms in vector order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Build vocabulary and IDF weights from `corpus`, discarding any previous fit.
    pub fn fit<S: AsRef<str>>(&mut self, corpus: &[S]) {
        let documents: Vec<Vec<String>> = corpus
            .iter()
            .map(|text| analyze(&clean_text(text.as_ref())))
            .collect();

        let mut term_frequency: BTreeMap<&str, usize> = BTreeMap::new();
        let mut document_frequency: HashMap<&str, usize> = HashMap::new();

        for doc in &documents {
            let mut seen = HashSet::new();
            for term in doc {
                *term_frequency.entry(term.as_str()).or_insert(0) += 1;
                if seen.insert(term.as_str()) {
                    *document_frequency.entry(term.as_str()).or_insert(0) += 1;
                }
            }
        }

        // BTreeMap iteration is alphabetical, so the stable sort keeps ties alphabetical.
        let mut ranked: Vec<(&str, usize)> = term_frequency.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(self.max_features);

        let mut terms: Vec<String> = ranked.into_iter().map(|(t, _)| t.to_string()).collect();
        terms.sort();

        let n_documents = documents.len() as f64;
        self.idf = terms
            .iter()
            .map(|term| {
                let df = document_frequency.get(term.as_str()).copied().unwrap_or(0) as f64;
                ((1.0 + n_documents) / (1.0 + df)).ln() + 1.0
            })
            .collect();
        self.terms = terms;
        self.rebuild_index();
        self.fitted = true;

        tracing::debug!(
            documents = documents.len(),
            vocabulary = self.terms.len(),
            "Fitted term-importance encoder"
        );
    }

    /// Weighted relevance of every vocabulary term for `text`.
    ///
    /// Returns an empty vector before [`fit`](Self::fit) has been called.
    pub fn encode(&self, text: &str) -> Vec<f64> {
        if !self.fitted {
            return Vec::new();
        }

        let mut vector = vec![0.0; self.terms.len()];
        for term in analyze(&clean_text(text)) {
            if let Some(&idx) = self.index.get(&term) {
                vector[idx] += 1.0;
            }
        }

        for (value, idf) in vector.iter_mut().zip(&self.idf) {
            *value *= idf;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }

        vector
    }

    /// The `top_n` highest scoring terms of `text`, zero scores excluded.
    pub fn top_terms(&self, text: &str, top_n: usize) -> Vec<(String, f64)> {
        let mut scored: Vec<(String, f64)> = self
            .encode(text)
            .into_iter()
            .zip(&self.terms)
            .filter(|(score, _)| *score > 0.0)
            .map(|(score, term)| (term.clone(), score))
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        scored.truncate(top_n);
        scored
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .terms
            .iter()
            .enumerate()
            .map(|(idx, term)| (term.clone(), idx))
            .collect();
    }
}

/// Unigrams then bigrams of the non-stop-word tokens of already cleaned text.
fn analyze(clean: &str) -> Vec<String> {
    let tokens: Vec<&str> = clean
        .split_whitespace()
        .filter(|token| token.len() >= 2 && !ENGLISH_STOP_WORDS.contains(token))
        .collect();

    let mut terms: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
    terms.extend(tokens.windows(2).map(|pair| format!("{} {}", pair[0], pair[1])));
    terms
}
