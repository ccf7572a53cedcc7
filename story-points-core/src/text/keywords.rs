//! Fixed keyword tables used by the text features.
//!
//! Matching is substring based on cleaned text, so a keyword also fires
//! inside longer words ("api" in "rapid", "all" in "small"). Trained models
//! depend on this behaviour; switching to word-boundary matching would shift
//! the feature distributions.

pub const COMPLEXITY_HIGH: &[&str] = &[
    "integrate",
    "integration",
    "complex",
    "algorithm",
    "optimization",
    "performance",
    "security",
    "authentication",
    "authorization",
    "migration",
    "refactor",
    "architecture",
    "framework",
    "api",
    "database",
    "schema",
    "synchronization",
    // Never matches after cleaning strips the hyphen; kept for parity.
    "real-time",
    "scalable",
];

pub const COMPLEXITY_MEDIUM: &[&str] = &[
    "implement",
    "create",
    "develop",
    "build",
    "add",
    "feature",
    "function",
    "component",
    "service",
    "validation",
    "form",
    "interface",
    "ui",
    "frontend",
    "backend",
    "endpoint",
];

pub const COMPLEXITY_LOW: &[&str] = &[
    "fix", "bug", "typo", "update", "change", "modify", "style", "css", "color", "text", "button",
    "link", "minor", "small", "simple", "quick", "easy",
];

pub const EFFORT_HIGH: &[&str] = &[
    "full",
    "complete",
    "entire",
    "comprehensive",
    "multiple",
    "several",
    "all",
    "various",
    "many",
    "numerous",
];

pub const EFFORT_MEDIUM: &[&str] = &["some", "few", "partial", "specific", "particular", "certain"];

pub const EFFORT_LOW: &[&str] = &["single", "one", "minor", "small", "quick", "simple"];

pub const UI_WORDS: &[&str] = &["ui", "interface", "frontend", "design", "css", "html"];

pub const BACKEND_WORDS: &[&str] = &["backend", "api", "database", "server", "service"];

pub const INTEGRATION_WORDS: &[&str] = &["integrate", "connect", "sync", "import", "export"];

pub const TESTING_WORDS: &[&str] = &["test", "testing", "unit", "integration", "e2e"];

/// Total non-overlapping occurrences of every keyword in `clean`.
pub fn count_occurrences(clean: &str, keywords: &[&str]) -> usize {
    keywords
        .iter()
        .map(|keyword| clean.matches(&*keyword.to_lowercase()).count())
        .sum()
}

/// Whether any keyword occurs as a substring of `clean`.
pub fn contains_any(clean: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| clean.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_every_occurrence() {
        assert_eq!(count_occurrences("fix the bug and fix the typo", COMPLEXITY_LOW), 4);
    }

    #[test]
    fn matches_inside_longer_words() {
        assert_eq!(count_occurrences("rapid prototype", &["api"]), 1);
        assert!(contains_any("rapid prototype", BACKEND_WORDS));
    }

    #[test]
    fn hyphenated_keyword_never_matches_cleaned_text() {
        assert_eq!(count_occurrences("real time sync", &["real-time"]), 0);
    }
}
