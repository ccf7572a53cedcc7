//! Readability formulas over raw (uncleaned) text.

/// Sentence, word, syllable and character statistics of a text.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct TextStats {
    sentences: usize,
    words: usize,
    syllables: usize,
    characters: usize,
}

impl TextStats {
    fn of(text: &str) -> Self {
        let words: Vec<&str> = text
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
            .filter(|w| !w.is_empty())
            .collect();

        Self {
            sentences: count_sentences(text),
            words: words.len(),
            syllables: words.iter().map(|w| syllables_in_word(w)).sum(),
            characters: text.chars().filter(|c| !c.is_whitespace()).count(),
        }
    }

    fn words_per_sentence(&self) -> f64 {
        self.words as f64 / self.sentences.max(1) as f64
    }

    fn syllables_per_word(&self) -> f64 {
        self.syllables as f64 / self.words.max(1) as f64
    }

    fn characters_per_word(&self) -> f64 {
        self.characters as f64 / self.words.max(1) as f64
    }
}

/// The three readability scores used as features.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Readability {
    pub flesch_reading_ease: f64,
    pub flesch_kincaid_grade: f64,
    pub automated_readability_index: f64,
}

impl Readability {
    /// Scores for `text`; all zero when the text has no words.
    pub fn of(text: &str) -> Self {
        let stats = TextStats::of(text);
        if stats.words == 0 {
            return Self::default();
        }

        let wps = stats.words_per_sentence();
        let spw = stats.syllables_per_word();

        Self {
            flesch_reading_ease: 206.835 - 1.015 * wps - 84.6 * spw,
            flesch_kincaid_grade: 0.39 * wps + 11.8 * spw - 15.59,
            automated_readability_index: 4.71 * stats.characters_per_word() + 0.5 * wps - 21.43,
        }
    }
}

/// Count sentences by terminal punctuation; unpunctuated text is one sentence.
fn count_sentences(text: &str) -> usize {
    let mut count = 0;
    let mut prev_char = ' ';

    for c in text.chars() {
        if matches!(c, '.' | '!' | '?') && !matches!(prev_char, '.' | '!' | '?') {
            count += 1;
        }
        prev_char = c;
    }

    if count == 0 && !text.trim().is_empty() {
        count = 1;
    }

    count
}

/// Vowel-group syllable heuristic with a silent trailing 'e'.
fn syllables_in_word(word: &str) -> usize {
    let word = word.to_lowercase();
    let mut count = 0;
    let mut prev_was_vowel = false;

    for c in word.chars() {
        let is_vowel = matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        if is_vowel && !prev_was_vowel {
            count += 1;
        }
        prev_was_vowel = is_vowel;
    }

    if word.ends_with('e') && !word.ends_with("le") && count > 1 {
        count -= 1;
    }

    count.max(1)
}
