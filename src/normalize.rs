use regex::Regex;
use std::collections::HashSet;

use crate::stopwords;

/// Letters kept besides ASCII `a-z`.
const ACCENTED_LETTERS: &[char] = &['á', 'é', 'í', 'ó', 'ú', 'ñ', 'ü'];

/// Tokens of this many characters or fewer are dropped.
const MAX_DROPPED_TOKEN_LEN: usize = 2;

/// Turns raw headline/body text into the canonical token string the
/// vocabulary was built from.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    url_pattern: Regex,
    stop_words: HashSet<String>,
}

impl TextNormalizer {
    pub fn new(stop_words: HashSet<String>) -> Self {
        let url_pattern = Regex::new(r"http\S+|www\S+|https\S+").expect("static URL pattern");
        Self {
            url_pattern,
            stop_words,
        }
    }

    pub fn spanish() -> Self {
        Self::new(stopwords::spanish())
    }

    pub fn stop_word_count(&self) -> usize {
        self.stop_words.len()
    }

    pub fn normalize(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let without_urls = self.url_pattern.replace_all(&lowered, "");

        let letters_only: String = without_urls
            .chars()
            .filter(|c| is_kept_char(*c))
            .collect();

        letters_only
            .split_whitespace()
            .filter(|token| !self.stop_words.contains(*token))
            .filter(|token| token.chars().count() > MAX_DROPPED_TOKEN_LEN)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::spanish()
    }
}

fn is_kept_char(c: char) -> bool {
    c.is_ascii_lowercase() || ACCENTED_LETTERS.contains(&c) || c.is_whitespace()
}
