// Tokenizer with stop-word filtering.
//
// Lowercases text, strips URLs and e-mail addresses, splits on anything that
// isn't a letter, digit or inner apostrophe, then drops short words, purely
// numeric words and stop words. English stop words come from the
// `stop-words` crate; callers can add more (from a file, or the seed term).

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use regex_lite::Regex;
use stop_words::{get, LANGUAGE};

use super::frequency::FrequencyTable;

/// Default minimum token length, in characters.
pub const DEFAULT_MIN_TOKEN_LEN: usize = 2;

const NOISE_PATTERN: &str = r"(?:https?://|www\.)\S+|\S+@\S+\.\S+";

/// Splits text into normalized content tokens.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    stop_words: HashSet<String>,
    /// Tokens shorter than this many characters are dropped (never below 1)
    min_len: usize,
    noise: Regex,
}

impl Tokenizer {
    /// A tokenizer with the given stop words and minimum length.
    pub fn new<I, S>(stop_words: I, min_len: usize) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let noise = Regex::new(NOISE_PATTERN).context("Failed to compile tokenizer pattern")?;
        Ok(Self {
            stop_words: stop_words
                .into_iter()
                .map(|w| normalize(w.as_ref().trim()))
                .filter(|w| !w.is_empty())
                .collect(),
            min_len: min_len.max(1),
            noise,
        })
    }

    /// A tokenizer using the English stop-word list.
    pub fn english(min_len: usize) -> Result<Self> {
        let stop_words: Vec<String> = get(LANGUAGE::English);
        Self::new(stop_words, min_len)
    }

    /// Add more stop words. Input is normalized the same way as text.
    pub fn extend_stop_words<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            let normalized = normalize(word.as_ref());
            for token in split_words(&normalized) {
                self.stop_words.insert(token.to_string());
            }
        }
    }

    /// Load extra stop words from a file, one per line. Blank lines and
    /// lines starting with `#` are ignored.
    pub fn load_stop_words_file(&mut self, path: &Path) -> Result<usize> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read stop words from {}", path.display()))?;
        let words: Vec<&str> = contents
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .collect();
        let count = words.len();
        self.extend_stop_words(words);
        Ok(count)
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    pub fn min_len(&self) -> usize {
        self.min_len
    }

    /// Normalized content tokens in document order.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized = normalize(text);
        let cleaned = self.noise.replace_all(&normalized, " ");

        split_words(&cleaned)
            .filter(|w| w.chars().count() >= self.min_len)
            .filter(|w| !w.chars().all(|c| c.is_numeric()))
            .filter(|w| !self.stop_words.contains(*w))
            .map(str::to_string)
            .collect()
    }

    /// Tokenize and count in one pass.
    pub fn count(&self, text: &str) -> FrequencyTable {
        let mut table = FrequencyTable::new();
        for token in self.tokenize(text) {
            table.add(&token);
        }
        table
    }
}

/// Lowercase and fold typographic apostrophes to ASCII, matching the
/// spelling used by the stop-word lists.
fn normalize(text: &str) -> String {
    text.to_lowercase().replace(['\u{2019}', '\u{2018}'], "'")
}

/// Split on non-word characters, keeping apostrophes only when they sit
/// between two letters (`don't` stays whole, `'quoted'` loses its quotes).
/// Expects text that has already been through `normalize`.
fn split_words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|w| w.trim_matches('\''))
        .filter(|w| !w.is_empty())
}
