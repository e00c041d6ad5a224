//! Configurable Stop Words
//!
//! Holds the function-word table used to filter content words out of
//! frequency rankings, with loading from files or custom lists.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::{rank_by_frequency, WordCount};

/// Default English stop words.
pub static DEFAULT_ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from",
    "has", "he", "in", "is", "it", "its", "of", "on", "that", "the",
    "to", "was", "were", "will", "with", "this", "but", "they",
    "have", "had", "what", "when", "where", "who", "which", "why", "how",
    "all", "each", "every", "both", "few", "more", "most", "other", "some",
    "such", "no", "nor", "not", "only", "own", "same", "so", "than", "too",
    "very", "can", "just", "should", "now", "or", "if", "then", "else",
    "do", "does", "did", "doing", "would", "could", "might",
    "must", "shall", "may", "here", "there", "am", "been", "being",
];

/// Tokens shorter than this never count as content words, even when they
/// are not in the stop word table.
const DEFAULT_MIN_TOKEN_LEN: usize = 3;

/// Configurable stop words collection.
#[derive(Debug, Clone)]
pub struct StopWords {
    words: HashSet<String>,
    case_insensitive: bool,
    min_token_len: usize,
}

impl Default for StopWords {
    fn default() -> Self {
        Self::english()
    }
}

impl StopWords {
    /// Create an empty stop words collection.
    pub fn new() -> Self {
        Self {
            words: HashSet::new(),
            case_insensitive: false,
            min_token_len: DEFAULT_MIN_TOKEN_LEN,
        }
    }

    /// Create from a slice of words.
    pub fn from_slice(words: &[&str]) -> Self {
        Self {
            words: words.iter().map(|s| s.to_string()).collect(),
            case_insensitive: false,
            min_token_len: DEFAULT_MIN_TOKEN_LEN,
        }
    }

    /// Create with default English stop words.
    pub fn english() -> Self {
        let mut sw = Self::from_slice(DEFAULT_ENGLISH_STOP_WORDS);
        sw.case_insensitive = true;
        sw
    }

    /// Load stop words from a file (one word per line).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, std::io::Error> {
        let content = fs::read_to_string(path)?;
        let words: HashSet<String> = content
            .lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|s| s.to_string())
            .collect();

        Ok(Self {
            words,
            case_insensitive: false,
            min_token_len: DEFAULT_MIN_TOKEN_LEN,
        })
    }

    /// Set case sensitivity.
    pub fn case_insensitive(mut self, value: bool) -> Self {
        self.case_insensitive = value;
        self
    }

    /// Set the minimum content-token length.
    pub fn min_token_len(mut self, value: usize) -> Self {
        self.min_token_len = value;
        self
    }

    /// Add a word to the stop words list.
    pub fn add(&mut self, word: impl Into<String>) {
        self.words.insert(word.into());
    }

    /// Remove a word from the stop words list.
    pub fn remove(&mut self, word: &str) {
        self.words.remove(word);
    }

    /// Check if a word is a stop word.
    pub fn contains(&self, word: &str) -> bool {
        if self.case_insensitive {
            self.words.contains(&word.to_lowercase())
        } else {
            self.words.contains(word)
        }
    }

    /// Get the number of stop words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Rank the top `limit` content words of an already-lowercased token
    /// stream by descending frequency, ties broken by first occurrence.
    ///
    /// Stop words and tokens shorter than the configured minimum are
    /// excluded. Pure function of the inputs and the word table.
    pub fn top_words(&self, tokens: &[String], limit: usize) -> Vec<WordCount> {
        rank_by_frequency(
            tokens
                .iter()
                .map(String::as_str)
                .filter(|token| token.chars().count() >= self.min_token_len)
                .filter(|token| !self.contains(token)),
            limit,
        )
    }
}
