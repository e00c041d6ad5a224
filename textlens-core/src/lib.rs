//! Analysis History
//!
//! Bounded in-memory store of analysis results and the request-facing
//! service that ties the analyzer, the classifier and the store together.

use std::collections::VecDeque;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use textlens_analyzer::{
    AnalyzeError, ClassifierConfig, Sentiment, SentimentAnalysis, SentimentClassifier, StopWords,
    TextAnalysis, TextAnalyzer, WordCount,
};

/// Reference search result limit.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// One analyzed text with its statistics; never mutated after insertion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub text: String,
    pub analysis: TextAnalysis,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate statistics over the retained history, recomputed per query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub total_analyses: usize,
    pub average_word_count: f64,
    pub average_character_count: f64,
    pub last_analysis: Option<DateTime<Utc>>,
}

/// Bounded, insertion-ordered store of analysis results, most recent first.
#[derive(Debug)]
pub struct AnalysisCache {
    entries: VecDeque<AnalysisResult>,
    capacity: usize,
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisCache {
    pub const DEFAULT_CAPACITY: usize = 1000;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Capacity is floored at 1.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Insert at the head; entries past capacity are evicted oldest first.
    pub fn add(&mut self, result: AnalysisResult) {
        self.entries.push_front(result);
        if self.entries.len() > self.capacity {
            tracing::debug!(capacity = self.capacity, "evicting oldest history entries");
            self.entries.truncate(self.capacity);
        }
    }

    /// Up to `limit` most recent entries, head first. Never errors; the
    /// limit is clamped to what the store holds.
    pub fn history(&self, limit: usize) -> Vec<AnalysisResult> {
        self.entries.iter().take(limit).cloned().collect()
    }

    /// Case-insensitive substring search against the analyzed text only.
    ///
    /// An empty or whitespace-only term matches nothing and skips the scan.
    /// Matches preserve head-first recency order.
    pub fn search(&self, term: &str, limit: usize) -> Vec<AnalysisResult> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return Vec::new();
        }

        self.entries
            .iter()
            .filter(|entry| entry.text.to_lowercase().contains(&term))
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn total_count(&self) -> usize {
        self.entries.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Aggregate word and character counts across every retained entry.
    pub fn stats(&self) -> CacheStats {
        if self.entries.is_empty() {
            return CacheStats {
                total_analyses: 0,
                average_word_count: 0.0,
                average_character_count: 0.0,
                last_analysis: None,
            };
        }

        let total = self.entries.len();
        let total_words: usize = self.entries.iter().map(|e| e.analysis.word_count).sum();
        let total_characters: usize = self
            .entries
            .iter()
            .map(|e| e.analysis.character_count)
            .sum();

        CacheStats {
            total_analyses: total,
            average_word_count: round2(total_words as f64 / total as f64),
            average_character_count: round2(total_characters as f64 / total as f64),
            last_analysis: self.entries.front().map(|e| e.timestamp),
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Request-facing façade over the analyzer and the shared history cache.
///
/// Constructed once at process start; cloning yields another handle to the
/// same cache, which is what request handlers should receive.
#[derive(Clone)]
pub struct AnalysisService {
    analyzer: Arc<TextAnalyzer>,
    cache: Arc<RwLock<AnalysisCache>>,
}

impl Default for AnalysisService {
    fn default() -> Self {
        Self::new(TextAnalyzer::default())
    }
}

impl AnalysisService {
    pub fn new(analyzer: TextAnalyzer) -> Self {
        Self::with_cache(analyzer, AnalysisCache::new())
    }

    pub fn with_cache(analyzer: TextAnalyzer, cache: AnalysisCache) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            cache: Arc::new(RwLock::new(cache)),
        }
    }

    /// Analyze `text`, stamp the result and record it in the history.
    ///
    /// The sentiment call completes before the cache lock is taken, so the
    /// lock is never held across an await point.
    pub async fn analyze(
        &self,
        text: &str,
        include_sentiment: bool,
    ) -> Result<AnalysisResult, AnalyzeError> {
        tracing::debug!(text_length = text.len(), include_sentiment, "analyzing text");
        let analysis = self.analyzer.analyze(text, include_sentiment).await?;
        let result = AnalysisResult {
            text: text.to_string(),
            analysis,
            timestamp: Utc::now(),
        };
        self.cache
            .write()
            .expect("cache lock poisoned")
            .add(result.clone());
        Ok(result)
    }

    pub fn history(&self, limit: usize) -> Vec<AnalysisResult> {
        self.cache.read().expect("cache lock poisoned").history(limit)
    }

    pub fn search(&self, term: &str, limit: usize) -> Vec<AnalysisResult> {
        self.cache
            .read()
            .expect("cache lock poisoned")
            .search(term, limit)
    }

    pub fn total_count(&self) -> usize {
        self.cache.read().expect("cache lock poisoned").total_count()
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.read().expect("cache lock poisoned").stats()
    }

    pub fn clear(&self) {
        self.cache.write().expect("cache lock poisoned").clear();
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
