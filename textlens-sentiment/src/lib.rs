//! Sentiment Classification
//!
//! Binary sentiment classification backed by a remote inference endpoint,
//! with a local keyword heuristic used whenever the backend is unavailable.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Keyword table for the local fallback heuristic.
static POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "amazing", "wonderful", "fantastic",
    "love", "like", "happy", "joy", "positive", "best", "awesome", "perfect",
];

/// Keyword table for the local fallback heuristic.
static NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "awful", "horrible", "hate", "dislike", "sad",
    "angry", "negative", "worst", "disappointing", "poor", "frustrating",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn label(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SentimentAnalysis {
    pub sentiment: Sentiment,
    /// Classifier confidence in [0, 1], rounded to 2 decimals.
    pub score: f64,
    pub summary: String,
}

#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub endpoint: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
    /// Inference backends cap input size; longer text is truncated.
    pub max_input_chars: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint:
                "https://api-inference.huggingface.co/models/distilbert-base-uncased-finetuned-sst-2-english"
                    .to_string(),
            api_token: None,
            timeout: Duration::from_secs(10),
            max_input_chars: 512,
        }
    }
}

impl ClassifierConfig {
    /// Read endpoint and bearer token overrides from the environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(endpoint) = std::env::var("TEXTLENS_SENTIMENT_ENDPOINT") {
            config.endpoint = endpoint;
        }
        config.api_token = std::env::var("TEXTLENS_SENTIMENT_TOKEN").ok();
        config
    }
}

#[derive(Debug, thiserror::Error)]
enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("backend returned no candidates")]
    EmptyResponse,

    #[error("backend returned unknown label {0:?}")]
    UnknownLabel(String),
}

#[derive(Debug, Deserialize)]
struct Candidate {
    label: String,
    score: f64,
}

/// The inference API returns either a flat candidate list or, on some
/// backend versions, a list wrapped in an outer array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CandidateBody {
    Flat(Vec<Candidate>),
    Nested(Vec<Vec<Candidate>>),
}

impl CandidateBody {
    fn into_candidates(self) -> Vec<Candidate> {
        match self {
            CandidateBody::Flat(candidates) => candidates,
            CandidateBody::Nested(mut groups) => {
                if groups.is_empty() {
                    Vec::new()
                } else {
                    groups.swap_remove(0)
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct SentimentClassifier {
    config: ClassifierConfig,
    client: reqwest::Client,
}

impl Default for SentimentClassifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

impl SentimentClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("reqwest client");
        Self { config, client }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify the sentiment of `text`.
    ///
    /// A single remote attempt, bounded by the configured timeout; any
    /// failure (transport, timeout, non-2xx status, malformed body) degrades
    /// to the keyword heuristic. This never errors and never blocks beyond
    /// the timeout.
    pub async fn classify(&self, text: &str) -> SentimentAnalysis {
        match self.classify_remote(text).await {
            Ok(analysis) => analysis,
            Err(err) => {
                tracing::warn!(error = %err, "sentiment backend unavailable, using keyword fallback");
                keyword_sentiment(text)
            }
        }
    }

    async fn classify_remote(&self, text: &str) -> Result<SentimentAnalysis, RemoteError> {
        let input: String = text.chars().take(self.config.max_input_chars).collect();

        let mut request = self
            .client
            .post(&self.config.endpoint)
            .json(&json!({ "inputs": input }));
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(RemoteError::Status(response.status()));
        }

        let candidates = response.json::<CandidateBody>().await?.into_candidates();
        let best = candidates
            .into_iter()
            .max_by(|a, b| {
                a.score
                    .partial_cmp(&b.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .ok_or(RemoteError::EmptyResponse)?;

        let sentiment = match best.label.to_lowercase().as_str() {
            "positive" | "label_1" => Sentiment::Positive,
            "negative" | "label_0" => Sentiment::Negative,
            _ => return Err(RemoteError::UnknownLabel(best.label)),
        };
        let score = round2(best.score);

        Ok(SentimentAnalysis {
            sentiment,
            score,
            summary: confidence_summary(sentiment, score),
        })
    }
}

/// Pure keyword-scoring heuristic used when the remote backend fails.
fn keyword_sentiment(text: &str) -> SentimentAnalysis {
    let lowered = text.to_lowercase();
    let tokens = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty());

    let mut positive = 0usize;
    let mut negative = 0usize;
    for token in tokens {
        if POSITIVE_WORDS.contains(&token) {
            positive += 1;
        } else if NEGATIVE_WORDS.contains(&token) {
            negative += 1;
        }
    }

    let (sentiment, score) = if positive > negative {
        let score = (0.6 + 0.1 * (positive - negative) as f64).min(0.95);
        (Sentiment::Positive, score)
    } else if negative > positive {
        let score = (0.6 + 0.1 * (negative - positive) as f64).min(0.95);
        (Sentiment::Negative, score)
    } else {
        (Sentiment::Neutral, 0.5)
    };
    let score = round2(score);

    let summary = format!(
        "Keyword-based fallback analysis: {} ({}% confidence).",
        sentiment.label(),
        percent(score)
    );
    SentimentAnalysis {
        sentiment,
        score,
        summary,
    }
}

/// Confidence-banded summary: >= 80% clear, >= 60% leaning, below uncertain.
fn confidence_summary(sentiment: Sentiment, score: f64) -> String {
    let percent = percent(score);
    let label = sentiment.label();
    if percent >= 80 {
        format!("The text is clearly {label} ({percent}% confidence).")
    } else if percent >= 60 {
        format!("The text leans {label} ({percent}% confidence).")
    } else {
        format!("The sentiment is uncertain, but slightly {label} ({percent}% confidence).")
    }
}

fn percent(score: f64) -> i64 {
    (score * 100.0).round() as i64
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
