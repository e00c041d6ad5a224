//! Text Analysis
//!
//! Descriptive statistics over arbitrary input text: character, word,
//! sentence and paragraph counts, frequency rankings with and without stop
//! words, and an optional sentiment label from [`textlens_sentiment`].

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

mod stop_words;

pub use stop_words::{StopWords, DEFAULT_ENGLISH_STOP_WORDS};
pub use textlens_sentiment::{
    ClassifierConfig, Sentiment, SentimentAnalysis, SentimentClassifier,
};

#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("text must be a non-empty string")]
    EmptyText,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

impl WordCount {
    pub fn new(word: impl Into<String>, count: usize) -> Self {
        Self {
            word: word.into(),
            count,
        }
    }
}

/// Statistics record for one analyzed text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TextAnalysis {
    pub character_count: usize,
    pub character_count_no_spaces: usize,
    pub word_count: usize,
    pub sentence_count: usize,
    pub paragraph_count: usize,
    /// Rounded to 2 decimals; 0 when the text has no sentences.
    pub average_words_per_sentence: f64,
    /// Up to 10 entries, stop words included.
    pub most_common_words: Vec<WordCount>,
    /// Up to 5 entries, stop words and short tokens excluded.
    pub top_words: Vec<WordCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<SentimentAnalysis>,
}

const MOST_COMMON_WORDS_LIMIT: usize = 10;
const TOP_WORDS_LIMIT: usize = 5;

/// Stateless, reentrant text analyzer.
pub struct TextAnalyzer {
    stop_words: StopWords,
    classifier: SentimentClassifier,
}

impl Default for TextAnalyzer {
    fn default() -> Self {
        Self::new(SentimentClassifier::default())
    }
}

impl TextAnalyzer {
    pub fn new(classifier: SentimentClassifier) -> Self {
        Self::with_stop_words(classifier, StopWords::english())
    }

    pub fn with_stop_words(classifier: SentimentClassifier, stop_words: StopWords) -> Self {
        Self {
            stop_words,
            classifier,
        }
    }

    /// Analyze `text`, optionally including a sentiment label.
    ///
    /// Only empty text is rejected; whitespace-only input is a valid text
    /// with `word_count == 0`. The sentiment step degrades inside the
    /// classifier and can never fail the analysis.
    pub async fn analyze(
        &self,
        text: &str,
        include_sentiment: bool,
    ) -> Result<TextAnalysis, AnalyzeError> {
        if text.is_empty() {
            return Err(AnalyzeError::EmptyText);
        }

        let character_count = text.chars().count();
        let character_count_no_spaces = text.chars().filter(|c| !c.is_whitespace()).count();

        let tokens = tokenize(text);
        let word_count = tokens.len();

        let sentence_count = count_sentences(text);
        let paragraph_count = count_paragraphs(text);

        let average_words_per_sentence = if sentence_count > 0 {
            round2(word_count as f64 / sentence_count as f64)
        } else {
            0.0
        };

        let most_common_words = rank_by_frequency(
            tokens.iter().map(String::as_str),
            MOST_COMMON_WORDS_LIMIT,
        );
        let top_words = self.stop_words.top_words(&tokens, TOP_WORDS_LIMIT);

        let sentiment = if include_sentiment {
            Some(self.classifier.classify(text).await)
        } else {
            None
        };

        Ok(TextAnalysis {
            character_count,
            character_count_no_spaces,
            word_count,
            sentence_count,
            paragraph_count,
            average_words_per_sentence,
            most_common_words,
            top_words,
            sentiment,
        })
    }
}

/// Lowercase `text`, strip characters that are neither alphanumeric nor
/// whitespace, and split on whitespace runs.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|word| word.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|word| !word.is_empty())
        .collect()
}

/// Heuristic sentence count: fragments between runs of `.`, `!` and `?`.
/// Abbreviations and decimals are not special-cased.
fn count_sentences(text: &str) -> usize {
    text.split(|c: char| matches!(c, '.' | '!' | '?'))
        .filter(|fragment| !fragment.trim().is_empty())
        .count()
}

/// Blank-line separated paragraph count, floored at 1.
fn count_paragraphs(text: &str) -> usize {
    let mut paragraphs = 0usize;
    let mut in_paragraph = false;
    for line in text.lines() {
        if line.trim().is_empty() {
            in_paragraph = false;
        } else if !in_paragraph {
            paragraphs += 1;
            in_paragraph = true;
        }
    }
    paragraphs.max(1)
}

/// Count token frequencies and rank by descending count, truncated to
/// `limit`. Equal counts keep first-seen order: the sort is stable and runs
/// over the tokens' insertion order, not hash-map iteration order.
pub(crate) fn rank_by_frequency<'a, I>(tokens: I, limit: usize) -> Vec<WordCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut first_seen: Vec<&str> = Vec::new();
    let mut frequencies: HashMap<&str, usize> = HashMap::new();
    for token in tokens {
        match frequencies.entry(token) {
            Entry::Occupied(mut occupied) => *occupied.get_mut() += 1,
            Entry::Vacant(vacant) => {
                vacant.insert(1);
                first_seen.push(token);
            }
        }
    }

    let mut ranked: Vec<WordCount> = first_seen
        .into_iter()
        .map(|word| WordCount::new(word, frequencies[word]))
        .collect();
    ranked.par_sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(limit);
    ranked
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> TextAnalyzer {
        TextAnalyzer::default()
    }

    #[tokio::test]
    async fn analyzes_simple_text() {
        let analysis = analyzer()
            .analyze("Hello world. This is a test.", false)
            .await
            .unwrap();

        assert_eq!(analysis.character_count, 28);
        assert_eq!(analysis.character_count_no_spaces, 23);
        assert_eq!(analysis.word_count, 6);
        assert_eq!(analysis.sentence_count, 2);
        assert_eq!(analysis.paragraph_count, 1);
        assert!((analysis.average_words_per_sentence - 3.0).abs() < 1e-9);
        assert!(!analysis.most_common_words.is_empty());
        assert!(!analysis.top_words.is_empty());
    }

    #[tokio::test]
    async fn rejects_empty_text() {
        let err = analyzer().analyze("", false).await.unwrap_err();
        assert!(matches!(err, AnalyzeError::EmptyText));
    }

    #[tokio::test]
    async fn accepts_whitespace_only_text() {
        let analysis = analyzer().analyze("   \n\t  ", false).await.unwrap();
        assert_eq!(analysis.word_count, 0);
        assert_eq!(analysis.sentence_count, 0);
        assert_eq!(analysis.paragraph_count, 1);
        assert!((analysis.average_words_per_sentence - 0.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn counts_paragraphs() {
        let text = "First paragraph.\n\nSecond paragraph.\n\nThird paragraph.";
        let analysis = analyzer().analyze(text, false).await.unwrap();
        assert_eq!(analysis.paragraph_count, 3);
    }

    #[tokio::test]
    async fn paragraph_count_is_floored_at_one() {
        let analysis = analyzer().analyze("single line", false).await.unwrap();
        assert_eq!(analysis.paragraph_count, 1);
    }

    #[tokio::test]
    async fn handles_punctuation_only_text() {
        let analysis = analyzer().analyze("!@#$%^&*()", false).await.unwrap();

        assert_eq!(analysis.character_count, 10);
        assert_eq!(analysis.word_count, 0);
        assert!(analysis.most_common_words.is_empty());
        assert!(analysis.top_words.is_empty());
    }

    #[tokio::test]
    async fn filters_stop_words_from_top_words() {
        let text = "The big dog and the cat. The dog is very big and beautiful.";
        let analysis = analyzer().analyze(text, false).await.unwrap();

        assert!(analysis.top_words.iter().all(|wc| wc.word != "the"));
        assert!(analysis.top_words.iter().all(|wc| wc.word != "and"));
        assert!(analysis.top_words.iter().any(|wc| wc.word == "big"));
        assert!(analysis.top_words.iter().any(|wc| wc.word == "dog"));

        // stop words still count toward the unfiltered ranking
        assert_eq!(analysis.most_common_words[0], WordCount::new("the", 4));
    }

    #[tokio::test]
    async fn most_common_words_keep_first_seen_order_on_ties() {
        let analysis = analyzer()
            .analyze("beta beta alpha alpha cat", false)
            .await
            .unwrap();

        assert_eq!(
            analysis.most_common_words,
            vec![
                WordCount::new("beta", 2),
                WordCount::new("alpha", 2),
                WordCount::new("cat", 1),
            ]
        );
    }

    #[tokio::test]
    async fn most_common_words_truncate_to_ten() {
        let text = "one two three four five six seven eight nine ten eleven twelve";
        let analysis = analyzer().analyze(text, false).await.unwrap();
        assert_eq!(analysis.most_common_words.len(), 10);
        assert_eq!(analysis.word_count, 12);
    }

    #[tokio::test]
    async fn character_counts_hold_for_unicode() {
        let text = "café au lait\nçà et là";
        let analysis = analyzer().analyze(text, false).await.unwrap();
        assert!(analysis.character_count_no_spaces <= analysis.character_count);
        assert_eq!(analysis.character_count, text.chars().count());
    }

    #[tokio::test]
    async fn skips_sentiment_when_not_requested() {
        let analysis = analyzer().analyze("This is a test.", false).await.unwrap();
        assert!(analysis.sentiment.is_none());
    }

    #[tokio::test]
    async fn includes_sentiment_when_requested() {
        // Unroutable endpoint: the classifier degrades to its keyword
        // fallback, so the field is still populated.
        let classifier = SentimentClassifier::new(ClassifierConfig {
            endpoint: "http://127.0.0.1:9/models/sst-2".to_string(),
            timeout: std::time::Duration::from_millis(200),
            ..ClassifierConfig::default()
        });
        let analyzer = TextAnalyzer::new(classifier);

        let analysis = analyzer
            .analyze("This is a wonderful and amazing day!", true)
            .await
            .unwrap();

        let sentiment = analysis.sentiment.expect("sentiment requested");
        assert_eq!(sentiment.sentiment, Sentiment::Positive);
        assert!(sentiment.score >= 0.0 && sentiment.score <= 1.0);
        assert!(!sentiment.summary.is_empty());
    }

    #[test]
    fn tokenize_strips_punctuation() {
        assert_eq!(
            tokenize("Hello, world! It's me."),
            vec!["hello", "world", "its", "me"]
        );
    }

    #[test]
    fn sentence_split_treats_punctuation_runs_as_one_boundary() {
        assert_eq!(count_sentences("Really?! Yes... really."), 3);
        assert_eq!(count_sentences("One!!! Two???"), 2);
    }
}
