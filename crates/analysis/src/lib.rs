//! Keyword-driven text analysis for MindVerse.
//!
//! A user's free-text problem description goes through one pipeline:
//!
//! ```text
//! raw text
//!     │
//!     ├──> preprocess (lowercase, punctuation -> spaces)
//!     │
//!     ├──> sentiment      (AFINN-style lexicon, negation)
//!     ├──> emotions       (10 labels, top 5)
//!     ├──> categories     (8 labels, top 3)
//!     ├──> themes         (8 labels, top 5)
//!     └──> keywords       (content words by frequency, top 10)
//! ```
//!
//! Everything is deterministic: the same input always yields the same
//! [`TextAnalysis`].

mod lexicon;
mod matching;
mod sentiment;
mod text;

pub use lexicon::{Lexicon, LexiconEntry, EMOTIONS, PROBLEM_CATEGORIES, THEMES};
pub use matching::{
    categorize_problems, detect_emotions, extract_themes, match_lexicon, CategoryMatch,
    EmotionMatch, LabelHit, ThemeMatch, CATEGORY_LIMIT, EMOTION_LIMIT, THEME_LIMIT,
};
pub use sentiment::{analyze_sentiment, EmotionalWords, Polarity, SentimentAnalysis, WordScore};
pub use text::{extract_keywords, is_stop_word, preprocess, tokenize, Keyword};

use serde::{Deserialize, Serialize};

pub const MAX_CONFIDENCE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAnalysis {
    pub sentiment: SentimentAnalysis,
    pub emotions: Vec<EmotionMatch>,
    pub problem_categories: Vec<CategoryMatch>,
    pub themes: Vec<ThemeMatch>,
    pub keywords: Vec<Keyword>,
}

impl TextAnalysis {
    pub fn primary_emotion(&self) -> Option<&str> {
        self.emotions.first().map(|e| e.emotion.as_str())
    }

    pub fn primary_category(&self) -> Option<&str> {
        self.problem_categories.first().map(|c| c.category.as_str())
    }

    pub fn primary_theme(&self) -> Option<&str> {
        self.themes.first().map(|t| t.theme.as_str())
    }
}

/// Holds the compiled lexicons; build once and share.
pub struct Analyzer {
    emotions: Lexicon,
    categories: Lexicon,
    themes: Lexicon,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            emotions: Lexicon::emotions(),
            categories: Lexicon::problem_categories(),
            themes: Lexicon::themes(),
        }
    }

    pub fn analyze(&self, text: &str) -> TextAnalysis {
        let clean = preprocess(text);
        let token_count = tokenize(&clean).len();
        log::debug!(
            "Analyzing {} chars ({} tokens)",
            text.chars().count(),
            token_count
        );

        let analysis = TextAnalysis {
            sentiment: analyze_sentiment(&clean),
            emotions: detect_emotions(&self.emotions, &clean, token_count),
            problem_categories: categorize_problems(&self.categories, &clean),
            themes: extract_themes(&self.themes, &clean),
            keywords: extract_keywords(&clean),
        };

        log::debug!(
            "Analysis: polarity={} emotions={} categories={} themes={}",
            analysis.sentiment.polarity.as_str(),
            analysis.emotions.len(),
            analysis.problem_categories.len(),
            analysis.themes.len()
        );
        analysis
    }
}

/// Overall confidence on a 0..=10 scale, one decimal.
///
/// Sentiment strength contributes up to 3, the top emotion up to 3 and the
/// top theme up to 2.
#[must_use]
pub fn calculate_confidence_score(
    sentiment: &SentimentAnalysis,
    emotions: &[EmotionMatch],
    themes: &[ThemeMatch],
) -> f64 {
    let mut score = (sentiment.comparative.abs() * 10.0).min(3.0);
    if let Some(top) = emotions.first() {
        score += top.confidence * 3.0;
    }
    if let Some(top) = themes.first() {
        score += top.relevance * 2.0;
    }
    round_to(score, 1).min(MAX_CONFIDENCE)
}

#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn analyze_full_pipeline() {
        let analyzer = Analyzer::new();
        let analysis =
            analyzer.analyze("I feel so anxious about my job. My boss is furious and I can't find peace.");

        assert_eq!(analysis.sentiment.polarity, Polarity::Negative);
        assert_eq!(analysis.primary_emotion(), Some("anxious"));
        assert_eq!(analysis.primary_category(), Some("work_stress"));
        assert_eq!(analysis.primary_theme(), Some("peace"));
        assert!(analysis.keywords.iter().any(|k| k.word == "anxious"));
    }

    #[test]
    fn confidence_combines_three_signals() {
        let analyzer = Analyzer::new();
        let analysis = analyzer.analyze("sad sad sad peace");
        // comparative = (-6 + 2) / 4 = -1.0 -> capped at 3
        // sad confidence = min(3/4*10, 1) = 1 -> 3
        // peace relevance = 1/6 -> 0.333
        let score = calculate_confidence_score(
            &analysis.sentiment,
            &analysis.emotions,
            &analysis.themes,
        );
        assert_eq!(score, 6.3);
    }

    #[test]
    fn empty_input_has_zero_confidence() {
        let analysis = Analyzer::new().analyze("   !!! ");
        assert!(analysis.emotions.is_empty());
        assert_eq!(
            calculate_confidence_score(&analysis.sentiment, &analysis.emotions, &analysis.themes),
            0.0
        );
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let analysis = Analyzer::new().analyze("I am lonely and lost");
        let json = serde_json::to_value(&analysis).unwrap();
        assert!(json.get("problemCategories").is_some());
        assert!(json["emotions"][0].get("matchedWords").is_some());
        assert_eq!(json["sentiment"]["polarity"], "negative");
    }

    #[test]
    fn round_to_matches_expected_precision() {
        assert_eq!(round_to(1.23456, 2), 1.23);
        assert_eq!(round_to(2.25, 1), 2.3);
    }
}
