//! AFINN-style lexical sentiment.
//!
//! Every token found in [`WORD_SCORES`] contributes its integer weight; a
//! negator directly in front of a scored token flips that token's sign.

use crate::text::tokenize;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Positive,
    Negative,
    Neutral,
}

impl Polarity {
    #[must_use]
    pub const fn from_score(score: i32) -> Self {
        if score > 0 {
            Self::Positive
        } else if score < 0 {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordScore {
    pub word: String,
    pub score: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionalWords {
    pub adjectives: Vec<String>,
    pub adverbs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentAnalysis {
    pub score: i32,
    pub comparative: f64,
    pub calculation: Vec<WordScore>,
    pub tokens: Vec<String>,
    pub words: Vec<String>,
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    pub polarity: Polarity,
    pub intensity: f64,
    pub emotional_words: EmotionalWords,
}

impl SentimentAnalysis {
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            score: 0,
            comparative: 0.0,
            calculation: Vec::new(),
            tokens: Vec::new(),
            words: Vec::new(),
            positive: Vec::new(),
            negative: Vec::new(),
            polarity: Polarity::Neutral,
            intensity: 0.0,
            emotional_words: EmotionalWords::default(),
        }
    }
}

// "don't" arrives here as "don t", so the bare "t" counts as a negator.
const NEGATORS: &[&str] = &[
    "not", "no", "never", "nothing", "nobody", "neither", "nor", "cannot", "cant", "dont",
    "doesnt", "didnt", "isnt", "wasnt", "arent", "werent", "wont", "without", "t",
];

const ADJECTIVE_SUFFIXES: &[&str] = &["ful", "less", "ous", "ive", "able", "ible", "ish"];

const LY_ADJECTIVES: &[&str] = &[
    "holy", "ugly", "lonely", "lovely", "friendly", "silly", "likely", "unlikely", "lively",
    "elderly", "costly", "deadly",
];

const LY_OTHER: &[&str] = &[
    "family", "reply", "supply", "apply", "rely", "ally", "belly", "bully", "early", "july",
    "italy", "only",
];

const EXTRA_ADJECTIVES: &[&str] = &[
    "sad", "angry", "mad", "lonely", "anxious", "nervous", "tense", "scared", "afraid", "tired",
    "guilty", "happy", "good", "bad", "lost", "alone", "broke", "sick", "calm", "confident",
    "insecure", "ugly", "lovely", "friendly", "bitter", "weak", "strong", "empty", "worthless",
    "stressed", "depressed", "worried", "confused", "exhausted", "overwhelmed", "frustrated",
    "hurt", "upset", "unhappy", "glad", "grateful", "proud",
];

pub static WORD_SCORES: Lazy<HashMap<&'static str, i32>> = Lazy::new(|| {
    [
        ("abandon", -2),
        ("abandoned", -2),
        ("abuse", -3),
        ("accept", 1),
        ("accepted", 1),
        ("ache", -2),
        ("afraid", -2),
        ("agony", -3),
        ("alarmed", -2),
        ("alone", -2),
        ("anger", -3),
        ("angry", -3),
        ("annoyed", -2),
        ("anxiety", -2),
        ("anxious", -2),
        ("apologize", -1),
        ("ashamed", -2),
        ("awful", -3),
        ("bad", -3),
        ("beautiful", 3),
        ("best", 3),
        ("betrayed", -3),
        ("better", 2),
        ("bitter", -2),
        ("blame", -2),
        ("bless", 2),
        ("blessed", 3),
        ("bored", -2),
        ("brave", 2),
        ("broke", -1),
        ("broken", -1),
        ("burden", -2),
        ("calm", 2),
        ("care", 2),
        ("cheerful", 2),
        ("comfort", 2),
        ("compassion", 2),
        ("confident", 2),
        ("confused", -2),
        ("courage", 2),
        ("crisis", -3),
        ("cry", -1),
        ("crying", -2),
        ("dead", -3),
        ("death", -2),
        ("debt", -2),
        ("defeated", -2),
        ("dejected", -2),
        ("depressed", -2),
        ("depression", -2),
        ("despair", -3),
        ("desperate", -3),
        ("despondent", -3),
        ("destroyed", -3),
        ("difficult", -1),
        ("disappointed", -2),
        ("disaster", -2),
        ("doubt", -1),
        ("doubtful", -1),
        ("dread", -2),
        ("empty", -1),
        ("encourage", 2),
        ("enjoy", 2),
        ("exhausted", -2),
        ("fail", -2),
        ("failed", -2),
        ("failure", -2),
        ("faith", 1),
        ("fault", -2),
        ("fear", -2),
        ("fearful", -2),
        ("fearless", 2),
        ("fine", 2),
        ("forgive", 1),
        ("frightened", -2),
        ("frustrated", -2),
        ("furious", -3),
        ("glad", 3),
        ("gloomy", -2),
        ("good", 3),
        ("grateful", 3),
        ("grief", -2),
        ("guilty", -3),
        ("happy", 3),
        ("hate", -3),
        ("heartbroken", -3),
        ("help", 2),
        ("helpless", -2),
        ("hope", 2),
        ("hopeful", 2),
        ("hopeless", -2),
        ("hostile", -2),
        ("hurt", -2),
        ("ignored", -2),
        ("inadequate", -2),
        ("insecure", -2),
        ("irritated", -3),
        ("isolated", -1),
        ("joy", 3),
        ("kind", 2),
        ("kindness", 2),
        ("lonely", -2),
        ("lose", -3),
        ("losing", -3),
        ("loss", -3),
        ("lost", -3),
        ("love", 3),
        ("loved", 3),
        ("lucky", 3),
        ("mad", -3),
        ("miserable", -3),
        ("miss", -2),
        ("nervous", -2),
        ("overwhelmed", -2),
        ("pain", -2),
        ("panic", -3),
        ("peace", 2),
        ("peaceful", 2),
        ("poor", -2),
        ("powerless", -2),
        ("pressure", -1),
        ("problem", -2),
        ("problems", -2),
        ("proud", 2),
        ("rage", -2),
        ("regret", -2),
        ("rejected", -1),
        ("relief", 1),
        ("resentful", -2),
        ("restless", -2),
        ("sad", -2),
        ("safe", 1),
        ("scared", -2),
        ("sick", -2),
        ("sorrow", -2),
        ("sorry", -1),
        ("strength", 2),
        ("stress", -1),
        ("stressed", -2),
        ("strong", 2),
        ("struggle", -2),
        ("struggling", -2),
        ("stuck", -2),
        ("suffer", -2),
        ("suffering", -2),
        ("support", 2),
        ("tense", -2),
        ("terrible", -3),
        ("terrified", -3),
        ("thank", 2),
        ("tired", -2),
        ("trust", 1),
        ("ugly", -3),
        ("unhappy", -2),
        ("unworthy", -2),
        ("upset", -2),
        ("useless", -2),
        ("weak", -2),
        ("wonderful", 4),
        ("worried", -3),
        ("worry", -3),
        ("worse", -3),
        ("worst", -3),
        ("worthless", -2),
        ("wrong", -2),
    ]
    .into_iter()
    .collect()
});

#[must_use]
pub fn is_adverb(word: &str) -> bool {
    word.chars().count() > 3
        && word.ends_with("ly")
        && !LY_ADJECTIVES.contains(&word)
        && !LY_OTHER.contains(&word)
}

#[must_use]
pub fn is_adjective(word: &str) -> bool {
    if EXTRA_ADJECTIVES.contains(&word) || LY_ADJECTIVES.contains(&word) {
        return true;
    }
    ADJECTIVE_SUFFIXES
        .iter()
        .any(|suffix| word.len() > suffix.len() + 2 && word.ends_with(suffix))
}

/// Score already-preprocessed text.
#[must_use]
pub fn analyze_sentiment(clean_text: &str) -> SentimentAnalysis {
    let tokens = tokenize(clean_text);
    if tokens.is_empty() {
        return SentimentAnalysis::neutral();
    }

    let mut score = 0i32;
    let mut calculation = Vec::new();
    let mut words = Vec::new();
    let mut positive = Vec::new();
    let mut negative = Vec::new();

    for (idx, token) in tokens.iter().enumerate() {
        let Some(&base) = WORD_SCORES.get(*token) else {
            continue;
        };
        let negated = idx > 0 && NEGATORS.contains(&tokens[idx - 1]);
        let value = if negated { -base } else { base };

        score += value;
        words.push((*token).to_string());
        if value > 0 {
            positive.push((*token).to_string());
        } else if value < 0 {
            negative.push((*token).to_string());
        }
        calculation.push(WordScore {
            word: (*token).to_string(),
            score: value,
        });
    }

    let comparative = f64::from(score) / tokens.len() as f64;
    let mut emotional_words = EmotionalWords::default();
    for token in &tokens {
        let owned = (*token).to_string();
        if is_adverb(token) {
            if !emotional_words.adverbs.contains(&owned) {
                emotional_words.adverbs.push(owned);
            }
        } else if is_adjective(token) && !emotional_words.adjectives.contains(&owned) {
            emotional_words.adjectives.push(owned);
        }
    }

    SentimentAnalysis {
        score,
        comparative,
        calculation,
        tokens: tokens.iter().map(|t| (*t).to_string()).collect(),
        words,
        positive,
        negative,
        polarity: Polarity::from_score(score),
        intensity: comparative.abs(),
        emotional_words,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::preprocess;
    use pretty_assertions::assert_eq;

    #[test]
    fn negative_text_scores_negative() {
        let s = analyze_sentiment(&preprocess("I am sad and lonely, everything feels hopeless."));
        assert_eq!(s.score, -6);
        assert_eq!(s.polarity, Polarity::Negative);
        assert_eq!(s.negative, vec!["sad", "lonely", "hopeless"]);
        assert!((s.comparative - (-6.0 / 8.0)).abs() < 1e-9);
        assert!((s.intensity - 0.75).abs() < 1e-9);
    }

    #[test]
    fn negator_flips_following_word() {
        let s = analyze_sentiment(&preprocess("This is not good"));
        assert_eq!(s.score, -3);
        assert_eq!(s.calculation[0], WordScore { word: "good".into(), score: -3 });
    }

    #[test]
    fn empty_text_is_neutral() {
        let s = analyze_sentiment("");
        assert_eq!(s.polarity, Polarity::Neutral);
        assert_eq!(s.comparative, 0.0);
        assert!(s.tokens.is_empty());
    }

    #[test]
    fn emotional_words_split_adjectives_and_adverbs() {
        let s = analyze_sentiment(&preprocess("I am deeply hopeless and truly lonely"));
        assert_eq!(s.emotional_words.adverbs, vec!["deeply", "truly"]);
        assert!(s.emotional_words.adjectives.contains(&"hopeless".to_string()));
        assert!(s.emotional_words.adjectives.contains(&"lonely".to_string()));
    }
}
