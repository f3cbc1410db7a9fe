use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use unicode_segmentation::UnicodeSegmentation;

use crate::sentiment::is_adverb;

const KEYWORD_LIMIT: usize = 10;
const KEYWORD_MIN_LEN: usize = 4;

const STOP_WORDS: &[&str] = &[
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    // pronouns / determiners
    "i", "me", "my", "mine", "myself", "you", "your", "yours", "he", "him", "his", "she", "her",
    "hers", "it", "its", "we", "us", "our", "they", "them", "their", "this", "that", "these",
    "those", "what", "which", "who", "whom", "whose", "some", "such", "each", "every", "other",
    // auxiliaries
    "am", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "having", "do",
    "does", "did", "doing", "will", "would", "shall", "should", "can", "could", "may", "might",
    "must",
    // connectives and fillers
    "about", "above", "after", "again", "against", "because", "before", "below", "between",
    "from", "into", "over", "under", "until", "while", "than", "then", "there", "here", "when",
    "where", "why", "how", "very", "just", "also", "even", "much", "more", "most", "only", "really",
    "still", "anymore", "always", "never", "something", "anything", "nothing", "everything",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub word: String,
    pub frequency: usize,
}

/// Lowercase, strip punctuation to spaces, collapse whitespace.
#[must_use]
pub fn preprocess(text: &str) -> String {
    let replaced: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[must_use]
pub fn tokenize(text: &str) -> Vec<&str> {
    text.unicode_words().collect()
}

#[must_use]
pub fn is_stop_word(word: &str) -> bool {
    let lowered = word.to_lowercase();
    STOP_WORDS.contains(&lowered.as_str())
}

/// Most frequent content words, ties broken by first appearance.
#[must_use]
pub fn extract_keywords(clean_text: &str) -> Vec<Keyword> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, token) in tokenize(clean_text).into_iter().enumerate() {
        if token.chars().count() < KEYWORD_MIN_LEN || is_stop_word(token) || is_adverb(token) {
            continue;
        }
        if token.chars().all(|c| c.is_numeric()) {
            continue;
        }
        counts
            .entry(token)
            .and_modify(|(freq, _)| *freq += 1)
            .or_insert((1, position));
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(word, (freq, first))| (word, freq, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(KEYWORD_LIMIT)
        .map(|(word, frequency, _)| Keyword {
            word: word.to_string(),
            frequency,
        })
        .collect()
}
