use crate::lexicon::Lexicon;
use serde::{Deserialize, Serialize};

pub const EMOTION_LIMIT: usize = 5;
pub const CATEGORY_LIMIT: usize = 3;
pub const THEME_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionMatch {
    pub emotion: String,
    pub score: usize,
    pub confidence: f64,
    pub matched_words: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryMatch {
    pub category: String,
    pub score: usize,
    pub confidence: f64,
    pub matched_words: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeMatch {
    pub theme: String,
    pub score: usize,
    pub relevance: f64,
    pub matched_words: Vec<String>,
}

/// Raw per-label hit before it is shaped into one of the public match types.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelHit {
    pub label: &'static str,
    pub score: usize,
    pub keyword_count: usize,
    pub matched_words: Vec<String>,
}

/// Count whole-word keyword hits per label, drop zero scores, sort by score
/// descending (stable, so lexicon order breaks ties) and keep `limit`.
#[must_use]
pub fn match_lexicon(lexicon: &Lexicon, clean_text: &str, limit: usize) -> Vec<LabelHit> {
    let mut hits: Vec<LabelHit> = lexicon
        .entries()
        .iter()
        .filter_map(|entry| {
            let mut score = 0;
            let mut matched_words: Vec<String> = Vec::new();
            for keyword in &entry.keywords {
                let found = keyword.matches_in(clean_text);
                score += found.len();
                for word in found {
                    if !matched_words.contains(&word) {
                        matched_words.push(word);
                    }
                }
            }
            (score > 0).then(|| LabelHit {
                label: entry.label,
                score,
                keyword_count: entry.keywords.len(),
                matched_words,
            })
        })
        .collect();

    hits.sort_by(|a, b| b.score.cmp(&a.score));
    hits.truncate(limit);
    hits
}

#[must_use]
pub fn detect_emotions(lexicon: &Lexicon, clean_text: &str, token_count: usize) -> Vec<EmotionMatch> {
    match_lexicon(lexicon, clean_text, EMOTION_LIMIT)
        .into_iter()
        .map(|hit| EmotionMatch {
            emotion: hit.label.to_string(),
            confidence: ratio(hit.score as f64 * 10.0, token_count),
            score: hit.score,
            matched_words: hit.matched_words,
        })
        .collect()
}

#[must_use]
pub fn categorize_problems(lexicon: &Lexicon, clean_text: &str) -> Vec<CategoryMatch> {
    match_lexicon(lexicon, clean_text, CATEGORY_LIMIT)
        .into_iter()
        .map(|hit| CategoryMatch {
            category: hit.label.to_string(),
            confidence: ratio(hit.score as f64, hit.keyword_count),
            score: hit.score,
            matched_words: hit.matched_words,
        })
        .collect()
}

#[must_use]
pub fn extract_themes(lexicon: &Lexicon, clean_text: &str) -> Vec<ThemeMatch> {
    match_lexicon(lexicon, clean_text, THEME_LIMIT)
        .into_iter()
        .map(|hit| ThemeMatch {
            theme: hit.label.to_string(),
            relevance: ratio(hit.score as f64, hit.keyword_count),
            score: hit.score,
            matched_words: hit.matched_words,
        })
        .collect()
}

/// `numerator / denominator` clamped to `[0, 1]`; a zero denominator yields 0.
fn ratio(numerator: f64, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    (numerator / denominator as f64).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{preprocess, tokenize};
    use pretty_assertions::assert_eq;

    #[test]
    fn emotions_are_sorted_and_deduplicated() {
        let lexicon = Lexicon::emotions();
        let text = preprocess("I'm worried, so worried and scared. Also a bit sad.");
        let tokens = tokenize(&text).len();
        let emotions = detect_emotions(&lexicon, &text, tokens);

        // anxious: worried x2 + scared; fearful: worried x2 + scared; sad: sad
        assert_eq!(emotions[0].emotion, "anxious");
        assert_eq!(emotions[0].score, 3);
        assert_eq!(emotions[0].matched_words, vec!["worried", "scared"]);
        assert_eq!(emotions[1].emotion, "fearful");
        assert_eq!(emotions[2].emotion, "sad");
        assert_eq!(emotions[0].confidence, 1.0);
    }

    #[test]
    fn emotion_confidence_scales_with_token_count() {
        let lexicon = Lexicon::emotions();
        let mut words = vec!["filler"; 39];
        words.push("sad");
        let text = words.join(" ");
        let emotions = detect_emotions(&lexicon, &text, 40);
        assert_eq!(emotions.len(), 1);
        assert!((emotions[0].confidence - 0.25).abs() < 1e-9);
    }

    #[test]
    fn categories_cap_at_three() {
        let lexicon = Lexicon::problem_categories();
        let text = preprocess(
            "My boss, my family, my debt, my exam and my health are all problems at work",
        );
        let categories = categorize_problems(&lexicon, &text);
        assert_eq!(categories.len(), CATEGORY_LIMIT);
        assert_eq!(categories[0].category, "work_stress");
        assert_eq!(categories[0].score, 2);
        assert!((categories[0].confidence - 2.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn multi_word_theme_keywords_match() {
        let lexicon = Lexicon::themes();
        let text = preprocess("I need to learn letting go and accept the past");
        let themes = extract_themes(&lexicon, &text);
        assert_eq!(themes[0].theme, "detachment");
        assert_eq!(themes[0].matched_words, vec!["letting go", "accept"]);
        assert!((themes[0].relevance - 0.4).abs() < 1e-9);
        assert_eq!(themes[1].theme, "wisdom");
    }

    #[test]
    fn nothing_matches_in_empty_text() {
        assert!(detect_emotions(&Lexicon::emotions(), "", 0).is_empty());
        assert!(categorize_problems(&Lexicon::problem_categories(), "").is_empty());
    }
}
