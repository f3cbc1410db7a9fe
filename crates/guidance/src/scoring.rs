use mindverse_analysis::{round_to, TextAnalysis};
use mindverse_store::{Store, WisdomQuery, WisdomSort, WisdomSource, WisdomText};
use serde::Serialize;

pub const RELEVANT_LIMIT: usize = 5;
pub const FALLBACK_LIMIT: usize = 3;
const CATEGORY_WEIGHT: f64 = 5.0;
const THEME_WEIGHT: f64 = 3.0;

/// A retrieved text with its relevance to one analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredWisdom {
    #[serde(flatten)]
    pub text: WisdomText,
    pub full_reference: String,
    pub contextual_attribution: String,
    pub relevance_score: f64,
}

impl ScoredWisdom {
    pub fn new(text: WisdomText, relevance_score: f64) -> Self {
        Self {
            full_reference: text.full_reference(),
            contextual_attribution: text.contextual_attribution(),
            text,
            relevance_score,
        }
    }
}

/// Σ emotion relevance × confidence + 5 × category confidence + 3 × theme
/// relevance, over the labels the text carries. Two decimals.
#[must_use]
pub fn score_relevance(text: &WisdomText, analysis: &TextAnalysis) -> f64 {
    let mut score = 0.0;
    for emotion in &analysis.emotions {
        if let Some(relevance) = text.emotion_relevance(&emotion.emotion) {
            score += f64::from(relevance) * emotion.confidence;
        }
    }
    for category in &analysis.problem_categories {
        if text.problem_categories.contains(&category.category) {
            score += CATEGORY_WEIGHT * category.confidence;
        }
    }
    for theme in &analysis.themes {
        if text.primary_themes.contains(&theme.theme) {
            score += THEME_WEIGHT * theme.relevance;
        }
    }
    round_to(score, 2)
}

pub fn relevance_query(analysis: &TextAnalysis, selected_books: &[WisdomSource]) -> WisdomQuery {
    WisdomQuery::new()
        .sources(selected_books.iter().copied())
        .emotions(analysis.emotions.iter().map(|e| e.emotion.clone()))
        .categories(analysis.problem_categories.iter().map(|c| c.category.clone()))
        .themes(analysis.themes.iter().map(|t| t.theme.clone()))
        .keywords(analysis.keywords.iter().map(|k| k.word.clone()))
        .sort(WisdomSort::RatingThenRetrievals)
        .limit(RELEVANT_LIMIT)
}

/// Texts matching any analysis label, best rated first; when nothing matches,
/// the top rated texts from the selected books. Re-ranked by relevance.
pub async fn find_relevant_wisdom(
    store: &Store,
    analysis: &TextAnalysis,
    selected_books: &[WisdomSource],
) -> Vec<ScoredWisdom> {
    let mut found = store
        .find_wisdom(&relevance_query(analysis, selected_books))
        .await;

    if found.is_empty() {
        log::debug!("No label matches; falling back to top rated texts");
        let fallback = WisdomQuery::new()
            .sources(selected_books.iter().copied())
            .sort(WisdomSort::Rating)
            .limit(FALLBACK_LIMIT);
        found = store.find_wisdom(&fallback).await;
    }

    let mut scored: Vec<ScoredWisdom> = found
        .into_iter()
        .map(|text| {
            let score = score_relevance(&text, analysis);
            ScoredWisdom::new(text, score)
        })
        .collect();
    scored.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored
}
