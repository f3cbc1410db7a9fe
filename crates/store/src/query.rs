use crate::wisdom::{WisdomSource, WisdomText};
use std::cmp::Ordering;

pub const DEFAULT_FIND_LIMIT: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WisdomSort {
    /// Average rating, then times retrieved, both descending.
    #[default]
    RatingThenRetrievals,
    Rating,
    /// Best relevance among the listed emotions, then average rating.
    EmotionRelevance(Vec<String>),
    /// Corpus order, untouched by usage counters.
    Insertion,
}

/// Active texts, optionally restricted to `sources`, matching ANY of the
/// criteria lists. With every criteria list empty, all active texts match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WisdomQuery {
    pub sources: Vec<WisdomSource>,
    pub emotions: Vec<String>,
    pub categories: Vec<String>,
    pub themes: Vec<String>,
    pub keywords: Vec<String>,
    pub sort: WisdomSort,
    pub limit: Option<usize>,
}

impl WisdomQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sources(mut self, sources: impl IntoIterator<Item = WisdomSource>) -> Self {
        self.sources = sources.into_iter().collect();
        self
    }

    pub fn emotions<S: Into<String>>(mut self, emotions: impl IntoIterator<Item = S>) -> Self {
        self.emotions = emotions.into_iter().map(Into::into).collect();
        self
    }

    pub fn categories<S: Into<String>>(mut self, categories: impl IntoIterator<Item = S>) -> Self {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn themes<S: Into<String>>(mut self, themes: impl IntoIterator<Item = S>) -> Self {
        self.themes = themes.into_iter().map(Into::into).collect();
        self
    }

    pub fn keywords<S: Into<String>>(mut self, keywords: impl IntoIterator<Item = S>) -> Self {
        self.keywords = keywords
            .into_iter()
            .map(|k| k.into().to_lowercase())
            .collect();
        self
    }

    pub fn sort(mut self, sort: WisdomSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn has_criteria(&self) -> bool {
        !(self.emotions.is_empty()
            && self.categories.is_empty()
            && self.themes.is_empty()
            && self.keywords.is_empty())
    }

    pub fn matches(&self, text: &WisdomText) -> bool {
        if !text.is_active {
            return false;
        }
        if !self.sources.is_empty() && !self.sources.contains(&text.source) {
            return false;
        }
        if !self.has_criteria() {
            return true;
        }
        self.emotions.iter().any(|e| text.has_emotion(e))
            || self
                .categories
                .iter()
                .any(|c| text.problem_categories.contains(c))
            || self.themes.iter().any(|t| text.primary_themes.contains(t))
            || text
                .keywords
                .iter()
                .any(|k| self.keywords.contains(&k.to_lowercase()))
    }

    /// Stable: texts that compare equal keep their insertion order.
    pub fn apply<'a>(&self, texts: impl Iterator<Item = &'a WisdomText>) -> Vec<WisdomText> {
        let mut found: Vec<WisdomText> = texts.filter(|t| self.matches(t)).cloned().collect();
        found.sort_by(|a, b| compare(&self.sort, a, b));
        if let Some(limit) = self.limit {
            found.truncate(limit);
        }
        found
    }
}

fn compare(sort: &WisdomSort, a: &WisdomText, b: &WisdomText) -> Ordering {
    let by_rating = || desc_f64(a.usage.average_rating, b.usage.average_rating);
    match sort {
        WisdomSort::RatingThenRetrievals => {
            by_rating().then(b.usage.times_retrieved.cmp(&a.usage.times_retrieved))
        }
        WisdomSort::Rating => by_rating(),
        WisdomSort::EmotionRelevance(emotions) => best_relevance(b, emotions)
            .cmp(&best_relevance(a, emotions))
            .then_with(by_rating),
        WisdomSort::Insertion => Ordering::Equal,
    }
}

fn best_relevance(text: &WisdomText, emotions: &[String]) -> u8 {
    emotions
        .iter()
        .filter_map(|e| text.emotion_relevance(e))
        .max()
        .unwrap_or(0)
}

fn desc_f64(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Equality filters for browsing the corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WisdomFilter {
    pub source: Option<WisdomSource>,
    pub theme: Option<String>,
    pub emotion: Option<String>,
    pub category: Option<String>,
}

impl WisdomFilter {
    pub fn matches(&self, text: &WisdomText) -> bool {
        text.is_active
            && self.source.map_or(true, |s| text.source == s)
            && self
                .theme
                .as_ref()
                .map_or(true, |t| text.primary_themes.contains(t))
            && self.emotion.as_ref().map_or(true, |e| text.has_emotion(e))
            && self
                .category
                .as_ref()
                .map_or(true, |c| text.problem_categories.contains(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wisdom::{EmotionalKeyword, ScriptLanguage, Tradition};
    use pretty_assertions::assert_eq;

    fn text(source: WisdomSource, rating: f64, retrieved: u64) -> WisdomText {
        let mut t = WisdomText::new(
            source,
            Tradition::Hinduism,
            ScriptLanguage::Sanskrit,
            "original",
            format!("{} text", source.as_str()),
        );
        t.usage.average_rating = rating;
        t.usage.times_retrieved = retrieved;
        t
    }

    #[test]
    fn or_criteria_match_any_field() {
        let mut a = text(WisdomSource::BhagavadGita, 0.0, 0);
        a.primary_themes = vec!["peace".into()];
        let mut b = text(WisdomSource::Quran, 0.0, 0);
        b.keywords = vec!["Patience".into()];
        let c = text(WisdomSource::Bible, 0.0, 0);

        let query = WisdomQuery::new().themes(["peace"]).keywords(["patience"]);
        assert!(query.matches(&a));
        assert!(query.matches(&b));
        assert!(!query.matches(&c));
    }

    #[test]
    fn inactive_and_foreign_sources_are_excluded() {
        let mut inactive = text(WisdomSource::Bible, 5.0, 0);
        inactive.is_active = false;
        let gita = text(WisdomSource::BhagavadGita, 1.0, 0);

        assert!(!WisdomQuery::new().matches(&inactive));
        let only_quran = WisdomQuery::new().sources([WisdomSource::Quran]);
        assert!(!only_quran.matches(&gita));
        assert!(WisdomQuery::new().matches(&gita));
    }

    #[test]
    fn sort_by_rating_then_retrievals() {
        let texts = vec![
            text(WisdomSource::Bible, 4.0, 1),
            text(WisdomSource::Quran, 4.0, 9),
            text(WisdomSource::Torah, 5.0, 0),
        ];
        let found = WisdomQuery::new().limit(2).apply(texts.iter());
        let sources: Vec<_> = found.iter().map(|t| t.source).collect();
        assert_eq!(sources, vec![WisdomSource::Torah, WisdomSource::Quran]);
    }

    #[test]
    fn emotion_relevance_sort_prefers_strongest_match() {
        let mut weak = text(WisdomSource::Bible, 5.0, 0);
        weak.emotional_keywords = vec![EmotionalKeyword {
            emotion: "sad".into(),
            relevance_score: 3,
        }];
        let mut strong = text(WisdomSource::Quran, 1.0, 0);
        strong.emotional_keywords = vec![EmotionalKeyword {
            emotion: "sad".into(),
            relevance_score: 9,
        }];
        let query = WisdomQuery::new()
            .emotions(["sad"])
            .sort(WisdomSort::EmotionRelevance(vec!["sad".into()]));
        let found = query.apply([weak, strong].iter());
        assert_eq!(found[0].source, WisdomSource::Quran);
    }

    #[test]
    fn filter_combines_equality_checks() {
        let mut t = text(WisdomSource::Dhammapada, 0.0, 0);
        t.primary_themes = vec!["mindfulness".into()];
        let filter = WisdomFilter {
            source: Some(WisdomSource::Dhammapada),
            theme: Some("mindfulness".into()),
            ..WisdomFilter::default()
        };
        assert!(filter.matches(&t));
        let wrong = WisdomFilter {
            theme: Some("courage".into()),
            ..filter
        };
        assert!(!wrong.matches(&t));
    }
}
