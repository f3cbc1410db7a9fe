use crate::wisdom::WisdomText;
use crate::Result;

const SEED_CORPUS_JSON: &str = include_str!("../data/wisdom_texts.json");

/// Built-in corpus. Ids and timestamps are freshly assigned on every call.
pub fn seed_corpus() -> Result<Vec<WisdomText>> {
    let texts: Vec<WisdomText> = serde_json::from_str(SEED_CORPUS_JSON)?;
    for text in &texts {
        text.validate()?;
    }
    Ok(texts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wisdom::{Tradition, WisdomSource};
    use std::collections::HashSet;

    #[test]
    fn seed_corpus_parses_and_validates() {
        let corpus = seed_corpus().unwrap();
        assert_eq!(corpus.len(), 14);
        let traditions: HashSet<Tradition> = corpus.iter().map(|t| t.tradition).collect();
        assert_eq!(traditions.len(), 8);
        assert!(corpus.iter().all(|t| t.is_active));
        assert!(corpus.iter().all(|t| t.usage.times_retrieved == 0));
    }

    #[test]
    fn seed_display_names_match_sources() {
        for text in seed_corpus().unwrap() {
            assert_eq!(text.source_display_name, text.source.display_name());
        }
    }

    #[test]
    fn gita_duty_verse_is_present() {
        let corpus = seed_corpus().unwrap();
        let verse = corpus
            .iter()
            .find(|t| t.source == WisdomSource::BhagavadGita && t.verse.as_deref() == Some("47"))
            .unwrap();
        assert_eq!(verse.contextual_attribution(), "Krishna to Arjuna");
        assert_eq!(verse.emotion_relevance("anxious"), Some(9));
    }
}
