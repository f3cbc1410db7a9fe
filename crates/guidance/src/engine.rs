use crate::advice::{
    actionable_steps, emotional_support, personalized_advice, FALLBACK_ADVICE, FALLBACK_MESSAGE,
};
use crate::scoring::{find_relevant_wisdom, ScoredWisdom};
use crate::templates::{contextual_message, TemplateSelector};
use chrono::Utc;
use mindverse_analysis::{calculate_confidence_score, Analyzer, TextAnalysis};
use mindverse_store::{
    AdditionalWisdom, GuidanceContent, GuidanceMetadata, Store, WisdomReference, WisdomSource,
    WisdomText,
};
use serde::Serialize;
use std::time::Instant;

const ADDITIONAL_WISDOM_COUNT: usize = 2;
const DEFAULT_EMOTION: &str = "challenged";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceOutcome {
    pub analysis: TextAnalysis,
    pub wisdom_texts: Vec<ScoredWisdom>,
    pub guidance: GuidanceContent,
    pub metadata: GuidanceMetadata,
}

/// Compose the guidance body from an analysis and its ranked texts.
pub fn generate_guidance(
    analysis: &TextAnalysis,
    wisdom: &[ScoredWisdom],
    selector: TemplateSelector,
    seed: &str,
) -> GuidanceContent {
    let Some(top) = wisdom.first() else {
        return GuidanceContent {
            message: FALLBACK_MESSAGE.to_string(),
            personalized_advice: FALLBACK_ADVICE.to_string(),
            ..GuidanceContent::default()
        };
    };

    let emotion = analysis.primary_emotion().unwrap_or(DEFAULT_EMOTION);
    GuidanceContent {
        message: contextual_message(&top.text, emotion, selector, seed),
        wisdom_reference: Some(reference(&top.text)),
        personalized_advice: personalized_advice(&analysis.emotions, &analysis.problem_categories),
        additional_wisdom: wisdom
            .iter()
            .skip(1)
            .take(ADDITIONAL_WISDOM_COUNT)
            .map(|s| AdditionalWisdom {
                text: s.text.translations.english.clone(),
                source: s.text.source_display_name.clone(),
                reference: s.full_reference.clone(),
            })
            .collect(),
        emotional_support: Some(emotional_support(emotion)),
        actionable_steps: actionable_steps(&analysis.problem_categories, &analysis.themes),
    }
}

fn reference(text: &WisdomText) -> WisdomReference {
    WisdomReference {
        text: text.translations.english.clone(),
        source: text.source_display_name.clone(),
        reference: text.full_reference(),
        attribution: text.contextual_attribution(),
        original_text: text.original_text.clone(),
        context: text.context.clone(),
    }
}

/// Analysis, retrieval and composition behind one problem description.
pub struct GuidanceEngine {
    analyzer: Analyzer,
    selector: TemplateSelector,
}

impl Default for GuidanceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GuidanceEngine {
    pub fn new() -> Self {
        Self::with_selector(TemplateSelector::default())
    }

    pub fn with_selector(selector: TemplateSelector) -> Self {
        Self {
            analyzer: Analyzer::new(),
            selector,
        }
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    pub async fn analyze_user_input(
        &self,
        store: &Store,
        text: &str,
        selected_books: &[WisdomSource],
    ) -> GuidanceOutcome {
        let started = Instant::now();
        let analysis = self.analyzer.analyze(text);
        let wisdom_texts = find_relevant_wisdom(store, &analysis, selected_books).await;
        let guidance = generate_guidance(&analysis, &wisdom_texts, self.selector, text);
        let confidence_score =
            calculate_confidence_score(&analysis.sentiment, &analysis.emotions, &analysis.themes);

        log::debug!(
            "Guidance composed from {} texts (confidence {confidence_score})",
            wisdom_texts.len()
        );

        GuidanceOutcome {
            metadata: GuidanceMetadata {
                processed_at: Utc::now(),
                text_length: text.chars().count(),
                confidence_score,
                processing_time_ms: started.elapsed().as_millis() as u64,
            },
            analysis,
            wisdom_texts,
            guidance,
        }
    }
}
