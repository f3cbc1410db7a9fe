//! Guidance generation for MindVerse.
//!
//! Given a problem description, [`GuidanceEngine`] analyzes the text, retrieves
//! the most relevant wisdom texts from a [`mindverse_store::Store`] and composes
//! a message around the best one. [`GuidanceService`] wraps the engine with the
//! request-level workflow: validation, karma accounting and persistence.

pub mod advice;
pub mod engine;
pub mod error;
pub mod scoring;
pub mod service;
pub mod templates;

pub use engine::{generate_guidance, GuidanceEngine, GuidanceOutcome};
pub use error::{GuidanceError, Result};
pub use scoring::{find_relevant_wisdom, score_relevance, ScoredWisdom};
pub use service::{
    Affirmation, AffirmationText, GuidanceReceipt, GuidanceRequest, GuidanceService,
    GuidanceSettings, GuidanceStatsReport, AFFIRMATION_THEMES, DEFAULT_AFFIRMATION_KARMA_COST,
    DEFAULT_GUIDANCE_KARMA_COST,
};
pub use templates::{contextual_message, stable_hash, TemplateSelector};
