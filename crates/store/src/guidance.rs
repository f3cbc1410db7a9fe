use crate::wisdom::WisdomSource;
use chrono::{DateTime, Duration, Utc};
use mindverse_analysis::{Polarity, TextAnalysis};
use mindverse_protocol::truncate_with_ellipsis;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const PROBLEM_TEXT_MAX_CHARS: usize = 2000;
pub const FEEDBACK_MAX_CHARS: usize = 1000;
pub const SUMMARY_TEXT_CHARS: usize = 100;
const EDIT_WINDOW_HOURS: i64 = 24;
const STRONG_SENTIMENT: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WisdomReference {
    pub text: String,
    pub source: String,
    pub reference: String,
    pub attribution: String,
    pub original_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalWisdom {
    pub text: String,
    pub source: String,
    pub reference: String,
}

/// Rendered guidance handed back to the reader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceContent {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wisdom_reference: Option<WisdomReference>,
    pub personalized_advice: String,
    #[serde(default)]
    pub additional_wisdom: Vec<AdditionalWisdom>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotional_support: Option<String>,
    #[serde(default)]
    pub actionable_steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceMetadata {
    pub processed_at: DateTime<Utc>,
    pub text_length: usize,
    pub confidence_score: f64,
    #[serde(default)]
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guidance {
    pub id: Uuid,
    pub user_id: Uuid,
    pub problem_text: String,
    #[serde(default)]
    pub selected_books: Vec<WisdomSource>,
    #[serde(default)]
    pub user_emotions: Vec<String>,
    pub analysis: TextAnalysis,
    #[serde(default)]
    pub wisdom_texts: Vec<Uuid>,
    pub guidance: GuidanceContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_feedback: Option<String>,
    pub karma_cost: u32,
    pub metadata: GuidanceMetadata,
    #[serde(default)]
    pub is_bookmarked: bool,
    #[serde(default)]
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceSummary {
    pub id: Uuid,
    pub problem_text: String,
    pub primary_emotion: Option<String>,
    pub primary_theme: Option<String>,
    pub wisdom_source: Option<String>,
    pub sentiment: &'static str,
    pub rating: Option<u8>,
    pub karma_cost: u32,
    pub created_at: DateTime<Utc>,
}

impl Guidance {
    pub fn primary_emotion(&self) -> Option<&str> {
        self.analysis.primary_emotion()
    }

    pub fn primary_theme(&self) -> Option<&str> {
        self.analysis.primary_theme()
    }

    pub fn primary_wisdom_source(&self) -> Option<&str> {
        self.guidance
            .wisdom_reference
            .as_ref()
            .map(|r| r.source.as_str())
    }

    pub fn sentiment_label(&self) -> &'static str {
        let sentiment = &self.analysis.sentiment;
        let strong = sentiment.intensity > STRONG_SENTIMENT;
        match (sentiment.polarity, strong) {
            (Polarity::Positive, true) => "very positive",
            (Polarity::Positive, false) => "positive",
            (Polarity::Negative, true) => "very negative",
            (Polarity::Negative, false) => "negative",
            (Polarity::Neutral, _) => "neutral",
        }
    }

    pub fn summary(&self) -> GuidanceSummary {
        GuidanceSummary {
            id: self.id,
            problem_text: truncate_with_ellipsis(&self.problem_text, SUMMARY_TEXT_CHARS),
            primary_emotion: self.primary_emotion().map(str::to_string),
            primary_theme: self.primary_theme().map(str::to_string),
            wisdom_source: self.primary_wisdom_source().map(str::to_string),
            sentiment: self.sentiment_label(),
            rating: self.user_rating,
            karma_cost: self.karma_cost,
            created_at: self.created_at,
        }
    }

    pub fn can_be_edited(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at < Duration::hours(EDIT_WINDOW_HOURS)
    }

    pub fn has_emotion(&self, emotion: &str) -> bool {
        self.analysis.emotions.iter().any(|e| e.emotion == emotion)
    }

    pub fn has_theme(&self, theme: &str) -> bool {
        self.analysis.themes.iter().any(|t| t.theme == theme)
    }
}

/// Aggregate over one user's guidance sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGuidanceStats {
    pub total_guidance: usize,
    pub total_karma_spent: u64,
    pub average_rating: Option<f64>,
    pub rated_guidance_count: usize,
    pub average_confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStat {
    pub year: i32,
    pub month: u32,
    pub count: usize,
    pub average_rating: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}
