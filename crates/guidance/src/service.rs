use crate::engine::{GuidanceEngine, GuidanceOutcome};
use crate::error::{GuidanceError, Result};
use crate::templates::stable_hash;
use chrono::{DateTime, Months, NaiveDate, Utc};
use mindverse_protocol::Validator;
use mindverse_store::{
    Guidance, LabelCount, MonthlyStat, Store, StoreError, User, UserGuidanceStats, WisdomQuery,
    WisdomSort, WisdomSource, FEEDBACK_MAX_CHARS, NOTES_MAX_CHARS, PROBLEM_TEXT_MAX_CHARS,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

pub const DEFAULT_GUIDANCE_KARMA_COST: u32 = 15;
pub const DEFAULT_AFFIRMATION_KARMA_COST: u32 = 5;
pub const PROBLEM_TEXT_MIN_CHARS: usize = 10;
pub const AFFIRMATION_THEMES: [&str; 6] = ["hope", "peace", "love", "wisdom", "gratitude", "joy"];
const AFFIRMATION_POOL: usize = 10;
const STATS_MONTHS: u32 = 6;
const STATS_TOP: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceSettings {
    pub guidance_karma_cost: u32,
    pub affirmation_karma_cost: u32,
}

impl Default for GuidanceSettings {
    fn default() -> Self {
        Self {
            guidance_karma_cost: DEFAULT_GUIDANCE_KARMA_COST,
            affirmation_karma_cost: DEFAULT_AFFIRMATION_KARMA_COST,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GuidanceRequest {
    pub user_id: Uuid,
    pub problem_text: String,
    pub selected_books: Vec<WisdomSource>,
    pub emotions: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceReceipt {
    pub guidance_id: Uuid,
    #[serde(flatten)]
    pub outcome: GuidanceOutcome,
    pub karma_used: u32,
    pub remaining_karma: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffirmationText {
    pub text: String,
    pub original_text: String,
    pub source: String,
    pub attribution: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Affirmation {
    pub wisdom: AffirmationText,
    pub karma_used: u32,
    pub remaining_karma: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceStatsReport {
    #[serde(flatten)]
    pub overview: UserGuidanceStats,
    pub saved_guidance_count: usize,
    pub monthly_stats: Vec<MonthlyStat>,
    pub top_emotions: Vec<LabelCount>,
    pub top_sources: Vec<LabelCount>,
    pub generated_at: DateTime<Utc>,
}

/// Request-level workflows: validation, karma accounting and persistence
/// around the engine.
pub struct GuidanceService {
    store: Arc<Store>,
    engine: GuidanceEngine,
    settings: GuidanceSettings,
}

impl GuidanceService {
    pub fn new(store: Arc<Store>, settings: GuidanceSettings) -> Self {
        Self::with_engine(store, GuidanceEngine::new(), settings)
    }

    pub fn with_engine(store: Arc<Store>, engine: GuidanceEngine, settings: GuidanceSettings) -> Self {
        Self {
            store,
            engine,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn engine(&self) -> &GuidanceEngine {
        &self.engine
    }

    pub fn settings(&self) -> GuidanceSettings {
        self.settings
    }

    pub async fn request_guidance(&self, request: GuidanceRequest) -> Result<GuidanceReceipt> {
        let started = Instant::now();
        Validator::new()
            .length(
                "problemText",
                &request.problem_text,
                PROBLEM_TEXT_MIN_CHARS,
                PROBLEM_TEXT_MAX_CHARS,
                "Problem description must be between 10 and 2000 characters",
            )
            .finish()
            .map_err(GuidanceError::Validation)?;

        let cost = self.settings.guidance_karma_cost;
        let user = self.user(request.user_id).await?;
        if !user.has_karma(cost) {
            return Err(GuidanceError::InsufficientKarma {
                required: cost,
                current: user.karma_balance,
            });
        }

        let problem_text = request.problem_text.trim().to_string();
        let mut outcome = self
            .engine
            .analyze_user_input(&self.store, &problem_text, &request.selected_books)
            .await;
        outcome.metadata.processing_time_ms = started.elapsed().as_millis() as u64;

        let now = Utc::now();
        let guidance = Guidance {
            id: Uuid::new_v4(),
            user_id: user.id,
            problem_text,
            selected_books: request.selected_books,
            user_emotions: request.emotions,
            analysis: outcome.analysis.clone(),
            wisdom_texts: outcome.wisdom_texts.iter().map(|s| s.text.id).collect(),
            guidance: outcome.guidance.clone(),
            user_rating: None,
            user_feedback: None,
            karma_cost: cost,
            metadata: outcome.metadata.clone(),
            is_bookmarked: false,
            is_archived: false,
            created_at: now,
            updated_at: now,
        };
        let guidance_id = guidance.id;
        let session = mindverse_store::GuidanceSession {
            karma_description: format!("Guidance session - {guidance_id}"),
            journey_emotion: outcome.analysis.primary_emotion().map(str::to_string),
            journey_text: outcome
                .wisdom_texts
                .first()
                .map(|s| s.text.source.as_str().to_string()),
            guidance,
        };
        let updated = self.store.commit_guidance_session(session, now).await?;

        log::info!(
            "Guidance {guidance_id} for user {} ({} texts, {} ms)",
            updated.id,
            outcome.wisdom_texts.len(),
            outcome.metadata.processing_time_ms
        );
        Ok(GuidanceReceipt {
            guidance_id,
            outcome,
            karma_used: cost,
            remaining_karma: updated.karma_balance,
        })
    }

    pub async fn guidance(&self, user_id: Uuid, id: Uuid) -> Result<Guidance> {
        self.store
            .guidance_for_user(user_id, id)
            .await
            .map_err(not_found("Guidance not found"))
    }

    pub async fn rate_guidance(
        &self,
        user_id: Uuid,
        id: Uuid,
        rating: i64,
        feedback: Option<String>,
    ) -> Result<Guidance> {
        let feedback = feedback.map(|f| f.trim().to_string());
        let mut validator = Validator::new();
        validator.range("rating", rating, 1, 5, "Rating must be between 1 and 5");
        if let Some(feedback) = &feedback {
            validator.max_length(
                "feedback",
                feedback,
                FEEDBACK_MAX_CHARS,
                "Feedback cannot exceed 1000 characters",
            );
        }
        validator.finish().map_err(GuidanceError::Validation)?;

        // Range-checked above.
        let rating = rating as u8;
        self.store
            .rate_guidance(user_id, id, rating, feedback, Utc::now())
            .await
            .map_err(not_found("Guidance not found"))
    }

    /// Bookmark a guidance in the user's saved list; saving twice replaces
    /// the tags and notes.
    pub async fn save_guidance(
        &self,
        user_id: Uuid,
        id: Uuid,
        tags: Vec<String>,
        personal_notes: String,
    ) -> Result<User> {
        let personal_notes = personal_notes.trim().to_string();
        Validator::new()
            .max_length(
                "personalNotes",
                &personal_notes,
                NOTES_MAX_CHARS,
                "Personal notes cannot exceed 500 characters",
            )
            .finish()
            .map_err(GuidanceError::Validation)?;
        self.guidance(user_id, id).await?;

        let now = Utc::now();
        self.store
            .update_user(user_id, |user| {
                user.save_guidance(id, tags, personal_notes, now)?;
                Ok(user.clone())
            })
            .await
            .map_err(not_found("User not found"))
    }

    /// Returns whether the guidance was in the saved list.
    pub async fn unsave_guidance(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        let now = Utc::now();
        self.store
            .update_user(user_id, |user| Ok(user.unsave_guidance(id, now)))
            .await
            .map_err(not_found("User not found"))
    }

    /// One uplifting text per user per day, charged at the affirmation cost.
    pub async fn daily_affirmation(&self, user_id: Uuid, day: NaiveDate) -> Result<Affirmation> {
        let cost = self.settings.affirmation_karma_cost;
        let user = self.user(user_id).await?;
        if !user.has_karma(cost) {
            return Err(GuidanceError::InsufficientKarma {
                required: cost,
                current: user.karma_balance,
            });
        }

        let query = WisdomQuery::new()
            .sources(user.preferences.preferred_wisdom_texts.iter().copied())
            .themes(AFFIRMATION_THEMES)
            .sort(WisdomSort::Insertion)
            .limit(AFFIRMATION_POOL);
        let pool = self.store.find_wisdom(&query).await;
        if pool.is_empty() {
            return Err(GuidanceError::NoAffirmations);
        }
        let seed = format!("{user_id}:{day}");
        let index = (stable_hash(seed.as_bytes()) % pool.len() as u64) as usize;
        let text = &pool[index];

        let updated = self
            .store
            .charge_affirmation(user_id, cost, text.id, Utc::now())
            .await?;
        log::debug!("Affirmation {} for user {user_id} on {day}", text.id);

        Ok(Affirmation {
            wisdom: AffirmationText {
                text: text.translation(user.preferences.language).to_string(),
                original_text: text.original_text.clone(),
                source: text.source_display_name.clone(),
                attribution: text.contextual_attribution(),
                context: text.context.clone(),
            },
            karma_used: cost,
            remaining_karma: updated.karma_balance,
        })
    }

    pub async fn guidance_stats(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<GuidanceStatsReport> {
        let user = self.user(user_id).await?;
        let since = now
            .checked_sub_months(Months::new(STATS_MONTHS))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Ok(GuidanceStatsReport {
            overview: self.store.user_guidance_stats(user_id).await,
            saved_guidance_count: user.saved_guidance.len(),
            monthly_stats: self.store.monthly_stats(user_id, since).await,
            top_emotions: self.store.top_emotions(user_id, STATS_TOP).await,
            top_sources: self.store.top_sources(user_id, STATS_TOP).await,
            generated_at: now,
        })
    }

    async fn user(&self, user_id: Uuid) -> Result<User> {
        self.store
            .user(user_id)
            .await
            .map_err(not_found("User not found"))
    }
}

fn not_found(message: &'static str) -> impl Fn(StoreError) -> GuidanceError {
    move |err| match err {
        StoreError::NotFound(_) => GuidanceError::NotFound(message.to_string()),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::TemplateSelector;
    use mindverse_store::{seed_corpus, Language, NewUser, MIN_PASSWORD_COST, WELCOME_KARMA};
    use pretty_assertions::assert_eq;

    const PROBLEM: &str = "I am anxious about my job and my boss keeps yelling at me";

    async fn service() -> GuidanceService {
        let store = Store::in_memory().with_password_cost(MIN_PASSWORD_COST);
        store
            .replace_wisdom_corpus(seed_corpus().unwrap())
            .await
            .unwrap();
        GuidanceService::with_engine(
            Arc::new(store),
            GuidanceEngine::with_selector(TemplateSelector::Fixed(0)),
            GuidanceSettings::default(),
        )
    }

    async fn register(service: &GuidanceService, email: &str) -> User {
        service
            .store()
            .create_user(
                NewUser {
                    first_name: "Asha".into(),
                    last_name: "Rao".into(),
                    email: email.into(),
                    password: "long-enough".into(),
                },
                Utc::now(),
            )
            .await
            .unwrap()
    }

    fn request(user_id: Uuid, text: &str) -> GuidanceRequest {
        GuidanceRequest {
            user_id,
            problem_text: text.into(),
            ..GuidanceRequest::default()
        }
    }

    #[tokio::test]
    async fn request_guidance_charges_and_records() {
        let service = service().await;
        let user = register(&service, "a@example.com").await;

        let receipt = service.request_guidance(request(user.id, PROBLEM)).await.unwrap();
        assert_eq!(receipt.karma_used, 15);
        assert_eq!(receipt.remaining_karma, WELCOME_KARMA - 15);
        assert!(!receipt.outcome.wisdom_texts.is_empty());

        let stored = service.guidance(user.id, receipt.guidance_id).await.unwrap();
        assert_eq!(stored.problem_text, PROBLEM);
        assert_eq!(stored.wisdom_texts.len(), receipt.outcome.wisdom_texts.len());

        let user = service.store().user(user.id).await.unwrap();
        let last = user.karma_transactions.last().unwrap();
        assert_eq!(last.description, format!("Guidance session - {}", receipt.guidance_id));
        assert_eq!(user.journey_stats.total_problems_shared, 1);
        assert_eq!(user.journey_stats.total_guidance_received, 1);

        let top = &receipt.outcome.wisdom_texts[0].text;
        let cited = service.store().wisdom(top.id).await.unwrap();
        assert_eq!(cited.usage.times_retrieved, 1);
    }

    #[tokio::test]
    async fn short_problem_text_is_rejected() {
        let service = service().await;
        let user = register(&service, "a@example.com").await;
        let err = service
            .request_guidance(request(user.id, "   too short   "))
            .await
            .unwrap_err();
        match err {
            GuidanceError::Validation(errors) => assert_eq!(errors[0].field, "problemText"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let service = service().await;
        let err = service
            .request_guidance(request(Uuid::new_v4(), PROBLEM))
            .await
            .unwrap_err();
        assert!(matches!(err, GuidanceError::NotFound(ref m) if m == "User not found"));
    }

    #[tokio::test]
    async fn insufficient_karma_reports_balance() {
        let service = service().await;
        let user = register(&service, "a@example.com").await;
        service
            .store()
            .update_user(user.id, |u| {
                u.karma_balance = 10;
                Ok(())
            })
            .await
            .unwrap();
        let err = service.request_guidance(request(user.id, PROBLEM)).await.unwrap_err();
        assert!(matches!(
            err,
            GuidanceError::InsufficientKarma {
                required: 15,
                current: 10
            }
        ));
        assert_eq!(service.store().guidance_count(user.id).await, 0);
    }

    #[tokio::test]
    async fn rating_validates_and_propagates() {
        let service = service().await;
        let user = register(&service, "a@example.com").await;
        let receipt = service.request_guidance(request(user.id, PROBLEM)).await.unwrap();

        let err = service
            .rate_guidance(user.id, receipt.guidance_id, 6, None)
            .await
            .unwrap_err();
        assert!(matches!(err, GuidanceError::Validation(_)));

        let rated = service
            .rate_guidance(user.id, receipt.guidance_id, 4, Some("helpful".into()))
            .await
            .unwrap();
        assert_eq!(rated.user_rating, Some(4));
        assert_eq!(rated.user_feedback.as_deref(), Some("helpful"));

        let cited = service
            .store()
            .wisdom(rated.wisdom_texts[0])
            .await
            .unwrap();
        assert_eq!(cited.usage.total_ratings, 1);
        assert_eq!(cited.usage.average_rating, 4.0);

        let rerated = service
            .rate_guidance(user.id, receipt.guidance_id, 5, None)
            .await
            .unwrap();
        assert_eq!(rerated.user_rating, Some(5));
        assert_eq!(rerated.user_feedback, None);

        let missing = service
            .rate_guidance(user.id, Uuid::new_v4(), 3, None)
            .await
            .unwrap_err();
        assert!(matches!(missing, GuidanceError::NotFound(ref m) if m == "Guidance not found"));
    }

    #[tokio::test]
    async fn other_users_guidance_is_invisible() {
        let service = service().await;
        let owner = register(&service, "a@example.com").await;
        let other = register(&service, "b@example.com").await;
        let receipt = service.request_guidance(request(owner.id, PROBLEM)).await.unwrap();
        assert!(matches!(
            service.guidance(other.id, receipt.guidance_id).await,
            Err(GuidanceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn save_and_unsave_round_trip() {
        let service = service().await;
        let user = register(&service, "a@example.com").await;
        let receipt = service.request_guidance(request(user.id, PROBLEM)).await.unwrap();

        let saved = service
            .save_guidance(user.id, receipt.guidance_id, vec!["work".into()], "keep".into())
            .await
            .unwrap();
        assert!(saved.is_saved(receipt.guidance_id));

        let too_long = service
            .save_guidance(user.id, receipt.guidance_id, Vec::new(), "x".repeat(501))
            .await
            .unwrap_err();
        assert!(matches!(too_long, GuidanceError::Validation(_)));

        assert!(service.unsave_guidance(user.id, receipt.guidance_id).await.unwrap());
        assert!(!service.unsave_guidance(user.id, receipt.guidance_id).await.unwrap());

        let missing = service
            .save_guidance(user.id, Uuid::new_v4(), Vec::new(), String::new())
            .await
            .unwrap_err();
        assert!(matches!(missing, GuidanceError::NotFound(_)));
    }

    #[tokio::test]
    async fn affirmation_is_stable_per_day_and_charged() {
        let service = service().await;
        let user = register(&service, "a@example.com").await;
        let day = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();

        let first = service.daily_affirmation(user.id, day).await.unwrap();
        let second = service.daily_affirmation(user.id, day).await.unwrap();
        assert_eq!(first.wisdom, second.wisdom);
        assert_eq!(first.karma_used, 5);
        assert_eq!(second.remaining_karma, WELCOME_KARMA - 10);
    }

    #[tokio::test]
    async fn affirmation_respects_preferences_and_language() {
        let service = service().await;
        let user = register(&service, "a@example.com").await;
        service
            .store()
            .update_user(user.id, |u| {
                u.preferences.preferred_wisdom_texts = vec![WisdomSource::Quran];
                u.preferences.language = Language::Hindi;
                Ok(())
            })
            .await
            .unwrap();
        let day = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let affirmation = service.daily_affirmation(user.id, day).await.unwrap();
        assert_eq!(affirmation.wisdom.source, "Holy Quran");
        assert!(!affirmation.wisdom.text.is_empty());
    }

    #[tokio::test]
    async fn empty_pool_has_no_affirmations() {
        let store = Arc::new(Store::in_memory().with_password_cost(MIN_PASSWORD_COST));
        let service = GuidanceService::new(store, GuidanceSettings::default());
        let user = register(&service, "a@example.com").await;
        let day = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        assert!(matches!(
            service.daily_affirmation(user.id, day).await,
            Err(GuidanceError::NoAffirmations)
        ));
        let user = service.store().user(user.id).await.unwrap();
        assert_eq!(user.karma_balance, WELCOME_KARMA);
    }

    #[tokio::test]
    async fn stats_cover_recent_sessions() {
        let service = service().await;
        let user = register(&service, "a@example.com").await;
        let receipt = service.request_guidance(request(user.id, PROBLEM)).await.unwrap();
        service
            .save_guidance(user.id, receipt.guidance_id, Vec::new(), String::new())
            .await
            .unwrap();

        let report = service.guidance_stats(user.id, Utc::now()).await.unwrap();
        assert_eq!(report.overview.total_guidance, 1);
        assert_eq!(report.saved_guidance_count, 1);
        assert_eq!(report.monthly_stats.len(), 1);
        assert_eq!(report.monthly_stats[0].count, 1);
        assert_eq!(report.top_emotions[0].label, "anxious");
        assert!(!report.top_sources.is_empty());
    }
}
