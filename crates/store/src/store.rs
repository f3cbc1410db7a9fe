use crate::guidance::{
    Guidance, LabelCount, MonthlyStat, UserGuidanceStats, FEEDBACK_MAX_CHARS,
    PROBLEM_TEXT_MAX_CHARS,
};
use crate::password::{new_session_token, token_digest, DEFAULT_PASSWORD_COST};
use crate::query::{WisdomFilter, WisdomQuery, WisdomSort, DEFAULT_FIND_LIMIT};
use crate::user::{normalize_email, NewUser, User};
use crate::wisdom::{WisdomSource, WisdomText};
use crate::{Result, StoreError};
use chrono::{DateTime, Datelike, Duration, Utc};
use mindverse_protocol::Pagination;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use uuid::Uuid;

const SNAPSHOT_VERSION: u32 = 1;
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token_digest: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Session {
    fn is_live(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now < self.created_at + ttl
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    wisdom_texts: Vec<WisdomText>,
    #[serde(default)]
    guidance: Vec<Guidance>,
    #[serde(default)]
    users: Vec<User>,
    #[serde(default)]
    sessions: Vec<Session>,
}

impl Snapshot {
    fn user_mut(&mut self, id: Uuid) -> Result<&mut User> {
        self.users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("user {id}")))
    }

    fn increment_usage(&mut self, ids: &[Uuid], now: DateTime<Utc>) {
        for text in self.wisdom_texts.iter_mut().filter(|t| ids.contains(&t.id)) {
            text.increment_usage(now);
        }
    }

    fn guidance_mut(&mut self, user_id: Uuid, id: Uuid) -> Result<&mut Guidance> {
        self.guidance
            .iter_mut()
            .find(|g| g.id == id && g.user_id == user_id)
            .ok_or_else(|| StoreError::NotFound(format!("guidance {id}")))
    }

    fn user_guidance(&self, user_id: Uuid) -> impl Iterator<Item = &Guidance> {
        self.guidance.iter().filter(move |g| g.user_id == user_id)
    }
}

/// One guidance request, committed atomically: the record is stored, karma
/// is charged, journey stats advance and the cited texts count a retrieval.
#[derive(Debug, Clone)]
pub struct GuidanceSession {
    pub guidance: Guidance,
    pub karma_description: String,
    pub journey_emotion: Option<String>,
    pub journey_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusSummary {
    pub total: usize,
    pub active: usize,
    pub by_tradition: BTreeMap<String, usize>,
    pub users: usize,
    pub guidance: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidancePage {
    pub guidance: Vec<Guidance>,
    pub pagination: Pagination,
}

/// JSON document store. File-backed stores rewrite their snapshot after
/// every mutation (tmp file + rename); in-memory stores never touch disk.
pub struct Store {
    path: Option<PathBuf>,
    state: RwLock<Snapshot>,
    password_cost: u32,
    session_ttl: Duration,
}

impl Store {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let snapshot = if tokio::fs::try_exists(&path).await? {
            log::info!("Loading store from {}", path.display());
            let bytes = tokio::fs::read(&path).await?;
            let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
            if snapshot.version > SNAPSHOT_VERSION {
                return Err(StoreError::Other(format!(
                    "store snapshot version {} is newer than supported {}",
                    snapshot.version, SNAPSHOT_VERSION
                )));
            }
            snapshot
        } else {
            log::info!("Creating new store at {}", path.display());
            Snapshot {
                version: SNAPSHOT_VERSION,
                ..Snapshot::default()
            }
        };
        log::debug!(
            "Store ready: {} texts, {} users, {} guidance",
            snapshot.wisdom_texts.len(),
            snapshot.users.len(),
            snapshot.guidance.len()
        );
        Ok(Self {
            path: Some(path),
            state: RwLock::new(snapshot),
            password_cost: DEFAULT_PASSWORD_COST,
            session_ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: RwLock::new(Snapshot {
                version: SNAPSHOT_VERSION,
                ..Snapshot::default()
            }),
            password_cost: DEFAULT_PASSWORD_COST,
            session_ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
        }
    }

    /// bcrypt work factor for new passwords. Existing hashes keep their own.
    #[must_use]
    pub fn with_password_cost(mut self, cost: u32) -> Self {
        self.password_cost = cost;
        self
    }

    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    pub async fn persist(&self) -> Result<()> {
        let state = self.state.read().await;
        self.write_snapshot(&state).await
    }

    async fn write_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        if let Err(err) = tokio::fs::rename(&tmp, path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(err.into());
        }
        log::debug!("Store persisted to {}", path.display());
        Ok(())
    }

    /// Apply `f` to a copy of the snapshot. The copy becomes the live state
    /// only once it is on disk, so a failed `f` or a failed write leaves
    /// nothing behind.
    async fn mutate<T>(&self, f: impl FnOnce(&mut Snapshot) -> Result<T>) -> Result<T> {
        let mut state = self.state.write().await;
        let mut draft = Snapshot::clone(&state);
        let out = f(&mut draft)?;
        self.write_snapshot(&draft).await?;
        *state = draft;
        Ok(out)
    }

    // ---- wisdom ---------------------------------------------------------

    pub async fn insert_wisdom(&self, text: WisdomText) -> Result<Uuid> {
        text.validate()?;
        let id = text.id;
        self.mutate(|state| {
            if state.wisdom_texts.iter().any(|t| t.id == id) {
                return Err(StoreError::Conflict(format!(
                    "wisdom text {id} already exists"
                )));
            }
            state.wisdom_texts.push(text);
            Ok(id)
        })
        .await
    }

    /// Replace the whole corpus. Guidance records keep their (now dangling) ids.
    pub async fn replace_wisdom_corpus(&self, texts: Vec<WisdomText>) -> Result<usize> {
        for text in &texts {
            text.validate()?;
        }
        let count = texts.len();
        self.mutate(|state| {
            state.wisdom_texts = texts;
            Ok(())
        })
        .await?;
        log::info!("Wisdom corpus replaced with {count} texts");
        Ok(count)
    }

    pub async fn wisdom(&self, id: Uuid) -> Result<WisdomText> {
        let state = self.state.read().await;
        state
            .wisdom_texts
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("wisdom text {id}")))
    }

    /// Number of stored texts, active or not.
    pub async fn wisdom_count(&self) -> usize {
        self.state.read().await.wisdom_texts.len()
    }

    pub async fn list_wisdom(&self, filter: &WisdomFilter, limit: usize) -> Vec<WisdomText> {
        let state = self.state.read().await;
        let mut found: Vec<WisdomText> = state
            .wisdom_texts
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            b.usage
                .average_rating
                .partial_cmp(&a.usage.average_rating)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        found.truncate(limit);
        found
    }

    pub async fn find_wisdom(&self, query: &WisdomQuery) -> Vec<WisdomText> {
        let state = self.state.read().await;
        query.apply(state.wisdom_texts.iter())
    }

    pub async fn find_by_themes(&self, themes: &[String], limit: Option<usize>) -> Vec<WisdomText> {
        let query = WisdomQuery::new()
            .themes(themes.iter().cloned())
            .limit(limit.unwrap_or(DEFAULT_FIND_LIMIT));
        self.find_nonempty(themes.is_empty(), &query).await
    }

    pub async fn find_by_emotions(
        &self,
        emotions: &[String],
        limit: Option<usize>,
    ) -> Vec<WisdomText> {
        let query = WisdomQuery::new()
            .emotions(emotions.iter().cloned())
            .sort(WisdomSort::EmotionRelevance(emotions.to_vec()))
            .limit(limit.unwrap_or(DEFAULT_FIND_LIMIT));
        self.find_nonempty(emotions.is_empty(), &query).await
    }

    pub async fn find_by_problem_categories(
        &self,
        categories: &[String],
        limit: Option<usize>,
    ) -> Vec<WisdomText> {
        let query = WisdomQuery::new()
            .categories(categories.iter().cloned())
            .sort(WisdomSort::Rating)
            .limit(limit.unwrap_or(DEFAULT_FIND_LIMIT));
        self.find_nonempty(categories.is_empty(), &query).await
    }

    pub async fn find_by_source(
        &self,
        sources: &[WisdomSource],
        limit: Option<usize>,
    ) -> Vec<WisdomText> {
        let query = WisdomQuery::new()
            .sources(sources.iter().copied())
            .sort(WisdomSort::Rating)
            .limit(limit.unwrap_or(DEFAULT_FIND_LIMIT));
        self.find_nonempty(sources.is_empty(), &query).await
    }

    // An empty `$in` list matches nothing; without this guard the query
    // would fall through to "no criteria" and return everything.
    async fn find_nonempty(&self, empty: bool, query: &WisdomQuery) -> Vec<WisdomText> {
        if empty {
            return Vec::new();
        }
        self.find_wisdom(query).await
    }

    pub async fn increment_usage(&self, ids: &[Uuid], now: DateTime<Utc>) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.mutate(|state| {
            state.increment_usage(ids, now);
            Ok(())
        })
        .await
    }

    pub async fn rate_wisdom(&self, id: Uuid, rating: u8) -> Result<WisdomText> {
        self.mutate(|state| {
            let text = state
                .wisdom_texts
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| StoreError::NotFound(format!("wisdom text {id}")))?;
            text.add_rating(rating)?;
            Ok(text.clone())
        })
        .await
    }

    pub async fn corpus_summary(&self) -> CorpusSummary {
        let state = self.state.read().await;
        let mut by_tradition = BTreeMap::new();
        for text in &state.wisdom_texts {
            *by_tradition
                .entry(text.tradition.as_str().to_string())
                .or_insert(0) += 1;
        }
        CorpusSummary {
            total: state.wisdom_texts.len(),
            active: state.wisdom_texts.iter().filter(|t| t.is_active).count(),
            by_tradition,
            users: state.users.len(),
            guidance: state.guidance.len(),
        }
    }

    // ---- guidance -------------------------------------------------------

    pub async fn insert_guidance(&self, guidance: Guidance) -> Result<Uuid> {
        validate_guidance(&guidance)?;
        let id = guidance.id;
        self.mutate(|state| {
            state.guidance.push(guidance);
            Ok(id)
        })
        .await
    }

    pub async fn commit_guidance_session(
        &self,
        session: GuidanceSession,
        now: DateTime<Utc>,
    ) -> Result<User> {
        validate_guidance(&session.guidance)?;
        self.mutate(|state| {
            let user = state.user_mut(session.guidance.user_id)?;
            user.deduct_karma(
                session.guidance.karma_cost,
                session.karma_description,
                now,
            )?;
            user.record_problem_shared(now);
            user.record_guidance_received(
                session.journey_emotion.as_deref(),
                session.journey_text.as_deref(),
                now,
            );
            let updated = user.clone();

            state.increment_usage(&session.guidance.wisdom_texts, now);
            state.guidance.push(session.guidance);
            Ok(updated)
        })
        .await
    }

    pub async fn guidance_for_user(&self, user_id: Uuid, id: Uuid) -> Result<Guidance> {
        let state = self.state.read().await;
        let found = state
            .user_guidance(user_id)
            .find(|g| g.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("guidance {id}")));
        found
    }

    /// Guidance owned by `user_id` among `ids`, in the given order.
    pub async fn guidance_many(&self, user_id: Uuid, ids: &[Uuid]) -> Vec<Guidance> {
        let state = self.state.read().await;
        ids.iter()
            .filter_map(|id| state.user_guidance(user_id).find(|g| g.id == *id).cloned())
            .collect()
    }

    /// Newest first; `page` is 1-based.
    pub async fn guidance_history(&self, user_id: Uuid, page: usize, limit: usize) -> GuidancePage {
        let state = self.state.read().await;
        let mut all: Vec<&Guidance> = state.user_guidance(user_id).collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = all.len();
        let guidance = all
            .into_iter()
            .skip(Pagination::skip(page, limit))
            .take(limit)
            .cloned()
            .collect();
        GuidancePage {
            guidance,
            pagination: Pagination::new(page, limit, total),
        }
    }

    pub async fn guidance_count(&self, user_id: Uuid) -> usize {
        self.state.read().await.user_guidance(user_id).count()
    }

    /// Apply `f` to a copy of the record; the copy replaces it only on success.
    pub async fn update_guidance<T>(
        &self,
        user_id: Uuid,
        id: Uuid,
        f: impl FnOnce(&mut Guidance) -> Result<T>,
    ) -> Result<T> {
        self.mutate(|state| {
            let slot = state.guidance_mut(user_id, id)?;
            let out = f(&mut *slot)?;
            validate_guidance(slot)?;
            Ok(out)
        })
        .await
    }

    /// Record the user's rating and feed it into every cited text's average.
    pub async fn rate_guidance(
        &self,
        user_id: Uuid,
        id: Uuid,
        rating: u8,
        feedback: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Guidance> {
        if !(1..=5).contains(&rating) {
            return Err(StoreError::InvalidRating(rating));
        }
        self.mutate(|state| {
            let slot = state.guidance_mut(user_id, id)?;
            slot.user_rating = Some(rating);
            // A new rating replaces the old feedback, even with none.
            slot.user_feedback = feedback.filter(|f| !f.trim().is_empty());
            slot.updated_at = now;
            validate_guidance(slot)?;
            let rated = slot.clone();

            for text in state
                .wisdom_texts
                .iter_mut()
                .filter(|t| rated.wisdom_texts.contains(&t.id))
            {
                text.add_rating(rating)?;
            }
            Ok(rated)
        })
        .await
    }

    pub async fn user_guidance_stats(&self, user_id: Uuid) -> UserGuidanceStats {
        let state = self.state.read().await;
        let mut stats = UserGuidanceStats::default();
        let mut rating_sum = 0u64;
        let mut confidence_sum = 0.0;
        for g in state.user_guidance(user_id) {
            stats.total_guidance += 1;
            stats.total_karma_spent += u64::from(g.karma_cost);
            confidence_sum += g.metadata.confidence_score;
            if let Some(rating) = g.user_rating {
                stats.rated_guidance_count += 1;
                rating_sum += u64::from(rating);
            }
        }
        if stats.rated_guidance_count > 0 {
            stats.average_rating = Some(rating_sum as f64 / stats.rated_guidance_count as f64);
        }
        if stats.total_guidance > 0 {
            stats.average_confidence = Some(confidence_sum / stats.total_guidance as f64);
        }
        stats
    }

    /// Per-calendar-month counts since `since`, oldest month first.
    pub async fn monthly_stats(&self, user_id: Uuid, since: DateTime<Utc>) -> Vec<MonthlyStat> {
        let state = self.state.read().await;
        let mut months: BTreeMap<(i32, u32), (usize, u64, usize)> = BTreeMap::new();
        for g in state.user_guidance(user_id).filter(|g| g.created_at >= since) {
            let entry = months
                .entry((g.created_at.year(), g.created_at.month()))
                .or_insert((0, 0, 0));
            entry.0 += 1;
            if let Some(rating) = g.user_rating {
                entry.1 += u64::from(rating);
                entry.2 += 1;
            }
        }
        months
            .into_iter()
            .map(|((year, month), (count, rating_sum, rated))| MonthlyStat {
                year,
                month,
                count,
                average_rating: (rated > 0).then(|| rating_sum as f64 / rated as f64),
            })
            .collect()
    }

    /// Most frequent detected emotions across all of a user's sessions.
    pub async fn top_emotions(&self, user_id: Uuid, limit: usize) -> Vec<LabelCount> {
        let state = self.state.read().await;
        let labels = state
            .user_guidance(user_id)
            .flat_map(|g| g.analysis.emotions.iter().map(|e| e.emotion.clone()));
        top_counts(labels, limit)
    }

    /// Most frequently cited sources (by display name) across a user's sessions.
    pub async fn top_sources(&self, user_id: Uuid, limit: usize) -> Vec<LabelCount> {
        let state = self.state.read().await;
        let names: HashMap<Uuid, &str> = state
            .wisdom_texts
            .iter()
            .map(|t| (t.id, t.source_display_name.as_str()))
            .collect();
        let labels = state.user_guidance(user_id).flat_map(|g| {
            g.wisdom_texts
                .iter()
                .filter_map(|id| names.get(id).map(|n| (*n).to_string()))
                .collect::<Vec<_>>()
        });
        top_counts(labels, limit)
    }

    pub async fn find_guidance_by_emotion(
        &self,
        user_id: Uuid,
        emotion: &str,
        limit: usize,
    ) -> Vec<Guidance> {
        self.newest_matching(user_id, limit, |g| g.has_emotion(emotion))
            .await
    }

    pub async fn find_guidance_by_theme(
        &self,
        user_id: Uuid,
        theme: &str,
        limit: usize,
    ) -> Vec<Guidance> {
        self.newest_matching(user_id, limit, |g| g.has_theme(theme)).await
    }

    /// Sessions that cited at least one text from `source`, newest first.
    pub async fn find_guidance_by_source(
        &self,
        user_id: Uuid,
        source: WisdomSource,
        limit: usize,
    ) -> Vec<Guidance> {
        let cited: Vec<Uuid> = {
            let state = self.state.read().await;
            let ids = state
                .wisdom_texts
                .iter()
                .filter(|t| t.source == source)
                .map(|t| t.id)
                .collect();
            ids
        };
        self.newest_matching(user_id, limit, |g| {
            g.wisdom_texts.iter().any(|id| cited.contains(id))
        })
        .await
    }

    async fn newest_matching(
        &self,
        user_id: Uuid,
        limit: usize,
        pred: impl Fn(&Guidance) -> bool,
    ) -> Vec<Guidance> {
        let state = self.state.read().await;
        let mut found: Vec<Guidance> = state
            .user_guidance(user_id)
            .filter(|g| pred(g))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        found.truncate(limit);
        found
    }

    // ---- users ----------------------------------------------------------

    pub async fn create_user(&self, new: NewUser, now: DateTime<Utc>) -> Result<User> {
        let email = normalize_email(&new.email);
        if self.user_by_email(&email).await.is_some() {
            return Err(StoreError::Conflict(
                "User already exists with this email".into(),
            ));
        }
        // Hashing is slow on purpose; keep it outside the write lock.
        let user = User::register(new, self.password_cost, now)?;
        self.mutate(|state| {
            if state.users.iter().any(|u| u.email == email) {
                return Err(StoreError::Conflict(
                    "User already exists with this email".into(),
                ));
            }
            state.users.push(user.clone());
            Ok(())
        })
        .await?;
        log::info!("Registered user {}", user.id);
        Ok(user)
    }

    pub async fn user(&self, id: Uuid) -> Result<User> {
        let state = self.state.read().await;
        state
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("user {id}")))
    }

    pub async fn user_by_email(&self, email: &str) -> Option<User> {
        let email = normalize_email(email);
        let state = self.state.read().await;
        state.users.iter().find(|u| u.email == email).cloned()
    }

    /// Apply `f` to a copy of the user; the copy replaces it only on success.
    pub async fn update_user<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut User) -> Result<T>,
    ) -> Result<T> {
        self.mutate(|state| f(state.user_mut(id)?)).await
    }

    /// Charge for an affirmation and count the retrieval in one step.
    pub async fn charge_affirmation(
        &self,
        user_id: Uuid,
        cost: u32,
        text_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<User> {
        self.mutate(|state| {
            let user = state.user_mut(user_id)?;
            user.deduct_karma(cost, "Daily affirmation", now)?;
            let charged = user.clone();
            state.increment_usage(&[text_id], now);
            Ok(charged)
        })
        .await
    }

    // ---- sessions -------------------------------------------------------

    /// New bearer token for `user_id`. Expired sessions are dropped on the way.
    pub async fn create_session(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<String> {
        let token = new_session_token()?;
        let ttl = self.session_ttl;
        self.mutate(|state| {
            let user = state.user_mut(user_id)?;
            user.last_login = Some(now);
            let before = state.sessions.len();
            state.sessions.retain(|s| s.is_live(now, ttl));
            let pruned = before - state.sessions.len();
            if pruned > 0 {
                log::debug!("Pruned {pruned} expired sessions");
            }
            state.sessions.push(Session {
                token_digest: token_digest(&token),
                user_id,
                created_at: now,
            });
            Ok(())
        })
        .await?;
        Ok(token)
    }

    /// Owner of a live session; expired tokens resolve to `None`.
    pub async fn session_user(&self, token: &str, now: DateTime<Utc>) -> Option<Uuid> {
        let digest = token_digest(token);
        let state = self.state.read().await;
        let user_id = state
            .sessions
            .iter()
            .find(|s| s.token_digest == digest && s.is_live(now, self.session_ttl))
            .map(|s| s.user_id);
        user_id
    }

    pub async fn session_count(&self) -> usize {
        self.state.read().await.sessions.len()
    }

    /// Returns whether a session was removed.
    pub async fn revoke_session(&self, token: &str) -> Result<bool> {
        let digest = token_digest(token);
        if !self
            .state
            .read()
            .await
            .sessions
            .iter()
            .any(|s| s.token_digest == digest)
        {
            return Ok(false);
        }
        self.mutate(|state| {
            let before = state.sessions.len();
            state.sessions.retain(|s| s.token_digest != digest);
            Ok(state.sessions.len() != before)
        })
        .await
    }
}

fn validate_guidance(guidance: &Guidance) -> Result<()> {
    let len = guidance.problem_text.chars().count();
    if len > PROBLEM_TEXT_MAX_CHARS {
        return Err(StoreError::Validation(format!(
            "problem text cannot exceed {PROBLEM_TEXT_MAX_CHARS} characters"
        )));
    }
    if let Some(rating) = guidance.user_rating {
        if !(1..=5).contains(&rating) {
            return Err(StoreError::InvalidRating(rating));
        }
    }
    if let Some(feedback) = &guidance.user_feedback {
        if feedback.chars().count() > FEEDBACK_MAX_CHARS {
            return Err(StoreError::Validation(format!(
                "feedback cannot exceed {FEEDBACK_MAX_CHARS} characters"
            )));
        }
    }
    Ok(())
}

/// Count labels, most frequent first; ties go to the label seen first.
fn top_counts(labels: impl Iterator<Item = String>, limit: usize) -> Vec<LabelCount> {
    let mut counts: Vec<LabelCount> = Vec::new();
    for label in labels {
        match counts.iter_mut().find(|c| c.label == label) {
            Some(entry) => entry.count += 1,
            None => counts.push(LabelCount { label, count: 1 }),
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}
