use crate::password::{hash_password, verify_password};
use crate::wisdom::{Language, WisdomSource};
use crate::{Result, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const WELCOME_KARMA: u32 = 150;
pub const NAME_MAX_CHARS: usize = 50;
pub const PASSWORD_MIN_CHARS: usize = 8;
pub const NOTES_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KarmaKind {
    Earned,
    Spent,
    Purchased,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KarmaTransaction {
    pub kind: KarmaKind,
    /// Signed: spending is recorded as a negative amount.
    pub amount: i64,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiTheme {
    Light,
    Dark,
    #[default]
    Auto,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub preferred_wisdom_texts: Vec<WisdomSource>,
    #[serde(default)]
    pub theme: UiTheme,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionCount {
    pub emotion: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextCount {
    pub text: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyStats {
    pub total_problems_shared: u32,
    pub total_guidance_received: u32,
    #[serde(default)]
    pub favorite_emotions: Vec<EmotionCount>,
    #[serde(default)]
    pub most_used_texts: Vec<TextCount>,
    pub last_active_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGuidance {
    pub guidance_id: Uuid,
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub personal_notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub karma_balance: u32,
    pub total_karma_earned: u64,
    pub total_karma_spent: u64,
    #[serde(default)]
    pub karma_transactions: Vec<KarmaTransaction>,
    #[serde(default)]
    pub preferences: Preferences,
    pub journey_stats: JourneyStats,
    #[serde(default)]
    pub saved_guidance: Vec<SavedGuidance>,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What a user may see about themselves; never carries credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub karma_balance: u32,
    pub total_karma_earned: u64,
    pub total_karma_spent: u64,
    pub preferences: Preferences,
    pub journey_stats: JourneyStats,
    pub saved_guidance_count: usize,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl User {
    /// Fresh account with the welcome karma recorded as an `earned` transaction.
    pub fn register(new: NewUser, password_cost: u32, now: DateTime<Utc>) -> Result<Self> {
        let password_hash = hash_password(&new.password, password_cost)?;
        Ok(Self {
            id: Uuid::new_v4(),
            first_name: new.first_name.trim().to_string(),
            last_name: new.last_name.trim().to_string(),
            email: normalize_email(&new.email),
            password_hash,
            karma_balance: WELCOME_KARMA,
            total_karma_earned: u64::from(WELCOME_KARMA),
            total_karma_spent: 0,
            karma_transactions: vec![KarmaTransaction {
                kind: KarmaKind::Earned,
                amount: i64::from(WELCOME_KARMA),
                description: "Welcome bonus".to_string(),
                timestamp: now,
            }],
            preferences: Preferences::default(),
            journey_stats: JourneyStats {
                total_problems_shared: 0,
                total_guidance_received: 0,
                favorite_emotions: Vec::new(),
                most_used_texts: Vec::new(),
                last_active_date: now,
            },
            saved_guidance: Vec::new(),
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn check_password(&self, candidate: &str) -> bool {
        verify_password(candidate, &self.password_hash)
    }

    pub fn has_karma(&self, amount: u32) -> bool {
        self.karma_balance >= amount
    }

    pub fn deduct_karma(
        &mut self,
        amount: u32,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if !self.has_karma(amount) {
            return Err(StoreError::InsufficientKarma {
                required: amount,
                available: self.karma_balance,
            });
        }
        self.karma_balance -= amount;
        self.total_karma_spent += u64::from(amount);
        self.karma_transactions.push(KarmaTransaction {
            kind: KarmaKind::Spent,
            amount: -i64::from(amount),
            description: description.into(),
            timestamp: now,
        });
        self.updated_at = now;
        Ok(())
    }

    pub fn add_karma(
        &mut self,
        amount: u32,
        description: impl Into<String>,
        kind: KarmaKind,
        now: DateTime<Utc>,
    ) {
        self.karma_balance = self.karma_balance.saturating_add(amount);
        if kind == KarmaKind::Earned {
            self.total_karma_earned += u64::from(amount);
        }
        self.karma_transactions.push(KarmaTransaction {
            kind,
            amount: i64::from(amount),
            description: description.into(),
            timestamp: now,
        });
        self.updated_at = now;
    }

    pub fn record_problem_shared(&mut self, now: DateTime<Utc>) {
        self.journey_stats.total_problems_shared += 1;
        self.journey_stats.last_active_date = now;
    }

    pub fn record_guidance_received(
        &mut self,
        emotion: Option<&str>,
        text: Option<&str>,
        now: DateTime<Utc>,
    ) {
        let stats = &mut self.journey_stats;
        stats.total_guidance_received += 1;
        if let Some(emotion) = emotion {
            match stats.favorite_emotions.iter_mut().find(|e| e.emotion == emotion) {
                Some(entry) => entry.count += 1,
                None => stats.favorite_emotions.push(EmotionCount {
                    emotion: emotion.to_string(),
                    count: 1,
                }),
            }
        }
        if let Some(text) = text {
            match stats.most_used_texts.iter_mut().find(|t| t.text == text) {
                Some(entry) => entry.count += 1,
                None => stats.most_used_texts.push(TextCount {
                    text: text.to_string(),
                    count: 1,
                }),
            }
        }
        stats.last_active_date = now;
    }

    /// Upserts: saving an already-saved guidance replaces its tags and notes.
    pub fn save_guidance(
        &mut self,
        guidance_id: Uuid,
        tags: Vec<String>,
        personal_notes: String,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if personal_notes.chars().count() > NOTES_MAX_CHARS {
            return Err(StoreError::Validation(format!(
                "personal notes cannot exceed {NOTES_MAX_CHARS} characters"
            )));
        }
        match self
            .saved_guidance
            .iter_mut()
            .find(|s| s.guidance_id == guidance_id)
        {
            Some(existing) => {
                existing.tags = tags;
                existing.personal_notes = personal_notes;
            }
            None => self.saved_guidance.push(SavedGuidance {
                guidance_id,
                saved_at: now,
                tags,
                personal_notes,
            }),
        }
        self.updated_at = now;
        Ok(())
    }

    /// Returns whether anything was removed.
    pub fn unsave_guidance(&mut self, guidance_id: Uuid, now: DateTime<Utc>) -> bool {
        let before = self.saved_guidance.len();
        self.saved_guidance.retain(|s| s.guidance_id != guidance_id);
        let removed = self.saved_guidance.len() != before;
        if removed {
            self.updated_at = now;
        }
        removed
    }

    pub fn is_saved(&self, guidance_id: Uuid) -> bool {
        self.saved_guidance.iter().any(|s| s.guidance_id == guidance_id)
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            full_name: self.full_name(),
            email: self.email.clone(),
            karma_balance: self.karma_balance,
            total_karma_earned: self.total_karma_earned,
            total_karma_spent: self.total_karma_spent,
            preferences: self.preferences.clone(),
            journey_stats: self.journey_stats.clone(),
            saved_guidance_count: self.saved_guidance.len(),
            last_login: self.last_login,
            created_at: self.created_at,
        }
    }
}

#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::MIN_PASSWORD_COST;
    use pretty_assertions::assert_eq;

    fn new_user(email: &str) -> User {
        User::register(
            NewUser {
                first_name: " Arjuna ".into(),
                last_name: "Pandava".into(),
                email: email.into(),
                password: "dharma-first".into(),
            },
            MIN_PASSWORD_COST,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn register_grants_welcome_karma() {
        let user = new_user("Arjuna@Example.COM ");
        assert_eq!(user.email, "arjuna@example.com");
        assert_eq!(user.full_name(), "Arjuna Pandava");
        assert_eq!(user.karma_balance, WELCOME_KARMA);
        assert_eq!(user.karma_transactions.len(), 1);
        assert_eq!(user.karma_transactions[0].kind, KarmaKind::Earned);
        assert!(user.check_password("dharma-first"));
        assert!(!user.check_password("dharma-second"));
    }

    #[test]
    fn deduct_karma_refuses_to_go_negative() {
        let mut user = new_user("a@b.co");
        let now = Utc::now();
        user.deduct_karma(140, "Guidance session", now).unwrap();
        assert_eq!(user.karma_balance, 10);
        let err = user.deduct_karma(15, "Guidance session", now).unwrap_err();
        assert!(matches!(
            err,
            StoreError::InsufficientKarma {
                required: 15,
                available: 10
            }
        ));
        assert_eq!(user.karma_balance, 10);
        assert_eq!(user.total_karma_spent, 140);
        assert_eq!(user.karma_transactions.last().unwrap().amount, -140);
    }

    #[test]
    fn purchased_karma_does_not_count_as_earned() {
        let mut user = new_user("a@b.co");
        user.add_karma(50, "Top up", KarmaKind::Purchased, Utc::now());
        assert_eq!(user.karma_balance, 200);
        assert_eq!(user.total_karma_earned, u64::from(WELCOME_KARMA));
    }

    #[test]
    fn journey_stats_count_emotions_and_texts() {
        let mut user = new_user("a@b.co");
        let now = Utc::now();
        user.record_problem_shared(now);
        user.record_guidance_received(Some("anxious"), Some("Bhagavad Gita"), now);
        user.record_guidance_received(Some("anxious"), Some("Torah"), now);
        user.record_guidance_received(None, None, now);

        let stats = &user.journey_stats;
        assert_eq!(stats.total_problems_shared, 1);
        assert_eq!(stats.total_guidance_received, 3);
        assert_eq!(
            stats.favorite_emotions,
            vec![EmotionCount {
                emotion: "anxious".into(),
                count: 2
            }]
        );
        assert_eq!(stats.most_used_texts.len(), 2);
    }

    #[test]
    fn save_guidance_upserts_and_unsave_removes() {
        let mut user = new_user("a@b.co");
        let id = Uuid::new_v4();
        let now = Utc::now();
        user.save_guidance(id, vec!["work".into()], "first".into(), now)
            .unwrap();
        user.save_guidance(id, vec!["calm".into()], "second".into(), now)
            .unwrap();
        assert_eq!(user.saved_guidance.len(), 1);
        assert_eq!(user.saved_guidance[0].personal_notes, "second");

        let too_long = "x".repeat(NOTES_MAX_CHARS + 1);
        assert!(user.save_guidance(id, Vec::new(), too_long, now).is_err());

        assert!(user.unsave_guidance(id, now));
        assert!(!user.unsave_guidance(id, now));
    }

    #[test]
    fn profile_hides_credentials() {
        let json = serde_json::to_value(new_user("a@b.co").profile()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["fullName"], "Arjuna Pandava");
    }
}
