use crate::{Result, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const CONTEXT_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WisdomSource {
    BhagavadGita,
    Quran,
    Bible,
    Dhammapada,
    TaoTeChing,
    GuruGranthSahib,
    Upanishads,
    Ramayana,
    Mahabharata,
    YogaSutras,
    Tripitaka,
    Torah,
    Talmud,
    Hadith,
    Avesta,
    BookOfMormon,
}

impl WisdomSource {
    pub const ALL: [WisdomSource; 16] = [
        Self::BhagavadGita,
        Self::Quran,
        Self::Bible,
        Self::Dhammapada,
        Self::TaoTeChing,
        Self::GuruGranthSahib,
        Self::Upanishads,
        Self::Ramayana,
        Self::Mahabharata,
        Self::YogaSutras,
        Self::Tripitaka,
        Self::Torah,
        Self::Talmud,
        Self::Hadith,
        Self::Avesta,
        Self::BookOfMormon,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BhagavadGita => "bhagavad_gita",
            Self::Quran => "quran",
            Self::Bible => "bible",
            Self::Dhammapada => "dhammapada",
            Self::TaoTeChing => "tao_te_ching",
            Self::GuruGranthSahib => "guru_granth_sahib",
            Self::Upanishads => "upanishads",
            Self::Ramayana => "ramayana",
            Self::Mahabharata => "mahabharata",
            Self::YogaSutras => "yoga_sutras",
            Self::Tripitaka => "tripitaka",
            Self::Torah => "torah",
            Self::Talmud => "talmud",
            Self::Hadith => "hadith",
            Self::Avesta => "avesta",
            Self::BookOfMormon => "book_of_mormon",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::BhagavadGita => "Bhagavad Gita",
            Self::Quran => "Holy Quran",
            Self::Bible => "Holy Bible",
            Self::Dhammapada => "Dhammapada",
            Self::TaoTeChing => "Tao Te Ching",
            Self::GuruGranthSahib => "Guru Granth Sahib",
            Self::Upanishads => "Upanishads",
            Self::Ramayana => "Ramayana",
            Self::Mahabharata => "Mahabharata",
            Self::YogaSutras => "Yoga Sutras",
            Self::Tripitaka => "Tripitaka",
            Self::Torah => "Torah",
            Self::Talmud => "Talmud",
            Self::Hadith => "Hadith",
            Self::Avesta => "Avesta",
            Self::BookOfMormon => "Book of Mormon",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let needle = raw.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|s| s.as_str() == needle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tradition {
    Hinduism,
    Islam,
    Christianity,
    Buddhism,
    Judaism,
    Sikhism,
    Taoism,
    Zoroastrianism,
}

impl Tradition {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hinduism => "hinduism",
            Self::Islam => "islam",
            Self::Christianity => "christianity",
            Self::Buddhism => "buddhism",
            Self::Judaism => "judaism",
            Self::Sikhism => "sikhism",
            Self::Taoism => "taoism",
            Self::Zoroastrianism => "zoroastrianism",
        }
    }
}

/// Language a scripture was originally written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptLanguage {
    Sanskrit,
    Arabic,
    Hebrew,
    Pali,
    Chinese,
    Punjabi,
    Avestan,
    Greek,
    Aramaic,
}

/// Language a reader receives translations in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    English,
    Hindi,
    Spanish,
    French,
    German,
    Arabic,
    Sanskrit,
    Urdu,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translations {
    pub english: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hindi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spanish: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub french: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub german: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arabic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sanskrit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urdu: Option<String>,
}

impl Translations {
    /// The requested translation, english when it is missing.
    pub fn get(&self, language: Language) -> &str {
        let picked = match language {
            Language::English => None,
            Language::Hindi => self.hindi.as_deref(),
            Language::Spanish => self.spanish.as_deref(),
            Language::French => self.french.as_deref(),
            Language::German => self.german.as_deref(),
            Language::Arabic => self.arabic.as_deref(),
            Language::Sanskrit => self.sanskrit.as_deref(),
            Language::Urdu => self.urdu.as_deref(),
        };
        picked.unwrap_or(&self.english)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionalKeyword {
    pub emotion: String,
    #[serde(default = "default_relevance")]
    pub relevance_score: u8,
}

fn default_relevance() -> u8 {
    5
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    pub times_retrieved: u64,
    pub average_rating: f64,
    pub total_ratings: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextLength {
    Short,
    #[default]
    Medium,
    Long,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    #[default]
    Verified,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WisdomText {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub source: WisdomSource,
    pub source_display_name: String,
    pub tradition: Tradition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verse: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub original_text: String,
    pub original_language: ScriptLanguage,
    pub translations: Translations,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub situation: Option<String>,
    #[serde(default)]
    pub primary_themes: Vec<String>,
    #[serde(default)]
    pub emotional_keywords: Vec<EmotionalKeyword>,
    #[serde(default)]
    pub problem_categories: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub usage: Usage,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub length: TextLength,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub verification_status: VerificationStatus,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl WisdomText {
    /// Minimal active text; the remaining fields take their defaults.
    pub fn new(
        source: WisdomSource,
        tradition: Tradition,
        original_language: ScriptLanguage,
        original_text: impl Into<String>,
        english: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            source,
            source_display_name: source.display_name().to_string(),
            tradition,
            book: None,
            chapter: None,
            verse: None,
            section: None,
            original_text: original_text.into(),
            original_language,
            translations: Translations {
                english: english.into(),
                ..Translations::default()
            },
            speaker: None,
            audience: None,
            context: None,
            situation: None,
            primary_themes: Vec::new(),
            emotional_keywords: Vec::new(),
            problem_categories: Vec::new(),
            keywords: Vec::new(),
            usage: Usage::default(),
            difficulty: Difficulty::default(),
            length: TextLength::default(),
            is_active: true,
            verification_status: VerificationStatus::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// "Bhagavad Gita, Chapter 2, Chapter 2, Verse 47" style reference.
    pub fn full_reference(&self) -> String {
        let mut reference = self.source_display_name.clone();
        if let Some(book) = non_empty(&self.book) {
            reference.push_str(&format!(", {book}"));
        }
        if let Some(chapter) = non_empty(&self.chapter) {
            reference.push_str(&format!(", Chapter {chapter}"));
        }
        if let Some(verse) = non_empty(&self.verse) {
            reference.push_str(&format!(", Verse {verse}"));
        }
        reference
    }

    pub fn contextual_attribution(&self) -> String {
        match (non_empty(&self.speaker), non_empty(&self.audience)) {
            (Some(speaker), Some(audience)) => format!("{speaker} to {audience}"),
            (Some(speaker), None) => format!("Words of {speaker}"),
            _ => format!("From {}", self.source_display_name),
        }
    }

    pub fn translation(&self, language: Language) -> &str {
        self.translations.get(language)
    }

    pub fn has_emotion(&self, emotion: &str) -> bool {
        self.emotion_relevance(emotion).is_some()
    }

    pub fn emotion_relevance(&self, emotion: &str) -> Option<u8> {
        self.emotional_keywords
            .iter()
            .find(|k| k.emotion == emotion)
            .map(|k| k.relevance_score)
    }

    pub fn increment_usage(&mut self, now: DateTime<Utc>) {
        self.usage.times_retrieved += 1;
        self.usage.last_used = Some(now);
        self.updated_at = now;
    }

    pub fn add_rating(&mut self, rating: u8) -> Result<()> {
        if !(1..=5).contains(&rating) {
            return Err(StoreError::InvalidRating(rating));
        }
        let current_total = self.usage.average_rating * self.usage.total_ratings as f64;
        self.usage.total_ratings += 1;
        self.usage.average_rating =
            (current_total + f64::from(rating)) / self.usage.total_ratings as f64;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.translations.english.trim().is_empty() {
            return Err(StoreError::Validation(
                "english translation is required".into(),
            ));
        }
        if self.original_text.trim().is_empty() {
            return Err(StoreError::Validation("original text is required".into()));
        }
        if let Some(context) = &self.context {
            if context.chars().count() > CONTEXT_MAX_CHARS {
                return Err(StoreError::Validation(format!(
                    "context cannot exceed {CONTEXT_MAX_CHARS} characters"
                )));
            }
        }
        if let Some(bad) = self
            .emotional_keywords
            .iter()
            .find(|k| !(1..=10).contains(&k.relevance_score))
        {
            return Err(StoreError::Validation(format!(
                "relevance score for '{}' must be between 1 and 10",
                bad.emotion
            )));
        }
        if !(0.0..=5.0).contains(&self.usage.average_rating) {
            return Err(StoreError::Validation(
                "average rating must be between 0 and 5".into(),
            ));
        }
        Ok(())
    }
}

/// Wire form: the stored text plus its derived reference and attribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WisdomView {
    #[serde(flatten)]
    pub text: WisdomText,
    pub full_reference: String,
    pub contextual_attribution: String,
}

impl From<WisdomText> for WisdomView {
    fn from(text: WisdomText) -> Self {
        Self {
            full_reference: text.full_reference(),
            contextual_attribution: text.contextual_attribution(),
            text,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
