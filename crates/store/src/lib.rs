//! Document store for the wisdom corpus, users, sessions and guidance history.
//!
//! Everything lives in one JSON snapshot guarded by an async `RwLock`.
//! Multi-record operations (charging karma while recording a session, rating
//! guidance and its cited texts) happen under a single write lock, so a
//! failure never leaves half of the change behind.

pub mod error;
pub mod guidance;
pub mod password;
pub mod query;
pub mod seed;
pub mod store;
pub mod user;
pub mod wisdom;

pub use error::{Result, StoreError};
pub use guidance::{
    AdditionalWisdom, Guidance, GuidanceContent, GuidanceMetadata, GuidanceSummary, LabelCount,
    MonthlyStat, UserGuidanceStats, WisdomReference, FEEDBACK_MAX_CHARS, PROBLEM_TEXT_MAX_CHARS,
};
pub use query::{WisdomFilter, WisdomQuery, WisdomSort, DEFAULT_FIND_LIMIT};
pub use password::{DEFAULT_PASSWORD_COST, MIN_PASSWORD_COST};
pub use seed::seed_corpus;
pub use store::{
    CorpusSummary, GuidancePage, GuidanceSession, Session, Store, DEFAULT_SESSION_TTL_HOURS,
};
pub use user::{
    KarmaKind, KarmaTransaction, NewUser, Preferences, SavedGuidance, UiTheme, User, UserProfile,
    NAME_MAX_CHARS, NOTES_MAX_CHARS, PASSWORD_MIN_CHARS, WELCOME_KARMA,
};
pub use wisdom::{
    EmotionalKeyword, Language, ScriptLanguage, Tradition, Translations, Usage, WisdomSource,
    WisdomText, WisdomView,
};
