use mindverse_protocol::FieldError;
use mindverse_store::StoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GuidanceError>;

#[derive(Error, Debug)]
pub enum GuidanceError {
    #[error("Store error: {0}")]
    Store(StoreError),

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    NotFound(String),

    #[error("Insufficient karma: required {required}, current {current}")]
    InsufficientKarma { required: u32, current: u32 },

    #[error("No daily affirmations available")]
    NoAffirmations,
}

impl GuidanceError {
    pub fn field(field: &str, message: &str) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }
}

impl From<StoreError> for GuidanceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InsufficientKarma {
                required,
                available,
            } => Self::InsufficientKarma {
                required,
                current: available,
            },
            StoreError::InvalidRating(_) => {
                Self::field("rating", "Rating must be between 1 and 5")
            }
            StoreError::Validation(message) => Self::field("body", &message),
            other => Self::Store(other),
        }
    }
}
