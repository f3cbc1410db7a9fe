use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("valid email regex")
});

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Accumulates field errors so a request reports every problem at once.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Character length (not bytes) within `min..=max`, measured after trimming.
    pub fn length(
        &mut self,
        field: &str,
        value: &str,
        min: usize,
        max: usize,
        message: &str,
    ) -> &mut Self {
        let len = value.trim().chars().count();
        if len < min || len > max {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    pub fn max_length(&mut self, field: &str, value: &str, max: usize, message: &str) -> &mut Self {
        self.length(field, value, 0, max, message)
    }

    pub fn range(
        &mut self,
        field: &str,
        value: i64,
        min: i64,
        max: i64,
        message: &str,
    ) -> &mut Self {
        if value < min || value > max {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if !is_valid_email(value) {
            self.errors
                .push(FieldError::new(field, "Please enter a valid email"));
        }
        self
    }

    pub fn check(&mut self, ok: bool, field: &str, message: &str) -> &mut Self {
        if !ok {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(std::mem::take(&mut self.errors))
        }
    }
}

#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_every_failure() {
        let mut v = Validator::new();
        v.length("problemText", "  short ", 10, 2000, "too short")
            .range("rating", 7, 1, 5, "bad rating")
            .email("email", "not-an-email");
        let errors = v.finish().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["problemText", "rating", "email"]);
    }

    #[test]
    fn length_counts_characters_after_trim() {
        let mut v = Validator::new();
        v.length("text", "   ääääääääää   ", 10, 10, "len");
        assert!(v.finish().is_ok());
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("seeker@example.com"));
        assert!(is_valid_email("first.last@mail.example.org"));
        assert!(!is_valid_email("seeker@"));
        assert!(!is_valid_email("seeker example.com"));
    }
}
