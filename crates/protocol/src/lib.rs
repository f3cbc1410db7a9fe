use anyhow::Result;
use serde::{Deserialize, Serialize};

pub mod validation;

pub use validation::{FieldError, Validator};

pub const API_VERSION: &str = "1.0.0";

/// Uniform JSON body returned by every HTTP route.
///
/// `success` is always present; `data` carries the payload on success while
/// `errors` lists per-field validation failures on a 400.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            errors: Vec::new(),
        }
    }

    pub fn ok_with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::ok(data)
        }
    }
}

impl ApiResponse<serde_json::Value> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
            errors: Vec::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            errors: Vec::new(),
        }
    }

    pub fn validation_failed(errors: Vec<FieldError>) -> Self {
        Self {
            errors,
            ..Self::failure("Validation failed")
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current: usize,
    pub pages: usize,
    pub total: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    /// `page` is 1-based; a zero limit is treated as a single empty page.
    #[must_use]
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        let page = page.max(1);
        let pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            current: page,
            pages,
            total,
            has_next: page < pages,
            has_prev: page > 1,
        }
    }

    #[must_use]
    pub fn skip(page: usize, limit: usize) -> usize {
        page.max(1).saturating_sub(1).saturating_mul(limit)
    }
}

/// Truncate to at most `max_chars` characters, appending `...` when cut.
#[must_use]
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn pagination_reports_neighbours() {
        let p = Pagination::new(2, 10, 25);
        assert_eq!(
            p,
            Pagination {
                current: 2,
                pages: 3,
                total: 25,
                has_next: true,
                has_prev: true,
            }
        );

        let last = Pagination::new(3, 10, 25);
        assert!(!last.has_next);
        assert_eq!(Pagination::skip(3, 10), 20);
        assert_eq!(Pagination::skip(0, 10), 0);
    }

    #[test]
    fn empty_pagination_has_no_pages() {
        let p = Pagination::new(1, 10, 0);
        assert_eq!(p.pages, 0);
        assert!(!p.has_next);
        assert!(!p.has_prev);
    }

    #[test]
    fn truncation_appends_ellipsis_only_when_needed() {
        assert_eq!(truncate_with_ellipsis("short", 100), "short");
        let long = "a".repeat(120);
        let cut = truncate_with_ellipsis(&long, 100);
        assert_eq!(cut.len(), 103);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn envelope_uses_camel_case_and_skips_empty_fields() {
        let resp = ApiResponse::validation_failed(vec![FieldError::new("rating", "bad")]);
        let raw = serialize_json(&resp).unwrap();
        assert!(raw.contains("\"success\":false"));
        assert!(raw.contains("\"errors\""));
        assert!(!raw.contains("\"data\""));
    }
}
