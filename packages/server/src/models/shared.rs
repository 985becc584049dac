use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AppError;

/// Pagination metadata included in list responses.
#[derive(Serialize, utoipa::ToSchema)]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 20)]
    pub per_page: u64,
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Total number of pages.
    #[schema(example = 3)]
    pub total_pages: u64,
}

/// Result of a like toggle: the new state and the recounted total.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LikeResponse {
    pub liked: bool,
    #[schema(example = 12)]
    pub like_count: u64,
}

/// Plain page/per_page query parameters for listings without extra filters.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Serde helper for PATCH semantics on nullable fields.
///
/// * JSON field absent  => `None`          (don't update)
/// * JSON field = null  => `Some(None)`    (set to NULL)
/// * JSON field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Validate a trimmed title/subject (1-256 Unicode characters).
pub fn validate_title(title: &str, what: &str) -> Result<(), AppError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 256 {
        return Err(AppError::Validation(format!(
            "{what} must be 1-256 characters"
        )));
    }
    Ok(())
}

/// Validate free-form body text (non-empty after trimming, bounded size).
pub fn validate_body(text: &str, what: &str, max_len: usize) -> Result<(), AppError> {
    if text.trim().is_empty() || text.len() > max_len {
        return Err(AppError::Validation(format!(
            "{what} must be non-empty and at most {max_len} bytes"
        )));
    }
    Ok(())
}
