use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Category entity - groups posts under a URL slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub slug: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// Create a published category. Fails if `slug` is not URL-safe.
    pub fn new(title: String, description: String, slug: String) -> Result<Self, DomainError> {
        if !is_valid_slug(&slug) {
            return Err(DomainError::Validation(format!(
                "'{slug}' is not a valid slug: use letters, numbers, underscores or hyphens"
            )));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            title,
            description,
            slug,
            is_published: true,
            created_at: Utc::now(),
        })
    }
}

/// Slugs are non-empty runs of ASCII letters, digits, `-` and `_`.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_rules() {
        assert!(is_valid_slug("travel"));
        assert!(is_valid_slug("road-trips_2024"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("with space"));
        assert!(!is_valid_slug("путешествия"));
    }

    #[test]
    fn test_new_rejects_bad_slug() {
        let result = Category::new("Travel".into(), "Trips".into(), "a/b".into());
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
}
