//! Book (catalog entry) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Book availability state.
///
/// Maintained by the loan lifecycle: a book is `Available` iff no loan on it
/// has a NULL returned date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "availability", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Borrowed,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Available => "available",
            Availability::Borrowed => "borrowed",
        }
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub category_id: Option<i32>,
    pub availability: Availability,
}

/// Book row for search results and listings, with the category label joined in
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookSummary {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub availability: Availability,
    pub category_name: Option<String>,
}

/// Create/update payload for catalog management
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BookInput {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "author must not be empty"))]
    pub author: String,
    pub category_id: Option<i32>,
}

/// Free-text search filters. Each filter is applied only when provided;
/// filters are AND-composed, text matches are case-insensitive substrings.
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookSearch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub category_id: Option<i32>,
    pub availability: Option<Availability>,
}

impl BookSearch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.category_id.is_none()
            && self.availability.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Availability::Available).unwrap(),
            "\"available\""
        );
        assert_eq!(
            serde_json::to_string(&Availability::Borrowed).unwrap(),
            "\"borrowed\""
        );
    }

    #[test]
    fn empty_search_has_no_filters() {
        assert!(BookSearch::default().is_empty());
        let search = BookSearch {
            title: Some("prince".to_string()),
            ..Default::default()
        };
        assert!(!search.is_empty());
    }

    #[test]
    fn book_input_rejects_empty_title() {
        let input = BookInput {
            title: String::new(),
            author: "Antoine de Saint-Exupéry".to_string(),
            category_id: None,
        };
        assert!(input.validate().is_err());
    }
}
