//! Comment (review) model for the document store
//!
//! Comments live in MongoDB with a lifecycle independent of the relational
//! data: no foreign-key enforcement, and a comment referencing a deleted book
//! or user is tolerated. Document ids are opaque strings at the API boundary
//! and must round-trip exactly in update/delete calls.

use chrono::{DateTime, Utc};
use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Comment document as stored in the `comments` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentDoc {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub book_id: i32,
    pub user_id: i32,
    pub text: String,
    pub rating: i32,
    pub created_at: BsonDateTime,
    pub updated_at: Option<BsonDateTime>,
}

/// Comment projection for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Comment {
    /// Opaque document id (hex string)
    pub id: String,
    pub book_id: i32,
    pub user_id: i32,
    pub text: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<CommentDoc> for Comment {
    fn from(doc: CommentDoc) -> Self {
        Self {
            id: doc.id.to_hex(),
            book_id: doc.book_id,
            user_id: doc.user_id,
            text: doc.text,
            rating: doc.rating,
            created_at: doc.created_at.to_chrono(),
            updated_at: doc.updated_at.map(|d| d.to_chrono()),
        }
    }
}

/// New comment payload. Rating bounds are enforced here, at the boundary,
/// not by the store.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CommentInput {
    pub book_id: i32,
    pub user_id: i32,
    #[validate(length(min = 1, message = "comment text must not be empty"))]
    pub text: String,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i32,
}

/// Comment update payload (text and rating only; the modification timestamp
/// is stamped server-side)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CommentUpdate {
    #[validate(length(min = 1, message = "comment text must not be empty"))]
    pub text: String,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i32,
}

/// Parse an opaque comment id back into its document id
pub fn parse_comment_id(id: &str) -> AppResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| AppError::Validation(format!("invalid comment id: {}", id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_id_round_trips_exactly() {
        let oid = ObjectId::new();
        let hex = oid.to_hex();
        assert_eq!(parse_comment_id(&hex).unwrap(), oid);
    }

    #[test]
    fn malformed_comment_id_is_a_validation_error() {
        assert!(matches!(
            parse_comment_id("not-a-hex-id"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn rating_bounds_are_enforced() {
        let mut input = CommentInput {
            book_id: 1,
            user_id: 7,
            text: "Un classique.".to_string(),
            rating: 5,
        };
        assert!(input.validate().is_ok());

        input.rating = 0;
        assert!(input.validate().is_err());
        input.rating = 6;
        assert!(input.validate().is_err());
    }

    #[test]
    fn empty_text_is_rejected() {
        let input = CommentInput {
            book_id: 1,
            user_id: 7,
            text: String::new(),
            rating: 3,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn projection_exposes_hex_id_and_chrono_dates() {
        let doc = CommentDoc {
            id: ObjectId::new(),
            book_id: 1,
            user_id: 7,
            text: "Relu trois fois.".to_string(),
            rating: 4,
            created_at: BsonDateTime::now(),
            updated_at: None,
        };
        let expected_id = doc.id.to_hex();
        let comment = Comment::from(doc);
        assert_eq!(comment.id, expected_id);
        assert!(comment.updated_at.is_none());
    }
}
