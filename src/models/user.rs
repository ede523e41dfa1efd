//! User model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// User model from database. The password hash never leaves the server.
#[derive(Debug, Clone, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub registered_at: DateTime<Utc>,
}

/// Public user projection for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub registered_at: DateTime<Utc>,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            registered_at: user.registered_at,
        }
    }
}

/// Registration payload
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUser {
    #[validate(length(min = 2, message = "username must be at least 2 characters"))]
    pub username: String,
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_drops_the_password_hash() {
        let user = User {
            id: 7,
            username: "lecteur".to_string(),
            email: "lecteur@example.org".to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$hash".to_string(),
            registered_at: Utc::now(),
        };
        let summary = UserSummary::from(user.clone());
        assert_eq!(summary.id, user.id);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("argon2id"));
    }

    #[test]
    fn registration_rejects_malformed_email() {
        let input = RegisterUser {
            username: "lecteur".to_string(),
            email: "not-an-email".to_string(),
            password: "correct-horse".to_string(),
        };
        assert!(input.validate().is_err());
    }
}
