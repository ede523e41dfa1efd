//! Authentication service
//!
//! Credential checks only: the caller passes explicit user ids to every
//! other service call, there is no ambient session state on the server.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{RegisterUser, UserSummary},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
}

impl AuthService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Verify credentials and return the user's public projection.
    /// Unknown email and wrong password both answer the same way.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<UserSummary> {
        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("invalid credentials".to_string()))?;

        let parsed = PasswordHash::new(&user.password_hash)
            .map_err(|e| AppError::Internal(format!("stored password hash is invalid: {}", e)))?;

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| AppError::Unauthorized("invalid credentials".to_string()))?;

        Ok(user.into())
    }

    /// Register a new user with an argon2-hashed password
    pub async fn register(&self, input: RegisterUser) -> AppResult<UserSummary> {
        input.validate()?;

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("password hashing failed: {}", e)))?
            .to_string();

        let user = self
            .repository
            .users
            .create(&input.username, &input.email, &hash)
            .await?;

        Ok(user.into())
    }

    /// Get a user's public projection by id
    pub async fn get_user(&self, user_id: i32) -> AppResult<UserSummary> {
        Ok(self.repository.users.get_by_id(user_id).await?.into())
    }
}
