//! Authentication service: login, token refresh, password hashing

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{User, UserClaims},
    repository::Repository,
};

/// Login result: sanitized user plus both tokens
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub user: User,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate by email and password, issuing access and refresh tokens
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginData> {
        let user = self
            .repository
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

        if !user.active {
            return Err(AppError::Unauthorized("Account is inactive".to_string()));
        }

        let now = Utc::now();
        if user.is_blocked(now) {
            let until = user.blocked_until.unwrap_or(now);
            return Err(AppError::Forbidden(format!(
                "Account is blocked until {}",
                until.format("%Y-%m-%d")
            )));
        }

        if !verify_password(&user.password, password)? {
            return Err(AppError::Unauthorized("Invalid email or password".to_string()));
        }

        let token = self.issue_access_token(&user)?;
        let refresh_token = self.issue_refresh_token(&user)?;

        Ok(LoginData {
            user,
            token,
            refresh_token,
        })
    }

    /// Verify a refresh token, re-fetch the user and re-issue an access token
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<String> {
        let claims = UserClaims::from_token(refresh_token, &self.config.jwt_refresh_secret)
            .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;

        let user = self
            .repository
            .users
            .get_by_id(claims.id)
            .await
            .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;

        if !user.active {
            return Err(AppError::Unauthorized("Invalid token".to_string()));
        }

        self.issue_access_token(&user)
    }

    fn issue_access_token(&self, user: &User) -> AppResult<String> {
        let ttl = self.config.access_token_minutes * 60;
        UserClaims::new(user, ttl, Utc::now())
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    fn issue_refresh_token(&self, user: &User) -> AppResult<String> {
        let ttl = self.config.refresh_token_days * 24 * 3600;
        UserClaims::new(user, ttl, Utc::now())
            .create_token(&self.config.jwt_refresh_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored Argon2 hash
pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password(&hash, "correct horse").unwrap());
        assert!(!verify_password(&hash, "wrong horse").unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_password("same input").unwrap();
        let second = hash_password("same input").unwrap();
        assert_ne!(first, second);
    }
}
