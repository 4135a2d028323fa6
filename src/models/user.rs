//! User model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::ListParams;

/// User categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Student,
    Professor,
    Technician,
}

/// Full user model from database
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub registration_number: String,
    pub user_type: UserType,
    pub lab_link: Option<String>,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub fine_count: i32,
    pub active: bool,
    pub blocked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the user currently has a lending block in effect
    pub fn is_blocked(&self, now: DateTime<Utc>) -> bool {
        self.blocked_until.map(|until| until > now).unwrap_or(false)
    }
}

/// Short user representation embedded in loan/fine/reservation rows
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserShort {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub registration_number: String,
}

/// User list query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_type: Option<UserType>,
    pub active: Option<bool>,
    /// Only users with a block currently in effect
    pub blocked: Option<bool>,
    /// Substring match on name, email or registration number
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

const SORTABLE: &[(&str, &str)] = &[
    ("id", "id"),
    ("name", "name"),
    ("email", "email"),
    ("registrationNumber", "registration_number"),
    ("userType", "user_type"),
    ("fineCount", "fine_count"),
    ("createdAt", "created_at"),
];

impl UserQuery {
    pub fn list_params(&self) -> ListParams {
        ListParams::new(
            self.page,
            self.limit,
            self.sort_by.as_deref(),
            self.sort_order.as_deref(),
            SORTABLE,
        )
    }
}

/// Create user request
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Registration number is required"))]
    pub registration_number: String,
    pub user_type: UserType,
    pub lab_link: Option<String>,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    #[serde(skip_serializing)]
    pub password: String,
}

/// Update user request
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "Registration number cannot be empty"))]
    pub registration_number: Option<String>,
    pub user_type: Option<UserType>,
    pub lab_link: Option<String>,
    pub active: Option<bool>,
    /// Present-and-null clears the block; absent leaves it unchanged
    #[serde(default, deserialize_with = "crate::models::deserialize_explicit_null")]
    pub blocked_until: Option<Option<DateTime<Utc>>>,
}

/// JWT claims carried by both access and refresh tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub id: i32,
    pub email: String,
    pub user_type: UserType,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Build claims for a user with the given lifetime
    pub fn new(user: &User, ttl_seconds: i64, now: DateTime<Utc>) -> Self {
        let iat = now.timestamp();
        Self {
            sub: user.email.clone(),
            id: user.id,
            email: user.email.clone(),
            user_type: user.user_type,
            exp: iat + ttl_seconds,
            iat,
        }
    }

    /// Sign a JWT token with the given secret
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse and verify a JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    /// Technicians and professors may perform write operations
    pub fn require_staff(&self) -> AppResult<()> {
        match self.user_type {
            UserType::Technician | UserType::Professor => Ok(()),
            UserType::Student => Err(AppError::Forbidden(
                "Technician or professor role required".to_string(),
            )),
        }
    }

    /// Destructive and administrative operations require a technician
    pub fn require_technician(&self) -> AppResult<()> {
        if self.user_type == UserType::Technician {
            Ok(())
        } else {
            Err(AppError::Forbidden("Technician role required".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(user_type: UserType) -> User {
        User {
            id: 7,
            name: "Ada".to_string(),
            email: "ada@lab.example".to_string(),
            registration_number: "2024-001".to_string(),
            user_type,
            lab_link: None,
            password: "hash".to_string(),
            fine_count: 0,
            active: true,
            blocked_until: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn claims_round_trip() {
        let user = sample_user(UserType::Professor);
        let claims = UserClaims::new(&user, 3600, Utc::now());
        let token = claims.create_token("test-secret").unwrap();
        let decoded = UserClaims::from_token(&token, "test-secret").unwrap();
        assert_eq!(decoded.id, 7);
        assert_eq!(decoded.email, "ada@lab.example");
        assert_eq!(decoded.user_type, UserType::Professor);
    }

    #[test]
    fn claims_reject_wrong_secret() {
        let user = sample_user(UserType::Student);
        let claims = UserClaims::new(&user, 3600, Utc::now());
        let token = claims.create_token("access-secret").unwrap();
        assert!(UserClaims::from_token(&token, "refresh-secret").is_err());
    }

    #[test]
    fn expired_claims_are_rejected() {
        let user = sample_user(UserType::Student);
        let claims = UserClaims::new(&user, -3600, Utc::now());
        let token = claims.create_token("test-secret").unwrap();
        assert!(UserClaims::from_token(&token, "test-secret").is_err());
    }

    #[test]
    fn role_checks_follow_user_type() {
        let user = sample_user(UserType::Student);
        let student = UserClaims::new(&user, 3600, Utc::now());
        assert!(student.require_staff().is_err());
        assert!(student.require_technician().is_err());

        let user = sample_user(UserType::Professor);
        let professor = UserClaims::new(&user, 3600, Utc::now());
        assert!(professor.require_staff().is_ok());
        assert!(professor.require_technician().is_err());

        let user = sample_user(UserType::Technician);
        let technician = UserClaims::new(&user, 3600, Utc::now());
        assert!(technician.require_staff().is_ok());
        assert!(technician.require_technician().is_ok());
    }

    #[test]
    fn block_check_uses_current_time() {
        let mut user = sample_user(UserType::Student);
        let now = Utc::now();
        assert!(!user.is_blocked(now));

        user.blocked_until = Some(now + chrono::Duration::days(7));
        assert!(user.is_blocked(now));

        user.blocked_until = Some(now - chrono::Duration::days(1));
        assert!(!user.is_blocked(now));
    }
}
