//! Users service

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateUser, User, UserQuery},
    repository::Repository,
    services::auth::hash_password,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn list(&self, query: &UserQuery) -> AppResult<(Vec<User>, i64)> {
        self.repository.users.search(query).await
    }

    /// Create a user, hashing the password before it reaches storage
    pub async fn create(&self, user: &CreateUser) -> AppResult<User> {
        if self.repository.users.email_exists(&user.email, None).await? {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
        if self
            .repository
            .users
            .registration_number_exists(&user.registration_number, None)
            .await?
        {
            return Err(AppError::Conflict(
                "Registration number already registered".to_string(),
            ));
        }

        let password_hash = hash_password(&user.password)?;
        self.repository.users.create(user, &password_hash).await
    }

    pub async fn update(&self, id: i32, update: &UpdateUser) -> AppResult<User> {
        if let Some(ref email) = update.email {
            if self.repository.users.email_exists(email, Some(id)).await? {
                return Err(AppError::Conflict("Email already registered".to_string()));
            }
        }
        if let Some(ref registration_number) = update.registration_number {
            if self
                .repository
                .users
                .registration_number_exists(registration_number, Some(id))
                .await?
            {
                return Err(AppError::Conflict(
                    "Registration number already registered".to_string(),
                ));
            }
        }

        self.repository.users.update(id, update).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.users.delete(id).await
    }
}
