//! User use cases: hashing, default role, partial updates, response shaping.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::domain::{
    AppError, CreateUserRequest, UpdateUserRequest, User, UserRepository, UserResponse,
};

use super::password::PasswordHasher;
use super::service::{ServiceConfig, bounded};

/// User service. Input is expected to be validated by the caller.
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    config: ServiceConfig,
}

impl UserService {
    #[must_use]
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self::with_config(repo, ServiceConfig::default())
    }

    #[must_use]
    pub fn with_config(repo: Arc<dyn UserRepository>, config: ServiceConfig) -> Self {
        Self {
            repo,
            hasher: PasswordHasher::new(config.hash_cost),
            config,
        }
    }

    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<UserResponse>, AppError> {
        let users = bounded(self.config.deadline(), self.repo.find_all()).await?;
        Ok(users.iter().map(User::to_response).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i64) -> Result<UserResponse, AppError> {
        let user = bounded(self.config.deadline(), self.repo.find_by_id(id)).await?;
        Ok(user.to_response())
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create(&self, input: CreateUserRequest) -> Result<UserResponse, AppError> {
        let deadline = self.config.deadline();
        let password_hash = self.hasher.hash(&input.password).await?;

        let user = User::new(
            input.name,
            input.email,
            password_hash,
            input.role.unwrap_or_default(),
        );
        let created = bounded(deadline, self.repo.create(&user)).await?;

        info!(id = created.id, "User created");
        Ok(created.to_response())
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: i64, input: UpdateUserRequest) -> Result<UserResponse, AppError> {
        let deadline = self.config.deadline();
        let mut user = bounded(deadline, self.repo.find_by_id(id)).await?;

        if let Some(name) = input.name {
            user.name = name;
        }
        if let Some(email) = input.email {
            user.email = email;
        }
        if let Some(password) = input.password {
            user.password_hash = self.hasher.hash(&password).await?;
        }
        if let Some(role) = input.role {
            user.role = role;
        }
        if let Some(active) = input.active {
            user.active = active;
        }

        let updated = bounded(deadline, self.repo.update(&user)).await?;

        info!(id, "User updated");
        Ok(updated.to_response())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        bounded(self.config.deadline(), self.repo.delete(id)).await?;
        info!(id, "User deleted");
        Ok(())
    }
}
