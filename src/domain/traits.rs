//! Domain traits defining contracts for persistence gateways.
//!
//! Cancellation is carried by the future itself: a caller that drops an
//! in-flight call (for example on a service timeout) aborts it.

use async_trait::async_trait;

use super::error::AppError;
use super::types::{Item, User};

/// Connectivity probe for the backing store
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Check database connectivity
    async fn health_check(&self) -> Result<(), AppError>;
}

/// Persistence gateway for users. Soft-deleted rows are invisible.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All non-deleted users ordered by id
    async fn find_all(&self) -> Result<Vec<User>, AppError>;

    /// Fails with `ResourceNotFound` when no live row matches
    async fn find_by_id(&self, id: i64) -> Result<User, AppError>;

    /// Fails with `ResourceNotFound` when no live row matches
    async fn find_by_email(&self, email: &str) -> Result<User, AppError>;

    /// Rejects a taken email with `DuplicateResource`, otherwise inserts
    /// and returns the record with its assigned id and timestamps
    async fn create(&self, user: &User) -> Result<User, AppError>;

    /// Persists every mutable field of the user identified by `user.id`
    async fn update(&self, user: &User) -> Result<User, AppError>;

    /// Soft-deletes the user
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

/// Persistence gateway for items
#[async_trait]
pub trait ItemRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Item>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Item, AppError>;

    async fn create(&self, item: &Item) -> Result<Item, AppError>;

    async fn update(&self, item: &Item) -> Result<Item, AppError>;

    /// Hard-deletes the item
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}
