//! Mock implementations for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::domain::{AppError, DatabaseClient, Item, ItemRepository, User, UserRepository};

/// Configuration for mock behavior
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    pub should_fail: bool,
    pub error_message: Option<String>,
    /// Artificial latency applied before every call
    pub delay: Option<Duration>,
}

impl MockConfig {
    #[must_use]
    pub fn success() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            should_fail: true,
            error_message: Some(message.into()),
            delay: None,
        }
    }

    #[must_use]
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    async fn apply(&self) -> Result<(), AppError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.should_fail {
            let msg = self
                .error_message
                .clone()
                .unwrap_or_else(|| "Mock error".to_string());
            return Err(AppError::database("Mock storage failure", io::Error::other(msg)));
        }
        Ok(())
    }
}

/// Mock connectivity probe
pub struct MockDatabaseClient {
    is_healthy: AtomicBool,
}

impl MockDatabaseClient {
    #[must_use]
    pub fn new() -> Self {
        Self {
            is_healthy: AtomicBool::new(true),
        }
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.is_healthy.store(healthy, Ordering::Relaxed);
    }
}

impl Default for MockDatabaseClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn health_check(&self) -> Result<(), AppError> {
        if !self.is_healthy.load(Ordering::Relaxed) {
            return Err(AppError::database(
                "Database unavailable",
                io::Error::other("Unhealthy"),
            ));
        }
        Ok(())
    }
}

/// In-memory user gateway with soft-delete semantics
pub struct MockUserRepository {
    storage: Arc<Mutex<BTreeMap<i64, User>>>,
    next_id: AtomicUsize,
    calls: AtomicUsize,
    writes: AtomicUsize,
    config: MockConfig,
}

impl MockUserRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MockConfig::success())
    }

    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            storage: Arc::new(Mutex::new(BTreeMap::new())),
            next_id: AtomicUsize::new(1),
            calls: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            config,
        }
    }

    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockConfig::failure(message))
    }

    #[must_use]
    pub fn with_delay(delay: Duration) -> Self {
        Self::with_config(MockConfig::slow(delay))
    }

    /// All stored users including soft-deleted rows (for testing)
    pub fn get_all_users(&self) -> Vec<User> {
        self.storage.lock().unwrap().values().cloned().collect()
    }

    /// Number of gateway calls of any kind
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of create/update/delete calls
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    async fn enter(&self, write: bool) -> Result<(), AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if write {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        self.config.apply().await
    }

    fn live_by_id(storage: &BTreeMap<i64, User>, id: i64) -> Result<User, AppError> {
        storage
            .get(&id)
            .filter(|u| u.deleted_at.is_none())
            .cloned()
            .ok_or_else(|| AppError::not_found("User not found").with_detail("id", id))
    }
}

impl Default for MockUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_all(&self) -> Result<Vec<User>, AppError> {
        self.enter(false).await?;
        let storage = self.storage.lock().unwrap();
        Ok(storage
            .values()
            .filter(|u| u.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<User, AppError> {
        self.enter(false).await?;
        let storage = self.storage.lock().unwrap();
        Self::live_by_id(&storage, id)
    }

    async fn find_by_email(&self, email: &str) -> Result<User, AppError> {
        self.enter(false).await?;
        let storage = self.storage.lock().unwrap();
        storage
            .values()
            .find(|u| u.deleted_at.is_none() && u.email == email)
            .cloned()
            .ok_or_else(|| AppError::not_found("User not found").with_detail("email", email))
    }

    async fn create(&self, user: &User) -> Result<User, AppError> {
        match self.find_by_email(&user.email).await {
            Ok(_) => {
                return Err(AppError::duplicate("User with this email already exists")
                    .with_detail("email", user.email.as_str()));
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        self.enter(true).await?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64;
        let now = Utc::now();
        let created = User {
            id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            ..user.clone()
        };
        self.storage.lock().unwrap().insert(id, created.clone());
        Ok(created)
    }

    async fn update(&self, user: &User) -> Result<User, AppError> {
        self.enter(true).await?;
        let mut storage = self.storage.lock().unwrap();
        let existing = Self::live_by_id(&storage, user.id)?;

        let taken = storage
            .values()
            .any(|u| u.id != user.id && u.deleted_at.is_none() && u.email == user.email);
        if taken {
            return Err(AppError::duplicate("User with this email already exists")
                .with_detail("email", user.email.as_str()));
        }

        let updated = User {
            created_at: existing.created_at,
            updated_at: Utc::now(),
            deleted_at: None,
            ..user.clone()
        };
        storage.insert(user.id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.enter(true).await?;
        let mut storage = self.storage.lock().unwrap();
        match storage.get_mut(&id).filter(|u| u.deleted_at.is_none()) {
            Some(user) => {
                user.deleted_at = Some(Utc::now());
                Ok(())
            }
            None => Err(AppError::not_found("User not found").with_detail("id", id)),
        }
    }
}

/// In-memory item gateway
pub struct MockItemRepository {
    storage: Arc<Mutex<BTreeMap<i64, Item>>>,
    next_id: AtomicUsize,
    calls: AtomicUsize,
    config: MockConfig,
}

impl MockItemRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MockConfig::success())
    }

    #[must_use]
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            storage: Arc::new(Mutex::new(BTreeMap::new())),
            next_id: AtomicUsize::new(1),
            calls: AtomicUsize::new(0),
            config,
        }
    }

    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockConfig::failure(message))
    }

    /// Get all stored items (for testing)
    pub fn get_all_items(&self) -> Vec<Item> {
        self.storage.lock().unwrap().values().cloned().collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> Result<(), AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.config.apply().await
    }

    fn not_found(id: i64) -> AppError {
        AppError::not_found("Item not found").with_detail("id", id)
    }
}

impl Default for MockItemRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemRepository for MockItemRepository {
    async fn find_all(&self) -> Result<Vec<Item>, AppError> {
        self.enter().await?;
        Ok(self.get_all_items())
    }

    async fn find_by_id(&self, id: i64) -> Result<Item, AppError> {
        self.enter().await?;
        let storage = self.storage.lock().unwrap();
        storage.get(&id).cloned().ok_or_else(|| Self::not_found(id))
    }

    async fn create(&self, item: &Item) -> Result<Item, AppError> {
        self.enter().await?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64;
        let now = Utc::now();
        let created = Item {
            id,
            created_at: now,
            updated_at: now,
            ..item.clone()
        };
        self.storage.lock().unwrap().insert(id, created.clone());
        Ok(created)
    }

    async fn update(&self, item: &Item) -> Result<Item, AppError> {
        self.enter().await?;
        let mut storage = self.storage.lock().unwrap();
        let existing = storage.get(&item.id).ok_or_else(|| Self::not_found(item.id))?;
        let updated = Item {
            created_at: existing.created_at,
            updated_at: Utc::now(),
            ..item.clone()
        };
        storage.insert(item.id, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.enter().await?;
        self.storage
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(id))
    }
}
