//! Application state management.

use std::sync::Arc;

use crate::domain::{DatabaseClient, ItemRepository, UserRepository};

use super::item_service::ItemService;
use super::service::ServiceConfig;
use super::user_service::UserService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
    pub items: Arc<ItemService>,
    /// Used by the readiness probe only
    pub db_client: Arc<dyn DatabaseClient>,
}

impl AppState {
    /// Create a new application state with default service settings
    #[must_use]
    pub fn new(
        db_client: Arc<dyn DatabaseClient>,
        user_repo: Arc<dyn UserRepository>,
        item_repo: Arc<dyn ItemRepository>,
    ) -> Self {
        Self::with_config(db_client, user_repo, item_repo, ServiceConfig::default())
    }

    #[must_use]
    pub fn with_config(
        db_client: Arc<dyn DatabaseClient>,
        user_repo: Arc<dyn UserRepository>,
        item_repo: Arc<dyn ItemRepository>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            users: Arc::new(UserService::with_config(user_repo, config)),
            items: Arc::new(ItemService::with_config(item_repo, config)),
            db_client,
        }
    }
}
