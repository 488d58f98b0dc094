//! Item use cases.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::domain::{AppError, CreateItemRequest, Item, ItemRepository, UpdateItemRequest};

use super::service::{ServiceConfig, bounded};

pub struct ItemService {
    repo: Arc<dyn ItemRepository>,
    config: ServiceConfig,
}

impl ItemService {
    #[must_use]
    pub fn new(repo: Arc<dyn ItemRepository>) -> Self {
        Self::with_config(repo, ServiceConfig::default())
    }

    #[must_use]
    pub fn with_config(repo: Arc<dyn ItemRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Item>, AppError> {
        bounded(self.config.deadline(), self.repo.find_all()).await
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i64) -> Result<Item, AppError> {
        bounded(self.config.deadline(), self.repo.find_by_id(id)).await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: CreateItemRequest) -> Result<Item, AppError> {
        let item = Item::new(input.name, input.description, input.price);
        let created = bounded(self.config.deadline(), self.repo.create(&item)).await?;
        info!(id = created.id, "Item created");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: i64, input: UpdateItemRequest) -> Result<Item, AppError> {
        let deadline = self.config.deadline();
        let mut item = bounded(deadline, self.repo.find_by_id(id)).await?;

        if let Some(name) = input.name {
            item.name = name;
        }
        if let Some(description) = input.description {
            item.description = Some(description);
        }
        if let Some(price) = input.price {
            item.price = price;
        }

        let updated = bounded(deadline, self.repo.update(&item)).await?;
        info!(id, "Item updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        bounded(self.config.deadline(), self.repo.delete(id)).await?;
        info!(id, "Item deleted");
        Ok(())
    }
}
