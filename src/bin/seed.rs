//! Seed a development database with sample users and items.
//!
//! Users go through `UserService` so their passwords are hashed. Users
//! whose email already exists are left alone, so the seeder can be re-run.
//!
//! Usage:
//!   cargo run --bin migrate && cargo run --bin seed

use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tracing::info;

use crud_service::app::{ItemService, UserService};
use crud_service::config::AppConfig;
use crud_service::domain::{
    CreateItemRequest, CreateUserRequest, ItemRepository, Role, UpdateUserRequest, UserRepository,
};
use crud_service::infra::PostgresClient;
use crud_service::telemetry::init_tracing;

struct SeedUser {
    name: &'static str,
    email: &'static str,
    role: Role,
    active: bool,
}

const SEED_PASSWORD: &str = "password123";

const USERS: &[SeedUser] = &[
    SeedUser { name: "Admin User", email: "admin@example.com", role: Role::Admin, active: true },
    SeedUser { name: "Regular User", email: "user@example.com", role: Role::User, active: true },
    SeedUser { name: "Inactive User", email: "inactive@example.com", role: Role::User, active: false },
    SeedUser { name: "John Smith", email: "john.smith@example.com", role: Role::User, active: true },
    SeedUser { name: "Jane Doe", email: "jane.doe@example.com", role: Role::User, active: true },
];

const ITEMS: &[(&str, &str, f64)] = &[
    ("Widget", "A small widget", 9.99),
    ("Gadget", "A useful gadget", 24.5),
    ("Gizmo", "An unusual gizmo", 3.75),
];

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let config = AppConfig::from_env().context("Invalid configuration")?;
    init_tracing(&config.log, config.server.mode);

    let options = config
        .database
        .connect_options()
        .context("Invalid database settings")?;
    let postgres = Arc::new(
        PostgresClient::new(options, config.database.pool_config())
            .await
            .context("Failed to connect to PostgreSQL")?,
    );

    let user_repo: Arc<dyn UserRepository> = Arc::clone(&postgres) as _;
    let users = UserService::with_config(Arc::clone(&user_repo), config.service);

    let mut created_users = 0;
    for seed in USERS {
        match user_repo.find_by_email(seed.email).await {
            Ok(_) => {
                info!(email = seed.email, "User exists, skipping");
                continue;
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e).context("Failed to look up seed user"),
        }

        let mut input = CreateUserRequest::new(
            seed.name.to_string(),
            seed.email.to_string(),
            SEED_PASSWORD.to_string(),
        );
        input.role = Some(seed.role);
        let user = users
            .create(input)
            .await
            .with_context(|| format!("Failed to create user {}", seed.email))?;

        if !seed.active {
            let deactivate = UpdateUserRequest {
                active: Some(false),
                ..Default::default()
            };
            users
                .update(user.id, deactivate)
                .await
                .with_context(|| format!("Failed to deactivate user {}", seed.email))?;
        }
        created_users += 1;
    }

    let item_repo: Arc<dyn ItemRepository> = Arc::clone(&postgres) as _;
    let items = ItemService::with_config(item_repo, config.service);
    let existing = items.list_all().await.context("Failed to list items")?;

    let mut created_items = 0;
    for (name, description, price) in ITEMS {
        if existing.iter().any(|i| i.name == *name) {
            continue;
        }
        items
            .create(CreateItemRequest {
                name: name.to_string(),
                description: Some(description.to_string()),
                price: *price,
            })
            .await
            .with_context(|| format!("Failed to create item {name}"))?;
        created_items += 1;
    }

    postgres.pool().close().await;
    info!(users = created_users, items = created_items, "Seed data applied");
    Ok(())
}
