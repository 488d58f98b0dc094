//! PostgreSQL gateway implementations.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use tracing::{info, instrument};

use crate::domain::{
    AppError, DatabaseClient, ErrorKind, Item, ItemRepository, Role, User, UserRepository,
};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, role, active, created_at, updated_at, deleted_at";

const ITEM_COLUMNS: &str = "id, name, description, price, created_at, updated_at";

/// PostgreSQL connection pool configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(3),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

/// PostgreSQL client with connection pooling.
///
/// Requests beyond `max_connections` wait for a free connection up to
/// `acquire_timeout`.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client with custom configuration
    pub async fn new(options: PgConnectOptions, config: PostgresConfig) -> Result<Self, AppError> {
        info!("Connecting to PostgreSQL...");
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(config.max_lifetime)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database("Failed to connect to database", e))?;
        info!("Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Wrap an existing pool
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the embedded, versioned migrations
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::database("Failed to apply migrations", e))?;
        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Get the underlying connection pool (for testing)
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_user(row: &PgRow) -> Result<User, sqlx::Error> {
        let role: String = row.try_get("role")?;
        let role = role.parse::<Role>().map_err(|e: String| sqlx::Error::Decode(e.into()))?;
        Ok(User {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role,
            active: row.try_get("active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            deleted_at: row.try_get("deleted_at")?,
        })
    }

    fn row_to_item(row: &PgRow) -> Result<Item, sqlx::Error> {
        Ok(Item {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: row.try_get("price")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Translate a driver error into the taxonomy.
///
/// A unique violation is a conflict regardless of which pre-checks ran;
/// the index is the authority on uniqueness.
fn storage_error(message: &'static str, err: sqlx::Error) -> AppError {
    if matches!(err, sqlx::Error::RowNotFound) {
        return AppError::not_found("Resource not found").with_source(err);
    }
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return AppError::duplicate("Resource already exists").with_source(err);
        }
    }
    AppError::database(message, err)
}

fn user_not_found(key: &str, value: impl Into<serde_json::Value>) -> AppError {
    AppError::not_found("User not found").with_detail(key, value)
}

fn item_not_found(id: i64) -> AppError {
    AppError::not_found("Item not found").with_detail("id", id)
}

fn email_taken(email: &str) -> AppError {
    AppError::duplicate("User with this email already exists").with_detail("email", email)
}

#[async_trait]
impl DatabaseClient for PostgresClient {
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database("Database unavailable", e))?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PostgresClient {
    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE deleted_at IS NULL ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to retrieve users", e))?;

        rows.iter()
            .map(Self::row_to_user)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| storage_error("Failed to retrieve users", e))
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> Result<User, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to retrieve user", e))?
        .ok_or_else(|| user_not_found("id", id))?;

        Self::row_to_user(&row).map_err(|e| storage_error("Failed to retrieve user", e))
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<User, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND deleted_at IS NULL"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to retrieve user by email", e))?
        .ok_or_else(|| user_not_found("email", email))?;

        Self::row_to_user(&row).map_err(|e| storage_error("Failed to retrieve user by email", e))
    }

    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn create(&self, user: &User) -> Result<User, AppError> {
        match self.find_by_email(&user.email).await {
            Ok(_) => return Err(email_taken(&user.email)),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, role, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match storage_error("Failed to create user", e) {
            err if err.kind() == ErrorKind::DuplicateResource => email_taken(&user.email),
            err => err,
        })?;

        Self::row_to_user(&row).map_err(|e| storage_error("Failed to create user", e))
    }

    #[instrument(skip(self, user), fields(id = user.id))]
    async fn update(&self, user: &User) -> Result<User, AppError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE users
            SET name = $1,
                email = $2,
                password_hash = $3,
                role = $4,
                active = $5,
                updated_at = NOW()
            WHERE id = $6 AND deleted_at IS NULL
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.active)
        .bind(user.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match storage_error("Failed to update user", e) {
            err if err.kind() == ErrorKind::DuplicateResource => email_taken(&user.email),
            err => err,
        })?
        .ok_or_else(|| user_not_found("id", user.id))?;

        Self::row_to_user(&row).map_err(|e| storage_error("Failed to update user", e))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to delete user", e))?;

        if result.rows_affected() == 0 {
            return Err(user_not_found("id", id));
        }
        Ok(())
    }
}

#[async_trait]
impl ItemRepository for PostgresClient {
    #[instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<Item>, AppError> {
        let rows = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM items ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to retrieve items", e))?;

        rows.iter()
            .map(Self::row_to_item)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| storage_error("Failed to retrieve items", e))
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> Result<Item, AppError> {
        let row = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to retrieve item", e))?
            .ok_or_else(|| item_not_found(id))?;

        Self::row_to_item(&row).map_err(|e| storage_error("Failed to retrieve item", e))
    }

    #[instrument(skip(self, item), fields(name = %item.name))]
    async fn create(&self, item: &Item) -> Result<Item, AppError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO items (name, description, price, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to create item", e))?;

        Self::row_to_item(&row).map_err(|e| storage_error("Failed to create item", e))
    }

    #[instrument(skip(self, item), fields(id = item.id))]
    async fn update(&self, item: &Item) -> Result<Item, AppError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE items
            SET name = $1,
                description = $2,
                price = $3,
                updated_at = NOW()
            WHERE id = $4
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price)
        .bind(item.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("Failed to update item", e))?
        .ok_or_else(|| item_not_found(item.id))?;

        Self::row_to_item(&row).map_err(|e| storage_error("Failed to update item", e))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to delete item", e))?;

        if result.rows_affected() == 0 {
            return Err(item_not_found(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_config_default() {
        let config = PostgresConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.acquire_timeout, Duration::from_secs(3));
        assert_eq!(config.idle_timeout, Duration::from_secs(600));
        assert_eq!(config.max_lifetime, Duration::from_secs(1800));
    }

    #[test]
    fn test_row_not_found_is_not_found() {
        let err = storage_error("Failed to retrieve user", sqlx::Error::RowNotFound);
        assert_eq!(err.kind(), ErrorKind::ResourceNotFound);
        assert!(err.is_not_found());
    }

    #[test]
    fn test_pool_timeout_is_database_error() {
        let err = storage_error("Failed to create item", sqlx::Error::PoolTimedOut);
        assert_eq!(err.kind(), ErrorKind::Database);
    }

    #[test]
    fn test_not_found_helpers_carry_details() {
        let err = user_not_found("email", "ann@x.com");
        assert_eq!(err.kind(), ErrorKind::ResourceNotFound);
        assert_eq!(err.details().unwrap()["email"], "ann@x.com");

        let err = item_not_found(3);
        assert_eq!(err.details().unwrap()["id"], 3);
    }
}
