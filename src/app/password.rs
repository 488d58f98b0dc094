//! One-way password hashing.

use tracing::error;

use crate::domain::AppError;

/// Salted bcrypt hasher. Each call draws a fresh random salt.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    #[must_use]
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    #[must_use]
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash on the blocking pool; bcrypt is deliberately slow.
    pub async fn hash(&self, plaintext: &str) -> Result<String, AppError> {
        let cost = self.cost;
        let plaintext = plaintext.to_owned();

        let joined = tokio::task::spawn_blocking(move || bcrypt::hash(plaintext, cost)).await;
        match joined {
            Ok(Ok(hash)) => Ok(hash),
            Ok(Err(e)) => {
                error!(error = %e, "Password hashing failed");
                Err(AppError::internal("Failed to process password").with_source(e))
            }
            Err(e) => {
                error!(error = %e, "Password hashing task aborted");
                Err(AppError::internal("Failed to process password").with_source(e))
            }
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}
