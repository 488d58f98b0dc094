//! Settings and helpers shared by the domain services.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::domain::AppError;

/// Default budget for one service operation
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Tunables for the domain services
#[derive(Debug, Clone, Copy)]
pub struct ServiceConfig {
    /// Wall-clock budget shared by every gateway call of one operation
    pub operation_timeout: Duration,
    /// bcrypt cost factor
    pub hash_cost: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
            hash_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl ServiceConfig {
    /// Deadline for an operation starting now
    #[must_use]
    pub fn deadline(&self) -> Instant {
        Instant::now() + self.operation_timeout
    }
}

/// Run a gateway call, dropping it if `deadline` passes first.
///
/// Dropping the future cancels the in-flight query; the caller sees a
/// `Database` error rather than waiting on a stalled connection.
pub async fn bounded<T, F>(deadline: Instant, call: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout_at(deadline, call).await {
        Ok(result) => result,
        Err(elapsed) => Err(AppError::database("Database operation timed out", elapsed)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;

    #[test]
    fn test_service_config_default() {
        let config = ServiceConfig::default();
        assert_eq!(config.operation_timeout, Duration::from_secs(5));
        assert_eq!(config.hash_cost, bcrypt::DEFAULT_COST);
    }

    #[tokio::test]
    async fn test_bounded_times_out_as_database_error() {
        let deadline = Instant::now() + Duration::from_millis(50);
        let result: Result<(), AppError> = bounded(deadline, async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Database);
        assert_eq!(err.message(), "Database operation timed out");
    }

    #[tokio::test]
    async fn test_bounded_passes_through_result() {
        let deadline = Instant::now() + Duration::from_secs(1);
        let value = bounded(deadline, async { Ok::<_, AppError>(42) }).await.unwrap();
        assert_eq!(value, 42);

        let err = bounded(deadline, async { Err::<(), _>(AppError::not_found("gone")) })
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
