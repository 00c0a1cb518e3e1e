use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info, instrument};

use super::repository::RefreshTokenRepository;
use crate::clock::Clock;
use crate::shared::AppError;

/// Configuration for the cleanup task
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// How often expired refresh tokens are purged
    pub cleanup_interval: Duration,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            cleanup_interval: Duration::from_secs(60 * 60), // 1 hour
        }
    }
}

/// Starts the background task that periodically removes expired refresh tokens
///
/// Only reclaims storage. Expired tokens are already rejected on use.
#[instrument(skip(refresh_tokens, clock))]
pub async fn start_cleanup_task(
    refresh_tokens: Arc<dyn RefreshTokenRepository + Send + Sync>,
    clock: Arc<dyn Clock>,
    config: CleanupConfig,
) {
    info!(
        cleanup_interval_secs = config.cleanup_interval.as_secs(),
        "Starting refresh token cleanup background task"
    );

    let mut cleanup_interval = interval(config.cleanup_interval);

    loop {
        cleanup_interval.tick().await;

        match purge_expired_tokens(&refresh_tokens, clock.as_ref()).await {
            Ok(removed) => {
                info!(removed_tokens = removed, "Refresh token cleanup completed");
            }
            Err(e) => {
                error!(error = %e, "Refresh token cleanup task failed");
            }
        }
    }
}

async fn purge_expired_tokens(
    refresh_tokens: &Arc<dyn RefreshTokenRepository + Send + Sync>,
    clock: &dyn Clock,
) -> Result<u64, AppError> {
    refresh_tokens.purge_expired(clock.now()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::RefreshTokenModel;
    use crate::auth::repository::InMemoryRefreshTokenRepository;
    use crate::clock::ManualClock;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_purge_uses_injected_clock() {
        let clock = Arc::new(ManualClock::starting_now());
        let repo = Arc::new(InMemoryRefreshTokenRepository::new());
        let record = RefreshTokenModel::new(
            Uuid::new_v4(),
            "short-lived".to_string(),
            clock.now(),
            chrono::Duration::minutes(10),
        )
        .unwrap();
        repo.create(&record).await.unwrap();

        let shared: Arc<dyn RefreshTokenRepository + Send + Sync> = repo.clone();
        assert_eq!(purge_expired_tokens(&shared, clock.as_ref()).await.unwrap(), 0);

        clock.advance(chrono::Duration::minutes(11));
        assert_eq!(purge_expired_tokens(&shared, clock.as_ref()).await.unwrap(), 1);
        assert_eq!(repo.token_count(), 0);
    }

    #[tokio::test]
    async fn test_cleanup_task_runs_on_interval() {
        let clock = Arc::new(ManualClock::starting_now());
        let repo = Arc::new(InMemoryRefreshTokenRepository::new());
        let mut record = RefreshTokenModel::new(
            Uuid::new_v4(),
            "stale".to_string(),
            clock.now(),
            chrono::Duration::minutes(1),
        )
        .unwrap();
        record.expires_at = clock.now() - chrono::Duration::minutes(1);
        repo.create(&record).await.unwrap();

        let handle = tokio::spawn(start_cleanup_task(
            repo.clone(),
            clock,
            CleanupConfig {
                cleanup_interval: Duration::from_secs(60),
            },
        ));

        // First tick fires immediately
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(repo.token_count(), 0);

        handle.abort();
    }
}
