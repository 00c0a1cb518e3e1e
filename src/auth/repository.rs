use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::models::RefreshTokenModel;
use crate::shared::AppError;

/// Result of attempting to rotate a refresh token
#[derive(Debug, Clone, PartialEq)]
pub enum RotateResult {
    /// The old token was replaced, returns the stored replacement
    Rotated(RefreshTokenModel),
    /// No record holds the old token (unknown, revoked or already rotated)
    NotFound,
    /// The old token had expired; its record has been removed
    Expired,
}

/// Trait for refresh token storage
///
/// Implementations serialize create/rotate/revoke so that a session never
/// holds more than one live token.
#[async_trait]
pub trait RefreshTokenRepository {
    /// Stores the token for its session, replacing any previous one
    async fn create(&self, record: &RefreshTokenModel) -> Result<(), AppError>;
    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshTokenModel>, AppError>;

    /// Atomically swaps `old_token` for `new_token` if it is still live at `now`
    async fn rotate(
        &self,
        old_token: &str,
        new_token: &str,
        new_expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<RotateResult, AppError>;

    /// Deletes the record holding `token`, returns whether one existed
    async fn revoke(&self, token: &str) -> Result<bool, AppError>;
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}

#[derive(Default)]
struct TokenTable {
    by_user: HashMap<Uuid, RefreshTokenModel>,
    by_token: HashMap<String, Uuid>,
}

impl TokenTable {
    fn remove_user(&mut self, user_id: &Uuid) -> Option<RefreshTokenModel> {
        let record = self.by_user.remove(user_id)?;
        self.by_token.remove(&record.token);
        Some(record)
    }
}

/// In-memory implementation of RefreshTokenRepository for development and testing
///
/// Both indices sit behind one mutex, so every operation is atomic.
pub struct InMemoryRefreshTokenRepository {
    table: Mutex<TokenTable>,
}

impl Default for InMemoryRefreshTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRefreshTokenRepository {
    pub fn new() -> Self {
        Self {
            table: Mutex::new(TokenTable::default()),
        }
    }

    /// Returns the current number of stored tokens
    pub fn token_count(&self) -> usize {
        self.table.lock().by_user.len()
    }

    pub fn has_token(&self, token: &str) -> bool {
        self.table.lock().by_token.contains_key(token)
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    #[instrument(skip(self, record), fields(user_id = %record.user_id))]
    async fn create(&self, record: &RefreshTokenModel) -> Result<(), AppError> {
        debug!("Storing refresh token in memory");

        let mut table = self.table.lock();
        if table.remove_user(&record.user_id).is_some() {
            debug!("Replaced previous refresh token for session");
        }
        table
            .by_token
            .insert(record.token.clone(), record.user_id);
        table.by_user.insert(record.user_id, record.clone());

        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshTokenModel>, AppError> {
        let table = self.table.lock();
        let record = table
            .by_token
            .get(token)
            .and_then(|user_id| table.by_user.get(user_id))
            .cloned();

        match &record {
            Some(r) => debug!(user_id = %r.user_id, "Refresh token found in memory"),
            None => debug!("Refresh token not found in memory"),
        }

        Ok(record)
    }

    #[instrument(skip(self, old_token, new_token))]
    async fn rotate(
        &self,
        old_token: &str,
        new_token: &str,
        new_expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<RotateResult, AppError> {
        let mut table = self.table.lock();

        let user_id = match table.by_token.get(old_token) {
            Some(user_id) => *user_id,
            None => {
                debug!("Refresh token not found for rotation");
                return Ok(RotateResult::NotFound);
            }
        };

        let expired = table
            .by_user
            .get(&user_id)
            .map_or(true, |record| record.is_expired_at(now));
        if expired {
            debug!(user_id = %user_id, "Refresh token expired, removing");
            table.remove_user(&user_id);
            return Ok(RotateResult::Expired);
        }

        table.remove_user(&user_id);
        let replacement = RefreshTokenModel {
            user_id,
            token: new_token.to_string(),
            expires_at: new_expires_at,
            created_at: now,
        };
        table.by_token.insert(replacement.token.clone(), user_id);
        table.by_user.insert(user_id, replacement.clone());

        debug!(user_id = %user_id, "Refresh token rotated in memory");
        Ok(RotateResult::Rotated(replacement))
    }

    #[instrument(skip(self, token))]
    async fn revoke(&self, token: &str) -> Result<bool, AppError> {
        let mut table = self.table.lock();
        let removed = match table.by_token.get(token).copied() {
            Some(user_id) => table.remove_user(&user_id).is_some(),
            None => false,
        };

        debug!(removed = removed, "Refresh token revocation in memory");
        Ok(removed)
    }

    #[instrument(skip(self))]
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let mut table = self.table.lock();
        let expired: Vec<Uuid> = table
            .by_user
            .values()
            .filter(|record| record.is_expired_at(now))
            .map(|record| record.user_id)
            .collect();

        for user_id in &expired {
            table.remove_user(user_id);
        }

        debug!(
            expired_tokens_removed = expired.len(),
            "Expired refresh tokens removed from memory"
        );
        Ok(expired.len() as u64)
    }
}

/// PostgreSQL implementation of refresh token repository
///
/// Rotation is a single conditional UPDATE, so concurrent rotations of the
/// same token are serialized by the row lock and only one matches.
pub struct PostgresRefreshTokenRepository {
    pool: PgPool,
}

impl PostgresRefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for PostgresRefreshTokenRepository {
    #[instrument(skip(self, record), fields(user_id = %record.user_id))]
    async fn create(&self, record: &RefreshTokenModel) -> Result<(), AppError> {
        debug!("Storing refresh token in database");

        sqlx::query(
            "INSERT INTO refresh_tokens (user_id, token, expires_at, created_at) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id) DO UPDATE SET token = EXCLUDED.token, expires_at = EXCLUDED.expires_at, created_at = EXCLUDED.created_at",
        )
        .bind(record.user_id)
        .bind(&record.token)
        .bind(record.expires_at)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to store refresh token");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshTokenModel>, AppError> {
        sqlx::query_as::<_, RefreshTokenModel>(
            "SELECT user_id, token, expires_at, created_at FROM refresh_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch refresh token");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self, old_token, new_token))]
    async fn rotate(
        &self,
        old_token: &str,
        new_token: &str,
        new_expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<RotateResult, AppError> {
        let rotated = sqlx::query_as::<_, RefreshTokenModel>(
            "UPDATE refresh_tokens SET token = $1, expires_at = $2, created_at = $3 \
             WHERE token = $4 AND expires_at > $3 \
             RETURNING user_id, token, expires_at, created_at",
        )
        .bind(new_token)
        .bind(new_expires_at)
        .bind(now)
        .bind(old_token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to rotate refresh token");
            AppError::DatabaseError(e.to_string())
        })?;

        if let Some(record) = rotated {
            debug!(user_id = %record.user_id, "Refresh token rotated in database");
            return Ok(RotateResult::Rotated(record));
        }

        // A row still holding the old token can only be an expired one
        let removed = sqlx::query("DELETE FROM refresh_tokens WHERE token = $1")
            .bind(old_token)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to remove expired refresh token");
                AppError::DatabaseError(e.to_string())
            })?;

        if removed.rows_affected() > 0 {
            debug!("Refresh token expired, removed from database");
            Ok(RotateResult::Expired)
        } else {
            debug!("Refresh token not found for rotation");
            Ok(RotateResult::NotFound)
        }
    }

    #[instrument(skip(self, token))]
    async fn revoke(&self, token: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to revoke refresh token");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to purge expired refresh tokens");
                AppError::DatabaseError(e.to_string())
            })?;

        let rows_affected = result.rows_affected();
        debug!(
            expired_tokens_removed = rows_affected,
            "Expired refresh tokens purged"
        );
        Ok(rows_affected)
    }
}
