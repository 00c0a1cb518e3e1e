use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::shared::AppError;

/// `issued_at + ttl`, failing instead of overflowing the calendar
pub fn expiry_after(issued_at: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>, AppError> {
    issued_at.checked_add_signed(ttl).ok_or_else(|| {
        AppError::Internal(format!("Token lifetime {ttl} overflows the expiry timestamp"))
    })
}

/// Database model for the refresh_tokens table
///
/// One row per session. The session key is `user_id`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct RefreshTokenModel {
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenModel {
    pub fn new(
        user_id: Uuid,
        token: String,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, AppError> {
        Ok(Self {
            user_id,
            token,
            expires_at: expiry_after(issued_at, ttl)?,
            created_at: issued_at,
        })
    }

    /// A token is dead from its expiry instant onwards
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
