use chrono::Duration;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    credentials::CredentialVerifier,
    generators::RefreshTokenGenerator,
    models::{expiry_after, RefreshTokenModel},
    repository::{RefreshTokenRepository, RotateResult},
    token::{IssuedToken, TokenIssuer},
    types::SessionResponse,
};
use crate::clock::Clock;
use crate::shared::AppError;

const INVALID_REFRESH_TOKEN: &str = "Refresh token is not valid";
const EXPIRED_REFRESH_TOKEN: &str = "Refresh token has expired, please sign in again";

/// Coordinates login, refresh and logout
///
/// The refresh token is always written last, so a failed verification or
/// signing step leaves no session behind.
pub struct SessionService {
    credentials: CredentialVerifier,
    token_issuer: Arc<TokenIssuer>,
    refresh_tokens: Arc<dyn RefreshTokenRepository + Send + Sync>,
    token_generator: Arc<dyn RefreshTokenGenerator>,
    clock: Arc<dyn Clock>,
    refresh_token_ttl: Duration,
}

impl SessionService {
    pub fn new(
        credentials: CredentialVerifier,
        token_issuer: Arc<TokenIssuer>,
        refresh_tokens: Arc<dyn RefreshTokenRepository + Send + Sync>,
        token_generator: Arc<dyn RefreshTokenGenerator>,
        clock: Arc<dyn Clock>,
        refresh_token_ttl: Duration,
    ) -> Self {
        Self {
            credentials,
            token_issuer,
            refresh_tokens,
            token_generator,
            clock,
            refresh_token_ttl,
        }
    }

    /// Verifies credentials and opens a new session, replacing any previous one
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionResponse, AppError> {
        // Step 1: Verify credentials
        let user = self.credentials.verify(email, password).await?;

        // Step 2: Sign access token
        let access = self.token_issuer.issue(user.id)?;

        // Step 3: Persist refresh token
        let record = RefreshTokenModel::new(
            user.id,
            self.token_generator.generate(),
            self.clock.now(),
            self.refresh_token_ttl,
        )?;
        self.refresh_tokens.create(&record).await?;

        info!(user_id = %user.id, "Session opened");
        Ok(self.session_response(access, record.token))
    }

    /// Exchanges a live refresh token for a new token pair
    ///
    /// The presented token is consumed: a second call with it fails.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> Result<SessionResponse, AppError> {
        let now = self.clock.now();

        let record = self
            .refresh_tokens
            .find_by_token(refresh_token)
            .await?
            .ok_or_else(|| {
                warn!("Refresh attempted with unknown token");
                AppError::Refresh(INVALID_REFRESH_TOKEN.to_string())
            })?;

        if record.is_expired_at(now) {
            warn!(user_id = %record.user_id, "Refresh attempted with expired token");
            self.refresh_tokens.revoke(refresh_token).await?;
            return Err(AppError::Refresh(EXPIRED_REFRESH_TOKEN.to_string()));
        }

        let access = self.token_issuer.issue(record.user_id)?;

        let replacement = self.token_generator.generate();
        let new_expires_at = expiry_after(now, self.refresh_token_ttl)?;
        match self
            .refresh_tokens
            .rotate(refresh_token, &replacement, new_expires_at, now)
            .await?
        {
            RotateResult::Rotated(rotated) => {
                info!(user_id = %rotated.user_id, "Session refreshed");
                Ok(self.session_response(access, rotated.token))
            }
            RotateResult::NotFound => {
                warn!(user_id = %record.user_id, "Refresh token was rotated concurrently");
                Err(AppError::Refresh(INVALID_REFRESH_TOKEN.to_string()))
            }
            RotateResult::Expired => {
                warn!(user_id = %record.user_id, "Refresh token expired during rotation");
                Err(AppError::Refresh(EXPIRED_REFRESH_TOKEN.to_string()))
            }
        }
    }

    /// Ends the session holding `refresh_token`; unknown tokens are ignored
    #[instrument(skip(self, refresh_token))]
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AppError> {
        if self.refresh_tokens.revoke(refresh_token).await? {
            info!("Session closed");
        } else {
            info!("Logout with unknown or already revoked token");
        }
        Ok(())
    }

    fn session_response(&self, access: IssuedToken, refresh_token: String) -> SessionResponse {
        SessionResponse {
            access_token: access.token,
            refresh_token,
            expiry_duration: self.token_issuer.access_token_ttl().num_milliseconds(),
        }
    }
}
