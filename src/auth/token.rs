use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::models::expiry_after;
use super::types::AccessClaims;
use crate::clock::Clock;
use crate::config::AuthConfig;
use crate::shared::AppError;

/// A freshly signed access token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies access tokens
///
/// Keys are derived from [`AuthConfig`] once at construction and never change.
/// Expiry is the only invalidation mechanism.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret()),
            access_token_ttl: config.access_token_ttl,
            clock,
        }
    }

    pub fn access_token_ttl(&self) -> Duration {
        self.access_token_ttl
    }

    /// Creates a new access token for the given user
    #[instrument(skip(self))]
    pub fn issue(&self, user_id: Uuid) -> Result<IssuedToken, AppError> {
        let now = self.clock.now();
        let expires_at = expiry_after(now, self.access_token_ttl)?;

        debug!(
            user_id = %user_id,
            exp_timestamp = expires_at.timestamp(),
            "Creating access token"
        );

        let claims = AccessClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| {
                debug!(error = %e, "Failed to encode access token");
                AppError::Internal(format!("Failed to sign access token: {e}"))
            })?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Validates signature and expiry, returning the user id
    #[instrument(skip(self, token))]
    pub fn verify(&self, token: &str) -> Result<Uuid, AppError> {
        // Expiry is compared against the injected clock below
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let claims = decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                debug!(error = %e, "Failed to decode access token");
                AppError::Authentication("Invalid access token".to_string())
            })?
            .claims;

        if claims.exp <= self.clock.now().timestamp() {
            debug!(exp = claims.exp, "Access token has expired");
            return Err(AppError::Authentication(
                "Access token has expired".to_string(),
            ));
        }

        Uuid::parse_str(&claims.sub).map_err(|_| {
            debug!(sub = %claims.sub, "Access token subject is not a user id");
            AppError::Authentication("Invalid access token".to_string())
        })
    }
}
