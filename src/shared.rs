use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::auth::{
    credentials::{CredentialVerifier, PasswordHasher},
    generators::RandomTokenGenerator,
    repository::{
        InMemoryRefreshTokenRepository, PostgresRefreshTokenRepository, RefreshTokenRepository,
    },
    service::SessionService,
    token::TokenIssuer,
};
use crate::category::repository::{
    CategoryRepository, InMemoryCategoryRepository, PostgresCategoryRepository,
};
use crate::clock::Clock;
use crate::config::{AppConfig, PaginationConfig};
use crate::post::repository::{InMemoryPostRepository, PostRepository, PostgresPostRepository};
use crate::user::repository::{InMemoryUserRepository, PostgresUserRepository, UserRepository};

/// Storage backends, assembled once at process start
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository + Send + Sync>,
    pub categories: Arc<dyn CategoryRepository + Send + Sync>,
    pub posts: Arc<dyn PostRepository + Send + Sync>,
    pub refresh_tokens: Arc<dyn RefreshTokenRepository + Send + Sync>,
}

impl Repositories {
    /// In-memory repositories for development and testing
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            categories: Arc::new(InMemoryCategoryRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
            refresh_tokens: Arc::new(InMemoryRefreshTokenRepository::new()),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(pool.clone())),
            posts: Arc::new(PostgresPostRepository::new(pool.clone())),
            refresh_tokens: Arc::new(PostgresRefreshTokenRepository::new(pool)),
        }
    }
}

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub user_repository: Arc<dyn UserRepository + Send + Sync>,
    pub category_repository: Arc<dyn CategoryRepository + Send + Sync>,
    pub post_repository: Arc<dyn PostRepository + Send + Sync>,
    pub session_service: Arc<SessionService>,
    pub token_issuer: Arc<TokenIssuer>,
    pub password_hasher: Arc<PasswordHasher>,
    pub clock: Arc<dyn Clock>,
    pub pagination: PaginationConfig,
}

impl AppState {
    pub fn new(
        repositories: Repositories,
        config: &AppConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        let token_issuer = Arc::new(TokenIssuer::new(&config.auth, clock.clone()));
        let password_hasher = Arc::new(PasswordHasher::new(&config.password)?);
        let credentials =
            CredentialVerifier::new(repositories.users.clone(), password_hasher.clone())?;

        let session_service = Arc::new(SessionService::new(
            credentials,
            token_issuer.clone(),
            repositories.refresh_tokens.clone(),
            Arc::new(RandomTokenGenerator::new()),
            clock.clone(),
            config.auth.refresh_token_ttl,
        ));

        Ok(Self {
            user_repository: repositories.users,
            category_repository: repositories.categories,
            post_repository: repositories.posts,
            session_service,
            token_issuer,
            password_hasher,
            clock,
            pagination: config.pagination,
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Refresh failed: {0}")]
    Refresh(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Authentication(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Refresh(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::DatabaseError(msg) => {
                error!(error = %msg, "Database error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                error!(error = %msg, "Internal error while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
