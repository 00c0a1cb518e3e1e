use axum::{extract::State, http::StatusCode, Json};
use tracing::{info, instrument};

use super::types::{LoginRequest, LogoutRequest, RefreshRequest, SessionResponse};
use crate::shared::{AppError, AppState};

/// HTTP handler for signing in
///
/// POST /api/v1/auth/signin
/// Returns an access token, a refresh token and the access token lifetime
#[instrument(name = "signin", skip(state, request))]
pub async fn signin(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    info!("Sign-in requested");

    let session = state
        .session_service
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(session))
}

/// HTTP handler for exchanging a refresh token
///
/// POST /api/v1/auth/refresh
#[instrument(name = "refresh", skip(state, request))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    info!("Token refresh requested");

    let session = state
        .session_service
        .refresh(&request.refresh_token)
        .await?;

    Ok(Json(session))
}

/// POST /api/v1/auth/logout
#[instrument(name = "logout", skip(state, request))]
pub async fn logout(
    State(state): State<AppState>,
    Json(request): Json<LogoutRequest>,
) -> Result<StatusCode, AppError> {
    state.session_service.logout(&request.refresh_token).await?;
    Ok(StatusCode::NO_CONTENT)
}
