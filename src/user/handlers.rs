use axum::{extract::State, http::StatusCode, Extension, Json};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::UserService,
    types::{SignupRequest, UserResponse},
};
use crate::auth::AuthenticatedUser;
use crate::shared::{AppError, AppState};

/// HTTP handler for registering a new user
///
/// POST /api/v1/auth/signup
#[instrument(name = "signup", skip(state, request))]
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let service = UserService::new(
        Arc::clone(&state.user_repository),
        Arc::clone(&state.password_hasher),
        Arc::clone(&state.clock),
    );
    let user = service.register(request).await?;

    info!(user_id = %user.id, "User signed up");
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/v1/users/me
#[instrument(name = "me", skip(state))]
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<UserResponse>, AppError> {
    let service = UserService::new(
        Arc::clone(&state.user_repository),
        Arc::clone(&state.password_hasher),
        Arc::clone(&state.clock),
    );
    Ok(Json(service.get_user(user.user_id).await?))
}
