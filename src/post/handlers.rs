use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    service::PostService,
    types::{CreatePostRequest, PostListQuery, PostResponse, UpdatePostRequest},
};
use crate::auth::AuthenticatedUser;
use crate::pagination::Page;
use crate::shared::{AppError, AppState};

fn post_service(state: &AppState) -> PostService {
    PostService::new(
        Arc::clone(&state.post_repository),
        Arc::clone(&state.category_repository),
        Arc::clone(&state.user_repository),
        Arc::clone(&state.clock),
        state.pagination,
    )
}

/// HTTP handler for listing posts
///
/// GET /api/v1/posts?offset=&limit=&userId=|categoryId=
#[instrument(name = "list_posts", skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PostListQuery>,
) -> Result<Json<Page<PostResponse>>, AppError> {
    Ok(Json(post_service(&state).list_posts(query).await?))
}

/// GET /api/v1/posts/:id
#[instrument(name = "get_post", skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<Json<PostResponse>, AppError> {
    Ok(Json(post_service(&state).get_post(post_id).await?))
}

/// POST /api/v1/posts
#[instrument(name = "create_post", skip(state, request))]
pub async fn create_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), AppError> {
    let post = post_service(&state)
        .create_post(user.user_id, request)
        .await?;

    info!(post_id = %post.id, user_id = %user.user_id, "Post created via API");
    Ok((StatusCode::CREATED, Json(post)))
}

/// PUT /api/v1/posts/:id
#[instrument(name = "update_post", skip(state, request))]
pub async fn update_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(post_id): Path<Uuid>,
    Json(request): Json<UpdatePostRequest>,
) -> Result<Json<PostResponse>, AppError> {
    let post = post_service(&state).update_post(post_id, request).await?;

    info!(%post_id, user_id = %user.user_id, "Post updated via API");
    Ok(Json(post))
}

/// DELETE /api/v1/posts/:id
#[instrument(name = "delete_post", skip(state))]
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(post_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    post_service(&state).delete_post(post_id).await?;

    info!(%post_id, user_id = %user.user_id, "Post deleted via API");
    Ok(StatusCode::NO_CONTENT)
}
