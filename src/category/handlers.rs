use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    service::CategoryService,
    types::{CategoryResponse, CreateCategoryRequest},
};
use crate::auth::AuthenticatedUser;
use crate::shared::{AppError, AppState};

/// POST /api/v1/categories
#[instrument(name = "create_category", skip(state, request))]
pub async fn create_category(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), AppError> {
    let service = CategoryService::new(
        Arc::clone(&state.category_repository),
        Arc::clone(&state.clock),
    );
    let category = service.create_category(request).await?;

    info!(user_id = %user.user_id, category_id = %category.id, "Category created via API");
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /api/v1/categories/:id
#[instrument(name = "get_category", skip(state))]
pub async fn get_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> Result<Json<CategoryResponse>, AppError> {
    let service = CategoryService::new(
        Arc::clone(&state.category_repository),
        Arc::clone(&state.clock),
    );
    Ok(Json(service.get_category(category_id).await?))
}

/// GET /api/v1/categories
#[instrument(name = "list_categories", skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, AppError> {
    let service = CategoryService::new(
        Arc::clone(&state.category_repository),
        Arc::clone(&state.clock),
    );
    Ok(Json(service.list_categories().await?))
}
