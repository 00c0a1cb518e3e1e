use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    models::CategoryModel,
    repository::CategoryRepository,
    types::{CategoryResponse, CreateCategoryRequest},
};
use crate::clock::Clock;
use crate::shared::AppError;

const MAX_NAME_LEN: usize = 100;

pub struct CategoryService {
    repository: Arc<dyn CategoryRepository + Send + Sync>,
    clock: Arc<dyn Clock>,
}

impl CategoryService {
    pub fn new(
        repository: Arc<dyn CategoryRepository + Send + Sync>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { repository, clock }
    }

    #[instrument(skip(self, request))]
    pub async fn create_category(
        &self,
        request: CreateCategoryRequest,
    ) -> Result<CategoryResponse, AppError> {
        let name = request.name.trim();
        let len = name.chars().count();
        if len == 0 || len > MAX_NAME_LEN {
            return Err(AppError::Validation(format!(
                "category name must be between 1 and {MAX_NAME_LEN} characters"
            )));
        }

        let category = CategoryModel::new(name.to_string(), self.clock.now());
        self.repository.create_category(&category).await?;

        info!(category_id = %category.id, name = %category.name, "Category created");
        Ok(category.into())
    }

    #[instrument(skip(self))]
    pub async fn get_category(&self, category_id: Uuid) -> Result<CategoryResponse, AppError> {
        self.repository
            .get_category(category_id)
            .await?
            .map(CategoryResponse::from)
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", category_id)))
    }

    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<CategoryResponse>, AppError> {
        Ok(self
            .repository
            .list_categories()
            .await?
            .into_iter()
            .map(CategoryResponse::from)
            .collect())
    }
}
