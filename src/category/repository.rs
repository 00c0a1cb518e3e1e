use async_trait::async_trait;
use parking_lot::RwLock;
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::models::CategoryModel;
use crate::shared::AppError;

/// Trait for category repository operations
#[async_trait]
pub trait CategoryRepository {
    /// Fails with `Conflict` if a category with the same name exists
    async fn create_category(&self, category: &CategoryModel) -> Result<(), AppError>;
    async fn get_category(&self, category_id: Uuid) -> Result<Option<CategoryModel>, AppError>;
    /// All categories ordered by name
    async fn list_categories(&self) -> Result<Vec<CategoryModel>, AppError>;
    async fn exists(&self, category_id: Uuid) -> Result<bool, AppError>;
}

/// In-memory implementation of CategoryRepository for development and testing
pub struct InMemoryCategoryRepository {
    categories: RwLock<HashMap<Uuid, CategoryModel>>,
}

impl Default for InMemoryCategoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self {
            categories: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    #[instrument(skip(self, category), fields(category_id = %category.id))]
    async fn create_category(&self, category: &CategoryModel) -> Result<(), AppError> {
        let mut categories = self.categories.write();
        if categories.values().any(|c| c.name == category.name) {
            warn!(name = %category.name, "Category name already taken");
            return Err(AppError::Conflict(format!(
                "Category '{}' already exists",
                category.name
            )));
        }
        categories.insert(category.id, category.clone());

        debug!("Category created in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_category(&self, category_id: Uuid) -> Result<Option<CategoryModel>, AppError> {
        Ok(self.categories.read().get(&category_id).cloned())
    }

    #[instrument(skip(self))]
    async fn list_categories(&self) -> Result<Vec<CategoryModel>, AppError> {
        let mut categories: Vec<CategoryModel> =
            self.categories.read().values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(categories)
    }

    #[instrument(skip(self))]
    async fn exists(&self, category_id: Uuid) -> Result<bool, AppError> {
        Ok(self.categories.read().contains_key(&category_id))
    }
}

/// PostgreSQL implementation of category repository
pub struct PostgresCategoryRepository {
    pool: PgPool,
}

impl PostgresCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    #[instrument(skip(self, category), fields(category_id = %category.id))]
    async fn create_category(&self, category: &CategoryModel) -> Result<(), AppError> {
        debug!("Creating category in database");

        sqlx::query("INSERT INTO categories (id, name, created_at) VALUES ($1, $2, $3)")
            .bind(category.id)
            .bind(&category.name)
            .bind(category.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    warn!(name = %category.name, "Category name already taken");
                    AppError::Conflict(format!("Category '{}' already exists", category.name))
                }
                e => {
                    warn!(error = %e, "Failed to create category in database");
                    AppError::DatabaseError(e.to_string())
                }
            })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_category(&self, category_id: Uuid) -> Result<Option<CategoryModel>, AppError> {
        sqlx::query_as::<_, CategoryModel>(
            "SELECT id, name, created_at FROM categories WHERE id = $1",
        )
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch category");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn list_categories(&self) -> Result<Vec<CategoryModel>, AppError> {
        sqlx::query_as::<_, CategoryModel>(
            "SELECT id, name, created_at FROM categories ORDER BY name, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list categories");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn exists(&self, category_id: Uuid) -> Result<bool, AppError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
                .bind(category_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    warn!(error = %e, "Failed to check category existence");
                    AppError::DatabaseError(e.to_string())
                })?;
        Ok(exists)
    }
}
