use async_trait::async_trait;
use parking_lot::RwLock;
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::models::{PostFilter, PostModel};
use crate::pagination::PageRequest;
use crate::shared::AppError;

/// Trait for post repository operations
#[async_trait]
pub trait PostRepository {
    async fn create_post(&self, post: &PostModel) -> Result<(), AppError>;
    async fn get_post(&self, post_id: Uuid) -> Result<Option<PostModel>, AppError>;
    /// Returns false if the post does not exist
    async fn update_post(&self, post: &PostModel) -> Result<bool, AppError>;
    /// Returns false if the post does not exist
    async fn delete_post(&self, post_id: Uuid) -> Result<bool, AppError>;
    /// One page of posts ordered by `(created_at, id)` plus the filter's total count
    async fn list_posts(
        &self,
        filter: PostFilter,
        page: PageRequest,
    ) -> Result<(Vec<PostModel>, i64), AppError>;
}

/// In-memory implementation of PostRepository for development and testing
pub struct InMemoryPostRepository {
    posts: RwLock<HashMap<Uuid, PostModel>>,
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            posts: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    #[instrument(skip(self, post), fields(post_id = %post.id))]
    async fn create_post(&self, post: &PostModel) -> Result<(), AppError> {
        self.posts.write().insert(post.id, post.clone());
        debug!("Post created in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_post(&self, post_id: Uuid) -> Result<Option<PostModel>, AppError> {
        Ok(self.posts.read().get(&post_id).cloned())
    }

    #[instrument(skip(self, post), fields(post_id = %post.id))]
    async fn update_post(&self, post: &PostModel) -> Result<bool, AppError> {
        let mut posts = self.posts.write();
        match posts.get_mut(&post.id) {
            Some(existing) => {
                *existing = post.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    #[instrument(skip(self))]
    async fn delete_post(&self, post_id: Uuid) -> Result<bool, AppError> {
        Ok(self.posts.write().remove(&post_id).is_some())
    }

    #[instrument(skip(self))]
    async fn list_posts(
        &self,
        filter: PostFilter,
        page: PageRequest,
    ) -> Result<(Vec<PostModel>, i64), AppError> {
        let mut matching: Vec<PostModel> = self
            .posts
            .read()
            .values()
            .filter(|post| filter.matches(post))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        let total = matching.len() as i64;
        Ok((page.window(&matching), total))
    }
}

/// PostgreSQL implementation of post repository
pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const POST_COLUMNS: &str =
    "id, title, content, approved, category_id, user_id, created_at, updated_at";

fn database_error(context: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| {
        warn!(error = %e, "{}", context);
        AppError::DatabaseError(e.to_string())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    #[instrument(skip(self, post), fields(post_id = %post.id))]
    async fn create_post(&self, post: &PostModel) -> Result<(), AppError> {
        debug!("Creating post in database");

        sqlx::query(
            "INSERT INTO posts (id, title, content, approved, category_id, user_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.approved)
        .bind(post.category_id)
        .bind(post.user_id)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                warn!("Post references a missing category or user");
                AppError::NotFound("Referenced category or user not found".to_string())
            }
            e => {
                warn!(error = %e, "Failed to create post in database");
                AppError::DatabaseError(e.to_string())
            }
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_post(&self, post_id: Uuid) -> Result<Option<PostModel>, AppError> {
        sqlx::query_as::<_, PostModel>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
        ))
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("Failed to fetch post"))
    }

    #[instrument(skip(self, post), fields(post_id = %post.id))]
    async fn update_post(&self, post: &PostModel) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE posts SET title = $2, content = $3, category_id = $4, updated_at = $5 WHERE id = $1",
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.category_id)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                warn!("Post update references a missing category");
                AppError::NotFound(format!("Category {} not found", post.category_id))
            }
            e => {
                warn!(error = %e, "Failed to update post in database");
                AppError::DatabaseError(e.to_string())
            }
        })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete_post(&self, post_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&self.pool)
            .await
            .map_err(database_error("Failed to delete post"))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn list_posts(
        &self,
        filter: PostFilter,
        page: PageRequest,
    ) -> Result<(Vec<PostModel>, i64), AppError> {
        const FILTER: &str =
            "($1::uuid IS NULL OR user_id = $1) AND ($2::uuid IS NULL OR category_id = $2)";

        let records = sqlx::query_as::<_, PostModel>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE {FILTER} \
             ORDER BY created_at, id LIMIT $3 OFFSET $4"
        ))
        .bind(filter.user_id())
        .bind(filter.category_id())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("Failed to list posts"))?;

        let (total,): (i64,) =
            sqlx::query_as(&format!("SELECT COUNT(*) FROM posts WHERE {FILTER}"))
                .bind(filter.user_id())
                .bind(filter.category_id())
                .fetch_one(&self.pool)
                .await
                .map_err(database_error("Failed to count posts"))?;

        debug!(returned = records.len(), total, "Listed posts");
        Ok((records, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaginationConfig;
    use chrono::{Duration, Utc};

    fn page(offset: i64, limit: i64) -> PageRequest {
        PageRequest::new(Some(offset), Some(limit), &PaginationConfig::default()).unwrap()
    }

    async fn seed(
        repo: &InMemoryPostRepository,
        count: usize,
        category_id: Uuid,
        user_id: Uuid,
    ) -> Vec<PostModel> {
        let start = Utc::now();
        let mut posts = Vec::new();
        for i in 0..count {
            let post = PostModel::new(
                format!("Post {i}"),
                "Body".to_string(),
                category_id,
                user_id,
                start + Duration::seconds(i as i64),
            );
            repo.create_post(&post).await.unwrap();
            posts.push(post);
        }
        posts
    }

    #[tokio::test]
    async fn test_list_posts_pages_in_creation_order() {
        let repo = InMemoryPostRepository::new();
        let posts = seed(&repo, 25, Uuid::new_v4(), Uuid::new_v4()).await;

        let (records, total) = repo.list_posts(PostFilter::All, page(20, 10)).await.unwrap();

        assert_eq!(total, 25);
        assert_eq!(records, posts[20..].to_vec());
    }

    #[tokio::test]
    async fn test_list_posts_applies_filter_before_total() {
        let repo = InMemoryPostRepository::new();
        let category = Uuid::new_v4();
        let author = Uuid::new_v4();
        seed(&repo, 3, category, author).await;
        seed(&repo, 4, Uuid::new_v4(), Uuid::new_v4()).await;

        let (records, total) = repo
            .list_posts(PostFilter::ByCategory(category), page(0, 10))
            .await
            .unwrap();
        assert_eq!(total, 3);
        assert!(records.iter().all(|p| p.category_id == category));

        let (records, total) = repo
            .list_posts(PostFilter::ByUser(author), page(0, 2))
            .await
            .unwrap();
        assert_eq!(total, 3);
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_same_timestamp_ordered_by_id() {
        let repo = InMemoryPostRepository::new();
        let now = Utc::now();
        let (category, author) = (Uuid::new_v4(), Uuid::new_v4());
        for i in 0..5 {
            let post =
                PostModel::new(format!("Tie {i}"), "Body".to_string(), category, author, now);
            repo.create_post(&post).await.unwrap();
        }

        let (records, _) = repo.list_posts(PostFilter::All, page(0, 10)).await.unwrap();
        let ids: Vec<Uuid> = records.iter().map(|p| p.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_post() {
        let repo = InMemoryPostRepository::new();
        let post = PostModel::new(
            "Ghost".to_string(),
            "Body".to_string(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Utc::now(),
        );

        assert!(!repo.update_post(&post).await.unwrap());
        assert!(!repo.delete_post(post.id).await.unwrap());

        repo.create_post(&post).await.unwrap();
        assert!(repo.delete_post(post.id).await.unwrap());
        assert!(repo.get_post(post.id).await.unwrap().is_none());
    }
}
