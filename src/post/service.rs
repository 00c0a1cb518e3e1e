use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{
    models::{PostFilter, PostModel},
    repository::PostRepository,
    types::{CreatePostRequest, PostListQuery, PostResponse, UpdatePostRequest},
};
use crate::category::repository::CategoryRepository;
use crate::clock::Clock;
use crate::config::PaginationConfig;
use crate::pagination::{Page, PageRequest};
use crate::shared::AppError;
use crate::user::repository::UserRepository;

const MAX_TITLE_LEN: usize = 200;

/// Service for managing posts
pub struct PostService {
    posts: Arc<dyn PostRepository + Send + Sync>,
    categories: Arc<dyn CategoryRepository + Send + Sync>,
    users: Arc<dyn UserRepository + Send + Sync>,
    clock: Arc<dyn Clock>,
    pagination: PaginationConfig,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository + Send + Sync>,
        categories: Arc<dyn CategoryRepository + Send + Sync>,
        users: Arc<dyn UserRepository + Send + Sync>,
        clock: Arc<dyn Clock>,
        pagination: PaginationConfig,
    ) -> Self {
        Self {
            posts,
            categories,
            users,
            clock,
            pagination,
        }
    }

    /// Creates an unapproved post owned by `author_id`
    #[instrument(skip(self, request))]
    pub async fn create_post(
        &self,
        author_id: Uuid,
        request: CreatePostRequest,
    ) -> Result<PostResponse, AppError> {
        let (title, content) = validate_post(&request.title, &request.content)?;
        self.ensure_category(request.category_id).await?;

        let post = PostModel::new(
            title,
            content,
            request.category_id,
            author_id,
            self.clock.now(),
        );
        self.posts.create_post(&post).await?;

        info!(post_id = %post.id, category_id = %post.category_id, "Post created");
        Ok(post.into())
    }

    #[instrument(skip(self))]
    pub async fn get_post(&self, post_id: Uuid) -> Result<PostResponse, AppError> {
        self.find_post(post_id).await.map(PostResponse::from)
    }

    /// Lists one page of posts, optionally restricted to a user or a category
    #[instrument(skip(self))]
    pub async fn list_posts(&self, query: PostListQuery) -> Result<Page<PostResponse>, AppError> {
        let page = PageRequest::new(query.offset, query.limit, &self.pagination)?;

        let filter = match (query.user_id, query.category_id) {
            (Some(_), Some(_)) => {
                return Err(AppError::Validation(
                    "filter by either userId or categoryId, not both".to_string(),
                ))
            }
            (Some(user_id), None) => {
                if self.users.find_by_id(user_id).await?.is_none() {
                    warn!(%user_id, "Listing posts for unknown user");
                    return Err(AppError::NotFound(format!("User {} not found", user_id)));
                }
                PostFilter::ByUser(user_id)
            }
            (None, Some(category_id)) => {
                self.ensure_category(category_id).await?;
                PostFilter::ByCategory(category_id)
            }
            (None, None) => PostFilter::All,
        };

        let (records, total) = self.posts.list_posts(filter, page).await?;
        debug!(
            returned = records.len(),
            total,
            offset = page.offset(),
            limit = page.limit(),
            "Posts page fetched"
        );

        Ok(Page::new(records, page, total).map(PostResponse::from))
    }

    /// Replaces title, content and category, bumping `updated_at`
    #[instrument(skip(self, request))]
    pub async fn update_post(
        &self,
        post_id: Uuid,
        request: UpdatePostRequest,
    ) -> Result<PostResponse, AppError> {
        let (title, content) = validate_post(&request.title, &request.content)?;
        let mut post = self.find_post(post_id).await?;
        self.ensure_category(request.category_id).await?;

        post.title = title;
        post.content = content;
        post.category_id = request.category_id;
        post.updated_at = self.clock.now();

        if !self.posts.update_post(&post).await? {
            return Err(not_found(post_id));
        }

        info!(%post_id, "Post updated");
        Ok(post.into())
    }

    #[instrument(skip(self))]
    pub async fn delete_post(&self, post_id: Uuid) -> Result<(), AppError> {
        if !self.posts.delete_post(post_id).await? {
            return Err(not_found(post_id));
        }

        info!(%post_id, "Post deleted");
        Ok(())
    }

    async fn find_post(&self, post_id: Uuid) -> Result<PostModel, AppError> {
        self.posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| not_found(post_id))
    }

    async fn ensure_category(&self, category_id: Uuid) -> Result<(), AppError> {
        if self.categories.exists(category_id).await? {
            Ok(())
        } else {
            warn!(%category_id, "Unknown category referenced");
            Err(AppError::NotFound(format!(
                "Category {} not found",
                category_id
            )))
        }
    }
}

fn not_found(post_id: Uuid) -> AppError {
    AppError::NotFound(format!("Post {} not found", post_id))
}

/// Returns the trimmed title and the content
fn validate_post(title: &str, content: &str) -> Result<(String, String), AppError> {
    let title = title.trim();
    let len = title.chars().count();
    if len == 0 || len > MAX_TITLE_LEN {
        return Err(AppError::Validation(format!(
            "title must be between 1 and {MAX_TITLE_LEN} characters"
        )));
    }
    if content.trim().is_empty() {
        return Err(AppError::Validation("content must not be empty".to_string()));
    }
    Ok((title.to_string(), content.to_string()))
}
