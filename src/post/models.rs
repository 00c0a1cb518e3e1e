use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for posts table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct PostModel {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub approved: bool,
    pub category_id: Uuid,
    pub user_id: Uuid, // Author
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostModel {
    /// New posts start unapproved
    pub fn new(
        title: String,
        content: String,
        category_id: Uuid,
        user_id: Uuid,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            content,
            approved: false,
            category_id,
            user_id,
            created_at,
            updated_at: created_at,
        }
    }
}

/// Restricts which posts a listing returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    ByUser(Uuid),
    ByCategory(Uuid),
}

impl PostFilter {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            PostFilter::ByUser(id) => Some(*id),
            _ => None,
        }
    }

    pub fn category_id(&self) -> Option<Uuid> {
        match self {
            PostFilter::ByCategory(id) => Some(*id),
            _ => None,
        }
    }

    pub fn matches(&self, post: &PostModel) -> bool {
        match self {
            PostFilter::All => true,
            PostFilter::ByUser(id) => post.user_id == *id,
            PostFilter::ByCategory(id) => post.category_id == *id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_matches() {
        let post = PostModel::new(
            "Title".to_string(),
            "Body".to_string(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Utc::now(),
        );

        assert!(!post.approved);
        assert_eq!(post.created_at, post.updated_at);
        assert!(PostFilter::All.matches(&post));
        assert!(PostFilter::ByUser(post.user_id).matches(&post));
        assert!(PostFilter::ByCategory(post.category_id).matches(&post));
        assert!(!PostFilter::ByUser(post.category_id).matches(&post));
        assert_eq!(PostFilter::ByUser(post.user_id).category_id(), None);
    }
}
