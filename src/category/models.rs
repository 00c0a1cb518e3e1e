use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for categories table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct CategoryModel {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl CategoryModel {
    pub fn new(name: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            created_at,
        }
    }
}
