use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for users table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct UserModel {
    pub id: Uuid,
    pub email: String, // Stored normalized, see normalize_email
    pub name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserModel {
    pub fn new(
        email: &str,
        name: String,
        password_hash: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: normalize_email(email),
            name,
            password_hash,
            created_at,
        }
    }
}

/// Canonical form used for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_model_normalizes_email() {
        let user = UserModel::new(
            " Jane@Example.COM",
            "Jane".to_string(),
            "hash".to_string(),
            Utc::now(),
        );

        assert_eq!(user.email, "jane@example.com");
        assert_eq!(user.name, "Jane");
        assert!(!user.id.is_nil());
    }
}
