use async_trait::async_trait;
use parking_lot::RwLock;
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::models::UserModel;
use crate::shared::AppError;

/// Trait for user repository operations
#[async_trait]
pub trait UserRepository {
    /// Fails with `Conflict` if the email is already registered
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError>;
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserModel>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError>;
}

/// In-memory implementation of UserRepository for development and testing
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, UserModel>>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    pub fn user_count(&self) -> usize {
        self.users.read().len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError> {
        let mut users = self.users.write();
        if users.values().any(|existing| existing.email == user.email) {
            warn!("Email already registered in memory");
            return Err(AppError::Conflict("Email is already registered".to_string()));
        }
        users.insert(user.id, user.clone());

        debug!("User created in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserModel>, AppError> {
        Ok(self.users.read().get(&user_id).cloned())
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        let users = self.users.read();
        Ok(users.values().find(|user| user.email == email).cloned())
    }
}

/// PostgreSQL implementation of user repository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create_user(&self, user: &UserModel) -> Result<(), AppError> {
        debug!("Creating user in database");

        sqlx::query(
            "INSERT INTO users (id, email, name, password_hash, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                warn!("Email already registered in database");
                AppError::Conflict("Email is already registered".to_string())
            }
            e => {
                warn!(error = %e, "Failed to create user in database");
                AppError::DatabaseError(e.to_string())
            }
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<UserModel>, AppError> {
        sqlx::query_as::<_, UserModel>(
            "SELECT id, email, name, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch user by id");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        sqlx::query_as::<_, UserModel>(
            "SELECT id, email, name, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch user by email");
            AppError::DatabaseError(e.to_string())
        })
    }
}
