use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    models::{normalize_email, UserModel},
    repository::UserRepository,
    types::{SignupRequest, UserResponse},
};
use crate::auth::credentials::PasswordHasher;
use crate::clock::Clock;
use crate::shared::AppError;

const MIN_PASSWORD_LEN: usize = 8;
const MAX_NAME_LEN: usize = 100;

/// Service for user registration and lookup
pub struct UserService {
    repository: Arc<dyn UserRepository + Send + Sync>,
    password_hasher: Arc<PasswordHasher>,
    clock: Arc<dyn Clock>,
}

impl UserService {
    pub fn new(
        repository: Arc<dyn UserRepository + Send + Sync>,
        password_hasher: Arc<PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            password_hasher,
            clock,
        }
    }

    /// Registers a new user with a hashed password
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: SignupRequest) -> Result<UserResponse, AppError> {
        validate_signup(&request)?;

        let password_hash = Arc::clone(&self.password_hasher)
            .spawn_hash(request.password)
            .await?;
        let user = UserModel::new(
            &request.email,
            request.name.trim().to_string(),
            password_hash,
            self.clock.now(),
        );
        self.repository.create_user(&user).await?;

        info!(user_id = %user.id, "User registered");
        Ok(user.into())
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: Uuid) -> Result<UserResponse, AppError> {
        self.repository
            .find_by_id(user_id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }
}

fn validate_signup(request: &SignupRequest) -> Result<(), AppError> {
    let email = normalize_email(&request.email);
    let valid_email = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };
    if !valid_email {
        return Err(AppError::Validation("email is not a valid address".to_string()));
    }

    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let name_len = request.name.trim().chars().count();
    if name_len == 0 || name_len > MAX_NAME_LEN {
        return Err(AppError::Validation(format!(
            "name must be between 1 and {MAX_NAME_LEN} characters"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::PasswordConfig;
    use crate::user::repository::InMemoryUserRepository;
    use rstest::rstest;

    fn service_with_clock(clock: Arc<ManualClock>) -> UserService {
        UserService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(PasswordHasher::new(&PasswordConfig::insecure_fast()).unwrap()),
            clock,
        )
    }

    fn service() -> UserService {
        service_with_clock(Arc::new(ManualClock::starting_now()))
    }

    fn signup(email: &str, password: &str, name: &str) -> SignupRequest {
        SignupRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_and_get_user() {
        let service = service();

        let registered = service
            .register(signup("New@Example.com", "password123", " Newcomer "))
            .await
            .unwrap();
        assert_eq!(registered.email, "new@example.com");
        assert_eq!(registered.name, "Newcomer");

        let fetched = service.get_user(registered.id).await.unwrap();
        assert_eq!(fetched, registered);
    }

    #[tokio::test]
    async fn test_register_uses_clock_for_created_at() {
        let clock = Arc::new(ManualClock::starting_now());
        clock.advance(chrono::Duration::days(3));
        let service = service_with_clock(clock.clone());

        let registered = service
            .register(signup("clock@example.com", "password123", "Clock"))
            .await
            .unwrap();
        assert_eq!(registered.created_at, clock.now());
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let service = service();
        service
            .register(signup("dup@example.com", "password123", "First"))
            .await
            .unwrap();

        let result = service
            .register(signup("DUP@example.com", "password456", "Second"))
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_get_unknown_user() {
        let result = service().get_user(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[rstest]
    #[case("no-at-sign", "password123", "Name")]
    #[case("@example.com", "password123", "Name")]
    #[case("user@", "password123", "Name")]
    #[case("a@b@c", "password123", "Name")]
    #[case("user@example.com", "short", "Name")]
    #[case("user@example.com", "password123", "   ")]
    fn test_signup_validation_rejects(
        #[case] email: &str,
        #[case] password: &str,
        #[case] name: &str,
    ) {
        let result = validate_signup(&signup(email, password, name));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_signup_validation_rejects_long_name() {
        let name = "x".repeat(MAX_NAME_LEN + 1);
        let result = validate_signup(&signup("user@example.com", "password123", &name));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
