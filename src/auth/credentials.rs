use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::RngCore;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::config::PasswordConfig;
use crate::shared::AppError;
use crate::user::models::{normalize_email, UserModel};
use crate::user::repository::UserRepository;

/// The only message a failed login ever produces
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub fn invalid_credentials() -> AppError {
    AppError::Authentication(INVALID_CREDENTIALS.to_string())
}

/// Argon2id hashing with a per-password random salt
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new(config: &PasswordConfig) -> Result<Self, AppError> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| AppError::Internal(format!("Invalid Argon2 parameters: {e}")))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Produces a PHC string for storage
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let mut salt_bytes = [0u8; 16];
        rand::rng().fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| AppError::Internal(format!("Failed to encode salt: {e}")))?;

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
    }

    /// Constant-time check of `password` against a stored PHC string
    ///
    /// Cost parameters are taken from the stored hash, not from this hasher.
    pub fn verify(&self, hash: &str, password: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => self
                .argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// [`Self::hash`] on the blocking pool
    pub async fn spawn_hash(self: Arc<Self>, password: String) -> Result<String, AppError> {
        tokio::task::spawn_blocking(move || self.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {e}")))?
    }

    /// [`Self::verify`] on the blocking pool
    pub async fn spawn_verify(
        self: Arc<Self>,
        hash: String,
        password: String,
    ) -> Result<bool, AppError> {
        tokio::task::spawn_blocking(move || self.verify(&hash, &password))
            .await
            .map_err(|e| AppError::Internal(format!("Password verification task failed: {e}")))
    }
}

/// Checks submitted email/password pairs against stored users
///
/// Unknown email and wrong password return the same error, and both run
/// exactly one Argon2 verification so their cost is the same.
pub struct CredentialVerifier {
    users: Arc<dyn UserRepository + Send + Sync>,
    hasher: Arc<PasswordHasher>,
    dummy_hash: String,
}

impl CredentialVerifier {
    pub fn new(
        users: Arc<dyn UserRepository + Send + Sync>,
        hasher: Arc<PasswordHasher>,
    ) -> Result<Self, AppError> {
        let dummy_hash = hasher.hash("placeholder-password-for-unknown-users")?;

        Ok(Self {
            users,
            hasher,
            dummy_hash,
        })
    }

    #[instrument(skip(self, password))]
    pub async fn verify(&self, email: &str, password: &str) -> Result<UserModel, AppError> {
        let email = normalize_email(email);

        match self.users.find_by_email(&email).await? {
            Some(user) => {
                let matches = Arc::clone(&self.hasher)
                    .spawn_verify(user.password_hash.clone(), password.to_string())
                    .await?;
                if matches {
                    debug!(user_id = %user.id, "Credentials verified");
                    Ok(user)
                } else {
                    debug!(user_id = %user.id, "Password mismatch");
                    Err(invalid_credentials())
                }
            }
            None => {
                Arc::clone(&self.hasher)
                    .spawn_verify(self.dummy_hash.clone(), password.to_string())
                    .await?;
                debug!("No user registered for email");
                Err(invalid_credentials())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::repository::InMemoryUserRepository;
    use chrono::Utc;
    use uuid::Uuid;

    fn hasher() -> Arc<PasswordHasher> {
        Arc::new(PasswordHasher::new(&PasswordConfig::insecure_fast()).unwrap())
    }

    async fn verifier_with_user(email: &str, password: &str) -> (CredentialVerifier, UserModel) {
        let hasher = hasher();
        let repo = Arc::new(InMemoryUserRepository::new());
        let user = UserModel {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: "Test User".to_string(),
            password_hash: hasher.hash(password).unwrap(),
            created_at: Utc::now(),
        };
        repo.create_user(&user).await.unwrap();

        (CredentialVerifier::new(repo, hasher).unwrap(), user)
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hasher = hasher();
        let hash = hasher.hash("correct horse").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify(&hash, "correct horse"));
        assert!(!hasher.verify(&hash, "wrong horse"));
    }

    #[test]
    fn test_same_password_gets_different_salts() {
        let hasher = hasher();
        let first = hasher.hash("password123").unwrap();
        let second = hasher.hash("password123").unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_spawned_hash_and_verify() {
        let hasher = hasher();
        let hash = Arc::clone(&hasher)
            .spawn_hash("correct horse".to_string())
            .await
            .unwrap();

        assert!(Arc::clone(&hasher)
            .spawn_verify(hash.clone(), "correct horse".to_string())
            .await
            .unwrap());
        assert!(!hasher
            .spawn_verify(hash, "wrong horse".to_string())
            .await
            .unwrap());
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(!hasher().verify("not-a-phc-string", "password"));
    }

    #[test]
    fn test_invalid_argon2_params() {
        let config = PasswordConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        };
        assert!(matches!(
            PasswordHasher::new(&config),
            Err(AppError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn test_verify_valid_credentials() {
        let (verifier, user) = verifier_with_user("alice@example.com", "password123").await;

        let verified = verifier
            .verify("alice@example.com", "password123")
            .await
            .unwrap();
        assert_eq!(verified.id, user.id);
    }

    #[tokio::test]
    async fn test_verify_normalizes_email() {
        let (verifier, user) = verifier_with_user("alice@example.com", "password123").await;

        let verified = verifier
            .verify("  Alice@Example.COM ", "password123")
            .await
            .unwrap();
        assert_eq!(verified.id, user.id);
    }

    #[tokio::test]
    async fn test_unknown_email_and_wrong_password_are_indistinguishable() {
        let (verifier, _) = verifier_with_user("alice@example.com", "password123").await;

        let wrong_password = verifier
            .verify("alice@example.com", "not-the-password")
            .await
            .unwrap_err();
        let unknown_email = verifier
            .verify("nobody@example.com", "password123")
            .await
            .unwrap_err();

        assert_eq!(wrong_password, unknown_email);
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert_eq!(wrong_password, invalid_credentials());
    }
}
