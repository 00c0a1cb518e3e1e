use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use chrono::Duration;
use tracing::warn;

use crate::auth::CleanupConfig;

const DEV_JWT_SECRET: &str = "your-secret-key-change-in-production";

/// Upper bounds accepted from the environment for token lifetimes
const MAX_ACCESS_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;
const MAX_REFRESH_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// Process-wide configuration, read once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub pagination: PaginationConfig,
    pub password: PasswordConfig,
    pub cleanup: CleanupConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            auth: AuthConfig::from_env(),
            pagination: PaginationConfig::from_env(),
            password: PasswordConfig::from_env(),
            cleanup: CleanupConfig {
                cleanup_interval: StdDuration::from_secs(env_or(
                    "TOKEN_CLEANUP_INTERVAL_SECS",
                    60 * 60,
                )),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// When unset the server runs on in-memory repositories
    pub database_url: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            database_url: std::env::var("DATABASE_URL").ok(),
        }
    }
}

/// Signing key and token lifetimes
#[derive(Clone)]
pub struct AuthConfig {
    jwt_secret: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: impl Into<String>,
        access_token_ttl: Duration,
        refresh_token_ttl: Duration,
    ) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            access_token_ttl,
            refresh_token_ttl,
        }
    }

    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            warn!("JWT_SECRET not set, falling back to the development secret");
            DEV_JWT_SECRET.to_string()
        });

        Self::new(
            jwt_secret,
            ttl_from_env("ACCESS_TOKEN_TTL_SECS", 60 * 60, MAX_ACCESS_TOKEN_TTL_SECS),
            ttl_from_env(
                "REFRESH_TOKEN_TTL_SECS",
                7 * 24 * 60 * 60,
                MAX_REFRESH_TOKEN_TTL_SECS,
            ),
        )
    }

    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .finish()
    }
}

/// Bounds applied to every list endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    pub default_limit: i64,
    pub max_limit: i64,
}

impl PaginationConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let max_limit = env_or("PAGINATION_MAX_LIMIT", defaults.max_limit).max(1);
        let default_limit = env_or("PAGINATION_DEFAULT_LIMIT", defaults.default_limit)
            .clamp(1, max_limit);

        Self {
            default_limit,
            max_limit,
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl PasswordConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            memory_kib: env_or("ARGON2_MEMORY_KIB", defaults.memory_kib),
            iterations: env_or("ARGON2_ITERATIONS", defaults.iterations),
            parallelism: env_or("ARGON2_PARALLELISM", defaults.parallelism),
        }
    }

    /// Smallest parameters Argon2 accepts. Only for tests.
    pub fn insecure_fast() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

/// Token lifetime in whole seconds, in `1..=max_secs`
fn ttl_from_env(key: &str, default_secs: i64, max_secs: i64) -> Duration {
    let secs = env_or(key, default_secs);
    if secs <= 0 || secs > max_secs {
        warn!(
            key = key,
            value = secs,
            max = max_secs,
            default = default_secs,
            "Token lifetime out of range, using default"
        );
        return Duration::seconds(default_secs);
    }
    Duration::seconds(secs)
}

fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key = key, value = %raw, default = %default, "Invalid value, using default");
            default
        }),
        Err(_) => default,
    }
}
