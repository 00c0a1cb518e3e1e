#![allow(dead_code)] // Not every test file uses every knob

use axum::Router;
use chrono::Duration;
use std::sync::Arc;

use blogcore::{
    auth::CleanupConfig,
    build_router,
    config::{AuthConfig, PaginationConfig, PasswordConfig, ServerConfig},
    AppConfig, AppState, ManualClock, Repositories,
};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub app: Router,
    pub clock: Arc<ManualClock>,
    pub repositories: Repositories,
}

pub struct TestSetupBuilder {
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
    pagination: PaginationConfig,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            access_token_ttl: Duration::minutes(15),
            refresh_token_ttl: Duration::days(7),
            pagination: PaginationConfig::default(),
        }
    }

    pub fn with_access_token_ttl(mut self, ttl: Duration) -> Self {
        self.access_token_ttl = ttl;
        self
    }

    pub fn with_refresh_token_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_token_ttl = ttl;
        self
    }

    pub fn with_pagination(mut self, default_limit: i64, max_limit: i64) -> Self {
        self.pagination = PaginationConfig {
            default_limit,
            max_limit,
        };
        self
    }

    pub fn build(self) -> TestSetup {
        let config = AppConfig {
            server: ServerConfig {
                bind_addr: "127.0.0.1:0".to_string(),
                database_url: None,
            },
            auth: AuthConfig::new(
                "integration-test-secret",
                self.access_token_ttl,
                self.refresh_token_ttl,
            ),
            pagination: self.pagination,
            password: PasswordConfig::insecure_fast(),
            cleanup: CleanupConfig::default(),
        };

        let clock = Arc::new(ManualClock::starting_now());
        let repositories = Repositories::in_memory();
        let state = AppState::new(repositories.clone(), &config, clock.clone())
            .expect("test state should build");

        TestSetup {
            app: build_router(state),
            clock,
            repositories,
        }
    }
}
