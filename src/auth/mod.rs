// Public API - what other modules can use
pub use cleanup_task::{start_cleanup_task, CleanupConfig};
pub use handlers::{logout, refresh, signin};
pub use middleware::jwt_auth;
pub use types::{AuthenticatedUser, SessionResponse};

// Internal modules
mod cleanup_task;
pub mod credentials;
pub mod generators;
mod handlers;
mod middleware;
pub mod models;
pub mod repository;
pub mod service;
pub mod token;
pub mod types;
