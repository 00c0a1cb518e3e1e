// Library crate for the blog backend
// This file exposes the public API for integration tests

pub mod auth;
pub mod category;
pub mod clock;
pub mod config;
pub mod pagination;
pub mod post;
pub mod router;
pub mod shared;
pub mod user;

// Re-export commonly used types for easier access in tests
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AppConfig;
pub use pagination::{Page, PageRequest};
pub use router::build_router;
pub use shared::{AppError, AppState, Repositories};
