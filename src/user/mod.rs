// Public API - what other modules can use
pub use handlers::{me, signup};
pub use service::UserService;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;
