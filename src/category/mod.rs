pub use handlers::{create_category, get_category, list_categories};
pub use service::CategoryService;

mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;
