pub use handlers::{create_post, delete_post, get_post, list_posts, update_post};
pub use service::PostService;

mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;
