use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::shared::AppState;
use crate::{auth, category, post, user};

/// Builds the HTTP API
///
/// Read endpoints are public. Writes and `/users/me` sit behind `jwt_auth`.
pub fn build_router(state: AppState) -> Router {
    let auth_layer = middleware::from_fn_with_state(state.clone(), auth::jwt_auth);

    let auth_routes = Router::new()
        .route("/signin", post(auth::signin))
        .route("/signup", post(user::signup))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout));

    let public_routes = Router::new()
        .route("/categories", get(category::list_categories))
        .route("/categories/:id", get(category::get_category))
        .route("/posts", get(post::list_posts))
        .route("/posts/:id", get(post::get_post));

    let protected_routes = Router::new()
        .route("/users/me", get(user::me))
        .route("/categories", post(category::create_category))
        .route("/posts", post(post::create_post))
        .route("/posts/:id", put(post::update_post).delete(post::delete_post))
        .route_layer(auth_layer);

    let api = Router::new()
        .nest("/auth", auth_routes)
        .merge(public_routes)
        .merge(protected_routes);

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
