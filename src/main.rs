use blogcore::{
    auth::start_cleanup_task, build_router, AppConfig, AppState, Clock, Repositories,
    SystemClock,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blogcore=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting blog server");

    let config = AppConfig::from_env();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let repositories = match &config.server.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(database_url)
                .await?;
            sqlx::migrate!().run(&pool).await?;
            info!("Connected to PostgreSQL and applied migrations");
            Repositories::postgres(pool)
        }
        None => {
            warn!("DATABASE_URL not set, using in-memory repositories");
            Repositories::in_memory()
        }
    };

    let refresh_tokens = repositories.refresh_tokens.clone();
    let app_state = AppState::new(repositories, &config, clock.clone())?;

    tokio::spawn(start_cleanup_task(
        refresh_tokens,
        clock,
        config.cleanup.clone(),
    ));

    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    info!("Server running on http://{}", config.server.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
