use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use wordsite_api::{
    auth::{InMemoryUserRepository, TokenService, UserRepository},
    config::Config,
    create_router, db,
    words::{seed::seed_words, InMemoryWordRepository, WordRepository},
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("wordsite_api=debug,tower_http=info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Wordsite API - Starting...");

    let config = Config::from_env()?;
    let tokens = TokenService::with_ttl(&config.jwt_secret, config.jwt_ttl_seconds);

    let state = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let pool = db::create_pool(database_url, config.db_max_connections).await?;
            db::run_migrations(&pool).await?;

            AppState::new(
                Arc::new(UserRepository::new(pool.clone())),
                Arc::new(WordRepository::new(pool)),
                tokens,
                config.environment.clone(),
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory stores, data is lost on exit");
            let words = InMemoryWordRepository::new();
            seed_words(&words).await?;

            AppState::new(
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(words),
                tokens,
                config.environment.clone(),
            )
        }
    };

    let app = create_router(state, &config.allowed_origins);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Wordsite API is running on http://{} ({})", addr, config.environment);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
