// Inserts the sample vocabulary into the configured database

use tracing_subscriber::EnvFilter;

use wordsite_api::{
    config::Config,
    db,
    words::{seed::seed_words, WordRepository},
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wordsite_api=info")),
        )
        .with_target(false)
        .init();

    let config = Config::from_env()?;
    let database_url = config
        .database_url
        .as_deref()
        .ok_or("DATABASE_URL must be set to seed the database")?;

    let pool = db::create_pool(database_url, config.db_max_connections).await?;
    db::run_migrations(&pool).await?;

    let report = seed_words(&WordRepository::new(pool)).await?;
    tracing::info!(
        "Seeding complete: {} inserted, {} skipped",
        report.inserted,
        report.skipped
    );
    Ok(())
}
