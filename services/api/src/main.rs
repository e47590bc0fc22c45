use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use api::{
    AppState, config::ApiConfig, live, middleware::TokenVerifier, routes,
};
use common::database::{self, DatabaseConfig};
use news::{NewsAggregator, NewsConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting API service");

    let config = ApiConfig::from_env()?;

    let db_config = DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    database::run_migrations(&pool).await?;

    let verifier = TokenVerifier::new(&config.jwt_public_key)?;
    let aggregator = NewsAggregator::from_config(&NewsConfig::from_env())?;
    info!("News feed configured with {} sources", aggregator.source_count());

    let app_state = AppState::new(pool.clone(), verifier, aggregator);
    live::spawn_listener(pool, app_state.live.clone());

    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("API service listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
