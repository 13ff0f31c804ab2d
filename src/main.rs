use std::time::Duration;

use color_eyre::eyre::Result;
use dotenv::dotenv;
use scoutplan_api::config::ApiConfig;
use scoutplan_db::{
    DbPool, create_pool, repositories::user::delete_expired_sessions, schema::initialize_database,
};

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Removes expired login sessions once an hour.
fn spawn_session_sweeper(db_pool: DbPool) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            match delete_expired_sessions(&db_pool).await {
                Ok(0) => {}
                Ok(removed) => tracing::info!("Removed {} expired sessions", removed),
                Err(e) => tracing::warn!("Failed to remove expired sessions: {}", e),
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;

    // Create database connection pool
    let db_pool = create_pool(&config.database_url, config.database_max_connections).await?;

    // Initialize database schema
    initialize_database(&db_pool).await?;

    spawn_session_sweeper(db_pool.clone());

    // Start API server
    scoutplan_api::start_server(config, db_pool).await?;

    Ok(())
}
