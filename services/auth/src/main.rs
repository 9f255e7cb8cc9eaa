use anyhow::Result;
use std::sync::Arc;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

mod config;
mod models;
mod rate_limiter;
mod repositories;
mod routes;
mod session;

use common::{
    cache::{RedisConfig, RedisPool},
    database::{self, DatabaseConfig},
    directory::UserDirectory,
};
use tokio::net::TcpListener;

use crate::{
    config::AuthConfig,
    rate_limiter::LoginThrottle,
    repositories::{AccountStore, UserRepository},
    session::SessionManager,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountStore>,
    pub directory: Arc<dyn UserDirectory>,
    pub sessions: SessionManager,
    pub throttle: LoginThrottle,
    pub config: AuthConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting authentication service");

    let config = AuthConfig::from_env()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    // Check database connectivity
    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Initialize Redis connection pool
    let redis_pool = RedisPool::new(&RedisConfig::from_env())?;
    if !redis_pool.health_check().await.unwrap_or(false) {
        warn!("Redis is not reachable yet; logins will fail until it is");
    }

    let repository = Arc::new(UserRepository::new(pool));

    let app_state = AppState {
        accounts: repository.clone(),
        directory: repository,
        sessions: SessionManager::new(Arc::new(redis_pool), config.session_ttl),
        throttle: LoginThrottle::new(config.throttle.clone()),
        config: config.clone(),
    };

    info!("Authentication service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!("Authentication service listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
