use anyhow::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use mailer::{config::MailerConfig, dispatcher::Mailer, routes};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting mailer service");

    let config = MailerConfig::from_env()?;
    let mailer = Mailer::from_config(&config);
    if !mailer.is_configured() {
        warn!("RESEND_API_KEY is not set; password reset emails will not be sent");
    }

    let app = routes::create_router(Arc::new(mailer));

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!("Mailer service listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
