use dotenvy::dotenv;
use event_feedback::config::Config;
use event_feedback::error::StartupError;
use event_feedback::start_server;
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    // Loaded early so RUST_LOG from .env applies to the subscriber.
    dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let config = Config::load().inspect_err(|e| error!("Configuration error: {e}"))?;

    start_server(config)
        .await
        .inspect_err(|e| error!("Server failed: {e}"))
}
