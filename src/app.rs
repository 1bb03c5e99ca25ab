use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::infrastructure::config::AppConfig;

pub async fn run() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let config = AppConfig::load().map_err(|err| {
        error!(error = %err, "Failed to load configuration");
        std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string())
    })?;
    info!(%config, "Launch configuration");

    let state = crate::infrastructure::bootstrap::setup(&config)
        .await
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err.to_string()))?;

    crate::interfaces::http::start_server(state, &config)?.await
}
