use anyhow::Context;
use tracing::warn;

use fraudlens::config::Config;
use fraudlens::logging;
use fraudlens::web::{start_web_server, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Pick up a local .env first so SILICON_API_KEY can live outside the shell.
    dotenvy::dotenv().ok();
    logging::init_console_logging();

    let config = Config::load().context("failed to load configuration")?;
    if config.api_key.trim().is_empty() {
        warn!("SILICON_API_KEY is not set; remote API calls will be rejected by the provider");
    }

    start_web_server(AppState::new(config)).await
}
