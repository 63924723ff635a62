use std::path::PathBuf;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use taskboard::config::Config;
use taskboard::server;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Optional config file path as the sole argument.
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = Config::load(config_path.as_deref())?;

    server::run(config).await?;
    Ok(())
}
