use anyhow::Result;
use tracing::info;

use memorial_site::{config::Config, server};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("memorial_site=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!("Starting memorial site");

    // Load configuration from environment
    let config = Config::from_env()?;
    info!(
        "Default locale {}, serving static files from {}",
        config.default_locale,
        config.static_dir.display()
    );

    server::serve(config).await
}
