use anyhow::Context;
use tracing_subscriber::EnvFilter;

use file_browser_lib::config::BrowserConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = BrowserConfig::load().context("failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    file_browser_lib::run(config).await?;
    Ok(())
}
