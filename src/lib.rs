pub mod api;
mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod format;
pub mod location;
pub mod models;
pub mod services;
pub mod state;

use api::http::HttpFileService;
use config::BrowserConfig;
use controller::BrowserController;
use state::BrowserContext;

/// Connects to the configured file service and runs the interactive shell until
/// the user quits or input ends.
pub async fn run(config: BrowserConfig) -> error::Result<()> {
    let service = HttpFileService::new(&config.api_base)?;
    tracing::info!(api_base = %config.api_base, "starting file browser");

    let controller = BrowserController::new(
        service,
        BrowserContext::default(),
        config.double_click_window(),
    );
    commands::shell_commands::run_shell(controller).await
}
