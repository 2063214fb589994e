//! Main entry point for the sf-tui binary.
//!
//! This executable provides a standalone TUI for sdlc-flow, configured from
//! the current directory's `.sdlc-flow/config.toml`.

use color_eyre::eyre::eyre;
use sf_core::config::load_config;
use sf_tui::run_app;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let root = std::env::current_dir()?;
    let config = load_config(&root).await?;

    run_app(config).await.map_err(|e| eyre!(e))
}
