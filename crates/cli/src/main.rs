mod headless;
mod output;

use clap::{Parser, Subcommand};
use color_eyre::eyre::eyre;
use headless::RunArgs;
use sf_core::config::load_config;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sdlc-flow",
    about = "Drive a selection of SDLC agents through a sequential pipeline",
    version
)]
struct Cli {
    /// Project root holding `.sdlc-flow/config.toml` (default: current directory)
    #[arg(long, global = true, env = "SDLC_FLOW_ROOT")]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the selected agents end-to-end without the terminal UI
    Run(RunArgs),
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };

    match cli.command {
        // Without a subcommand, launch the TUI
        None => {
            let config = load_config(&root).await?;
            sf_tui::run_app(config).await.map_err(|e| eyre!(e))
        }
        Some(Commands::Run(args)) => {
            init_tracing(args.verbose);
            headless::run(&root, args).await.map_err(|e| eyre!(e))
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG` on top of the default level.
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
