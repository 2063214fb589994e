//! Writes TypeScript bindings for the sf-protocol types.
//!
//! The web front end consumes `Op`, `Event` and the models they reference.
//! Exporting the two IPC enums pulls in every type they depend on.

use anyhow::{Context, Result};
use clap::Parser;
use sf_protocol::{Event, GlobalConfig, Op, OperationOutcome};
use std::path::{Path, PathBuf};
use ts_rs::TS;

#[derive(Parser, Debug)]
#[command(name = "sf-export-ts", about = "Export sf-protocol TypeScript bindings")]
struct Args {
    /// Directory the `.ts` files are written to.
    #[arg(long, default_value = "bindings")]
    out_dir: PathBuf,
}

fn export_bindings(out_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    Op::export_all_to(out_dir).context("Failed to export Op")?;
    Event::export_all_to(out_dir).context("Failed to export Event")?;
    GlobalConfig::export_all_to(out_dir).context("Failed to export GlobalConfig")?;
    OperationOutcome::export_all_to(out_dir).context("Failed to export OperationOutcome")?;

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    export_bindings(&args.out_dir)?;
    println!("TypeScript bindings written to {}", args.out_dir.display());
    Ok(())
}
