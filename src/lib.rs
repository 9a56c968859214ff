// src/lib.rs

pub mod batch;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod fs;
pub mod launch;
pub mod logging;
pub mod report;
pub mod types;

use anyhow::Result;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::batch::{plan_batch, run_batch, BatchContext};
use crate::cli::CliArgs;
use crate::config::loader::load_optional;
use crate::config::Settings;
use crate::discovery::AmentIndex;
use crate::fs::{FileSystem, RealFileSystem};
use crate::launch::RealProcessBackend;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI merging
/// - package discovery and the ament index
/// - one supervised run per executable
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_optional(args.config.as_deref())?;
    let settings = Settings::resolve(&args, &cfg)?;
    debug!(?settings, "resolved settings");

    let fs = RealFileSystem;
    let index = AmentIndex::from_env();

    if args.dry_run {
        print_dry_run(&fs, &index, &settings)?;
        return Ok(());
    }

    // Ctrl-C → stop the current run and abort the batch.
    let (interrupt_tx, interrupt_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        info!("Ctrl+C received; shutting down");
        let _ = interrupt_tx.send(true);
    });

    let ctx = BatchContext {
        fs: &fs,
        index: &index,
        settings: &settings,
        interrupt: interrupt_rx,
    };

    let timeouts = settings.shutdown;
    let summary = run_batch(&ctx, |tx| RealProcessBackend::new(tx, timeouts)).await?;

    summary.log();
    Ok(())
}

/// Print packages, executables and the commands that would be run.
fn print_dry_run(fs: &dyn FileSystem, index: &AmentIndex, settings: &Settings) -> Result<()> {
    println!("rosdocgen dry-run");
    println!("  src_path = {}", settings.src_path.display());
    println!("  doc_path = {}", settings.doc_path.display());
    if let Some(ref style) = settings.graph_style {
        println!("  graph_style = {}", style.display());
    }
    println!("  max_duration = {:?}", settings.max_duration);
    println!();

    let planned = plan_batch(fs, index, settings)?;
    println!("packages ({}):", planned.len());
    for entry in &planned {
        println!("  - {} ({})", entry.package.name, entry.package.manifest_path.display());
        match &entry.plans {
            Ok(plans) if plans.is_empty() => println!("      (no executables)"),
            Ok(plans) => {
                for plan in plans {
                    println!("      {} -> {}", plan.executable, plan.doc_dir.display());
                    println!("        node:    {}", plan.node.command_line());
                    println!("        capture: {}", plan.capture.command_line());
                }
            }
            Err(err) => println!("      error: {err}"),
        }
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
