//! Foldersync CLI Binary
//!
//! Mirrors a source directory onto a replica, then re-syncs every interval until
//! interrupted.

use anyhow::Context;
use clap::Parser;
use foldersync::bootstrap;
use foldersync::cli::{usage, Cli};
use foldersync::config::{ConfigLoader, SyncConfig};
use foldersync::error::SyncError;
use foldersync::events::{EventSink, TracingSink};
use foldersync::logging::init_logging;
use foldersync::reconcile::Reconciler;
use foldersync::scheduler::{Scheduler, ShutdownHandle};
use std::path::Path;
use std::process;
use std::sync::Arc;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    let Some((source, replica)) = cli.roots() else {
        println!("{}", usage());
        return;
    };

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:#}", e);
            process::exit(1);
        }
    };

    if let Err(e) = init_logging(Some(&config.logging)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("Foldersync starting");

    let sink: Arc<dyn EventSink> = Arc::new(TracingSink);

    let roots = match bootstrap::prepare(&source, &replica, sink.as_ref()) {
        Ok(roots) => roots,
        // Already logged by bootstrap; a missing source is not a crash.
        Err(SyncError::SourceMissing(_)) => return,
        Err(e) => {
            error!("Startup failed: {}", e);
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let shutdown = ShutdownHandle::new();
    if let Err(e) = spawn_signal_listener(shutdown.clone()) {
        error!("Failed to install interrupt handler: {:#}", e);
    }

    let mut scheduler = Scheduler::new(
        roots.source.clone(),
        roots.replica.clone(),
        config.interval(),
        Arc::clone(&sink),
    )
    .with_shutdown(shutdown);
    if cli.once {
        scheduler = scheduler.with_max_passes(1);
    }

    let reconciler = Reconciler::local(Arc::clone(&sink), config.reconcile_options());

    match scheduler.run(|source, replica| reconciler.reconcile(source, replica)) {
        Ok(summary) => {
            info!(passes = summary.passes, "Foldersync stopped");
        }
        // The scheduler has already reported the failure through the sink.
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

/// Merge config files, environment, and CLI flags.
/// Precedence: CLI flags override environment override config files override defaults.
fn build_config(cli: &Cli) -> anyhow::Result<SyncConfig> {
    build_config_with(cli, ConfigLoader::global_config_path().as_deref())
}

fn build_config_with(cli: &Cli, global: Option<&Path>) -> anyhow::Result<SyncConfig> {
    let mut config = ConfigLoader::load_layers(global, cli.config.as_deref())
        .context("Failed to load configuration")?;
    cli.apply_to(&mut config)
        .context("Invalid command-line options")?;
    Ok(config)
}

/// Trigger `shutdown` on Ctrl-C from a dedicated thread
fn spawn_signal_listener(shutdown: ShutdownHandle) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build signal runtime")?;

    std::thread::Builder::new()
        .name("foldersync-signal".to_string())
        .spawn(move || {
            runtime.block_on(async {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Interrupt received");
                    shutdown.trigger();
                }
            });
        })
        .context("Failed to spawn signal thread")?;

    Ok(())
}
