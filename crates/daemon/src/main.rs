// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sluice daemon (sluiced)
//!
//! Background process owning the event store, the admission pipeline, and
//! the subscription broker for one data root.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tracing::{error, info, warn};

use sluice_adapters::{
    CounterMetrics, ExprEvaluator, FileSubscriptionSource, HttpEventSink, StaticSchemaRegistry,
    TracedSink,
};
use sluice_broker::{Broker, BrokerDeps, SubscriptionWatcher};
use sluice_core::{SluiceConfig, StoreBackend, SystemClock};
use sluice_daemon::lifecycle::{self, Config, DaemonState, LifecycleError};
use sluice_daemon::server::{self, ServerState};
use sluice_gateway::AdmissionPipeline;
use sluice_store::{EventStore, JournalEventStore, MemoryEventStore};

/// Sluice event mesh daemon
#[derive(Debug, Parser)]
#[command(name = "sluiced", version, about = "Sluice event mesh daemon")]
struct Args {
    /// Data root the daemon serves (defaults to the current directory)
    #[arg(value_name = "ROOT")]
    root: Option<PathBuf>,

    /// Keep all daemon state (journal, lock, log, socket) under this directory
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Path to the configuration file (defaults to ROOT/sluice.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log to stderr instead of the state-dir log file
    #[arg(long)]
    foreground: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let root = match &args.root {
        Some(root) => root.clone(),
        None => std::env::current_dir()?,
    };

    let config = Config::for_root(&root, args.data_dir.as_deref())?;

    // Write the startup marker before tracing setup, so the CLI can find it
    write_startup_marker(&config)?;

    let log_guard = setup_logging(&config, args.foreground)?;

    info!("Starting sluiced for {}", config.root.display());

    let settings_path = args.config.clone().unwrap_or_else(|| config.root.join("sluice.toml"));
    let settings = match SluiceConfig::load(&settings_path) {
        Ok(settings) => settings,
        Err(e) => {
            write_startup_error(&config, &e);
            error!("Failed to load configuration: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    let daemon = match lifecycle::startup(&config) {
        Ok(d) => d,
        Err(e) => {
            // Write the error synchronously (tracing is non-blocking and may not flush in time)
            write_startup_error(&config, &e);
            error!("Failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    match settings.store.backend {
        StoreBackend::Journal => {
            let journal = config.journal_path(&settings.store.journal_file);
            let store =
                match JournalEventStore::open_with_sequencing(&journal, settings.sequencing.clone())
                {
                    Ok(store) => store,
                    Err(e) => {
                        write_startup_error(&config, &e);
                        error!("Failed to open journal: {}", e);
                        daemon.shutdown();
                        drop(log_guard);
                        return Err(e.into());
                    }
                };
            serve(daemon, settings, store).await
        }
        StoreBackend::Memory => {
            let store = MemoryEventStore::with_sequencing(settings.sequencing.clone());
            serve(daemon, settings, store).await
        }
    }
}

/// The daemon's whole serving life, generic over the store backend.
async fn serve<S: EventStore>(
    daemon: DaemonState,
    settings: SluiceConfig,
    store: S,
) -> Result<(), Box<dyn std::error::Error>> {
    let metrics = CounterMetrics::new();

    // A missing catalog is an empty registry; a malformed one refuses to start.
    let catalog_path = daemon.config.root.join("schemas.toml");
    let registry = match StaticSchemaRegistry::load(&catalog_path) {
        Ok(registry) => registry,
        Err(e) => {
            write_startup_error(&daemon.config, &e);
            error!("Failed to load schema catalog: {}", e);
            daemon.shutdown();
            return Err(e.into());
        }
    };

    let pipeline =
        AdmissionPipeline::new(registry, ExprEvaluator::new(), SystemClock, metrics.clone())
            .with_rules(settings.admission.rules.clone());

    let sink = match HttpEventSink::new(settings.broker.delivery_timeout) {
        Ok(sink) => TracedSink::new(sink),
        Err(e) => {
            write_startup_error(&daemon.config, &e);
            error!("Failed to build the delivery client: {}", e);
            daemon.shutdown();
            return Err(e.into());
        }
    };

    let broker = Arc::new(Broker::new(
        BrokerDeps {
            store: store.clone(),
            evaluator: ExprEvaluator::new(),
            sink,
            metrics: metrics.clone(),
        },
        settings.broker.clone(),
    ));

    let mut watcher =
        SubscriptionWatcher::new(FileSubscriptionSource::new(subscriptions_dir(&daemon, &settings)));

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let state = Arc::new(ServerState {
        store,
        pipeline,
        broker: Arc::clone(&broker),
        metrics,
        shutdown: shutdown_tx,
    });

    // Set up signal handlers
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    // First tick fires immediately, loading subscriptions at startup
    let mut poll = tokio::time::interval(settings.broker.poll_interval);

    info!("Daemon ready, listening on {}", daemon.config.socket_path.display());

    // Signal ready for the parent process (the CLI waiting on startup)
    println!("READY");

    // Main event loop
    loop {
        tokio::select! {
            // Accept client connections; each one gets its own task so a
            // long-lived watch never blocks the next request
            result = daemon.listener.accept() => {
                match result {
                    Ok((stream, _)) => {
                        let state = Arc::clone(&state);
                        tokio::spawn(async move {
                            if let Err(e) = server::handle_connection(state, stream).await {
                                error!("Error handling connection: {}", e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                    }
                }
            }

            // Reconcile subscriptions against their documents
            _ = poll.tick() => {
                if let Err(e) = watcher.poll(&broker).await {
                    warn!("Subscription poll failed: {}", e);
                }
            }

            // Shutdown requested via IPC
            _ = shutdown_rx.changed() => {
                info!("Shutdown requested via IPC, shutting down...");
                break;
            }

            // Graceful shutdown on SIGTERM
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                break;
            }

            // Graceful shutdown on SIGINT
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down...");
                break;
            }
        }
    }

    // Broker first, so in-flight deliveries settle before the socket goes
    broker.shutdown().await;
    daemon.shutdown();

    info!("Daemon stopped");
    Ok(())
}

/// Subscription documents live in the state directory by default so every
/// mutable piece of one daemon sits under a single path.
fn subscriptions_dir(daemon: &DaemonState, settings: &SluiceConfig) -> PathBuf {
    let dir = PathBuf::from(&settings.subscriptions.dir);
    if dir.is_absolute() {
        dir
    } else {
        daemon.config.state_dir.join(dir)
    }
}

/// Startup marker prefix written to the log before anything else.
/// The CLI uses it to find where the current startup attempt begins.
/// Full format: "--- sluiced: starting (pid: 12345) ---"
const STARTUP_MARKER_PREFIX: &str = "--- sluiced: starting (pid: ";

/// Write the startup marker to the log file (appends to an existing log)
fn write_startup_marker(config: &Config) -> Result<(), LifecycleError> {
    use std::io::Write;

    // Create the log directory if needed
    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Append the marker with our pid
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;

    Ok(())
}

/// Write a startup error synchronously to the log file.
/// This keeps the error visible to the CLI even if the process exits quickly.
fn write_startup_error(config: &Config, error: &dyn std::fmt::Display) {
    use std::io::Write;

    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR Failed to start daemon: {}", error);
}

fn setup_logging(
    config: &Config,
    foreground: bool,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_env("SLUICE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    if foreground {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
        return Ok(None);
    }

    // Create the log directory if needed
    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Set up the non-blocking file appender
    let file_appender = tracing_appender::rolling::never(
        config.log_path.parent().ok_or(LifecycleError::NoStateDir)?,
        config
            .log_path
            .file_name()
            .ok_or(LifecycleError::NoStateDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(Some(guard))
}
