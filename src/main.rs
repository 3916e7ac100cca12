//! Lean Nexus - asset health and strategy alignment server
//!
//! Serves the dashboard view models over HTTP and, optionally, keeps the
//! shared context current from a telemetry feed.
//!
//! # Usage
//!
//! ```bash
//! # Manual mode: readings are set through the API
//! cargo run --release
//!
//! # Live mode: subscribe to a telemetry publisher
//! cargo run --release --bin mock-sensor &
//! cargo run --release -- --telemetry-tcp 127.0.0.1:1883
//!
//! # Live mode from a pipe
//! ./mock-sensor --stdout | ./lean-nexus --stdin
//! ```
//!
//! # Environment Variables
//!
//! - `NEXUS_CONFIG`: Path to the TOML config file (default: ./nexus_config.toml)
//! - `NEXUS_SERVER_ADDR`: HTTP bind address (overridden by `--addr`)
//! - `NEXUS_CORS_ORIGINS`: Comma-separated origins allowed cross-origin
//! - `RUST_LOG`: Logging level (default: info)

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use clap::Parser;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use lean_nexus::api::{create_app, DashboardState};
use lean_nexus::config::{self, NexusConfig};
use lean_nexus::telemetry::{ReaderSource, TcpSubscriber, TelemetryFeed};
use lean_nexus::SharedContext;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "lean-nexus")]
#[command(about = "Lean Nexus asset health and strategy alignment server")]
#[command(version)]
struct CliArgs {
    /// Subscribe to a telemetry publisher (e.g. mock-sensor)
    /// Example: ./lean-nexus --telemetry-tcp 127.0.0.1:1883
    #[arg(long, value_name = "HOST:PORT", conflicts_with = "stdin")]
    telemetry_tcp: Option<String>,

    /// Read telemetry JSON lines from stdin
    /// Use with: ./mock-sensor --stdout | ./lean-nexus --stdin
    #[arg(long)]
    stdin: bool,

    /// Override the server address (default: "0.0.0.0:8501")
    #[arg(short, long)]
    addr: Option<String>,

    /// Config file; takes precedence over NEXUS_CONFIG
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// Task Supervision
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum TaskName {
    HttpServer,
    TelemetryFeed,
}

impl std::fmt::Display for TaskName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskName::HttpServer => write!(f, "HttpServer"),
            TaskName::TelemetryFeed => write!(f, "TelemetryFeed"),
        }
    }
}

/// Spawn the HTTP server task into the JoinSet.
fn spawn_http_server(
    task_set: &mut JoinSet<Result<TaskName>>,
    listener: tokio::net::TcpListener,
    app: Router,
    cancel_token: CancellationToken,
) {
    task_set.spawn(async move {
        info!("[HttpServer] Task starting");

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                cancel_token.cancelled().await;
                info!("[HttpServer] Received shutdown signal");
            })
            .await;

        match result {
            Ok(()) => {
                info!("[HttpServer] Graceful shutdown complete");
                Ok(TaskName::HttpServer)
            }
            Err(e) => {
                error!("[HttpServer] Server error: {}", e);
                Err(anyhow::anyhow!("HTTP server error: {}", e))
            }
        }
    });
}

/// Wait for the feed to finish, on its own or through cancellation.
///
/// A feed that ends (EOF, reconnect exhausted) does not stop the server; the
/// context simply keeps its last valid reading.
fn spawn_feed_watcher(task_set: &mut JoinSet<Result<TaskName>>, feed: TelemetryFeed) {
    task_set.spawn(async move {
        let stats = feed.join().await;
        info!(
            received = stats.received,
            applied = stats.applied,
            rejected = stats.rejected,
            ignored = stats.ignored,
            mismatches = stats.mismatches,
            "[TelemetryFeed] Finished"
        );
        Ok(TaskName::TelemetryFeed)
    });
}

/// Run the supervisor loop: monitor tasks, cancel on failure.
async fn run_supervisor(
    task_set: &mut JoinSet<Result<TaskName>>,
    cancel_token: CancellationToken,
) -> Result<()> {
    info!("Supervisor: All tasks spawned, monitoring...");

    loop {
        tokio::select! {
            () = cancel_token.cancelled() => {
                info!("Supervisor: Shutdown signal received");
                break;
            }
            result = task_set.join_next() => {
                match result {
                    Some(Ok(Ok(task_name))) => {
                        info!("Supervisor: Task {} completed normally", task_name);
                    }
                    Some(Ok(Err(e))) => {
                        error!("Supervisor: Task failed with error: {}", e);
                        cancel_token.cancel();
                        return Err(e);
                    }
                    Some(Err(e)) => {
                        error!("Supervisor: Task panicked: {}", e);
                        cancel_token.cancel();
                        return Err(anyhow::anyhow!("Task panicked: {}", e));
                    }
                    None => {
                        info!("Supervisor: All tasks completed");
                        break;
                    }
                }
            }
        }
    }

    // Drain remaining tasks after cancellation
    let drain = async {
        while let Some(result) = task_set.join_next().await {
            match result {
                Ok(Ok(task_name)) => info!("Supervisor: Task {} stopped", task_name),
                Ok(Err(e)) => warn!("Supervisor: Task stopped with error: {}", e),
                Err(e) => warn!("Supervisor: Task panicked during shutdown: {}", e),
            }
        }
    };
    if tokio::time::timeout(Duration::from_secs(10), drain).await.is_err() {
        warn!("Supervisor: Tasks did not stop within 10s, aborting");
        task_set.abort_all();
    }

    Ok(())
}

// ============================================================================
// Startup
// ============================================================================

fn load_config(path: Option<&PathBuf>) -> Result<NexusConfig> {
    match path {
        Some(p) => NexusConfig::load_from_file(p)
            .with_context(|| format!("Failed to load config from {}", p.display())),
        None => Ok(NexusConfig::load()),
    }
}

/// Resolve the bind address: `--addr`, then `NEXUS_SERVER_ADDR`, then config.
fn resolve_server_addr(cli: Option<String>, config: &NexusConfig) -> String {
    cli.or_else(|| std::env::var("NEXUS_SERVER_ADDR").ok())
        .unwrap_or_else(|| config.server.addr.clone())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    let nexus_config = load_config(args.config.as_ref())?;
    let server_addr = resolve_server_addr(args.addr.clone(), &nexus_config);
    config::init(nexus_config);
    let cfg = config::get();

    info!("Lean Nexus starting");
    info!(
        asset = %cfg.asset.id,
        plant = %cfg.asset.plant,
        base_efficiency = cfg.physics.base_efficiency,
        ideal_power_kw = cfg.physics.ideal_power_kw,
        "Asset configuration"
    );

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    let context = Arc::new(SharedContext::new());
    let mut task_set: JoinSet<Result<TaskName>> = JoinSet::new();

    let feed = if let Some(addr) = args.telemetry_tcp {
        info!("Input: telemetry over TCP from {}", addr);
        let source = TcpSubscriber::from_config(addr, &cfg.telemetry);
        Some(TelemetryFeed::start(
            source,
            Arc::clone(&context),
            cfg.telemetry.topic.clone(),
            cancel_token.child_token(),
        ))
    } else if args.stdin {
        info!("Input: telemetry JSON lines from stdin");
        Some(TelemetryFeed::start(
            ReaderSource::stdin(),
            Arc::clone(&context),
            cfg.telemetry.topic.clone(),
            cancel_token.child_token(),
        ))
    } else {
        info!("Input: manual (set readings via POST /api/v1/context/vibration)");
        None
    };

    let state = DashboardState::from_config(Arc::clone(&context)).with_live(feed.is_some());
    if let Some(feed) = feed {
        spawn_feed_watcher(&mut task_set, feed);
    }

    let listener = tokio::net::TcpListener::bind(&server_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", server_addr))?;
    info!("HTTP server listening on http://{}", server_addr);

    spawn_http_server(&mut task_set, listener, create_app(state), cancel_token.clone());
    run_supervisor(&mut task_set, cancel_token).await?;

    info!("Lean Nexus shutdown complete");
    Ok(())
}
