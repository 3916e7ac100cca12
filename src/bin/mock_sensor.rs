//! Mock vibration sensor for pump P-101
//!
//! Publishes a simulated telemetry message every interval on the pump topic,
//! either to every connected TCP subscriber or as JSON lines on stdout.
//!
//! # Usage
//!
//! ```bash
//! # Serve subscribers on 127.0.0.1:1883
//! ./mock-sensor
//!
//! # Pipe straight into the server
//! ./mock-sensor --stdout | ./lean-nexus --stdin
//!
//! # Reproducible run, 10 messages, fast
//! ./mock-sensor --stdout --seed 42 --count 10 --interval-ms 100
//! ```

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use lean_nexus::config::defaults::{MOCK_SENSOR_ADDR, MOCK_SENSOR_INTERVAL_MS};
use lean_nexus::telemetry::{encode_line, MockSensor};
use lean_nexus::{TelemetryEnvelope, PUMP_TELEMETRY_TOPIC};

#[derive(Parser, Debug)]
#[command(name = "mock-sensor")]
#[command(about = "Simulated pump vibration telemetry publisher")]
#[command(version)]
struct CliArgs {
    /// Address to serve subscribers on
    #[arg(long, default_value = MOCK_SENSOR_ADDR)]
    addr: String,

    /// Write JSON lines to stdout instead of serving TCP subscribers
    #[arg(long)]
    stdout: bool,

    /// Publishing interval in milliseconds
    #[arg(long, default_value_t = MOCK_SENSOR_INTERVAL_MS)]
    interval_ms: u64,

    /// RNG seed for reproducible readings
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many messages
    #[arg(long)]
    count: Option<u64>,

    /// Topic to publish on
    #[arg(long, default_value = PUMP_TELEMETRY_TOPIC)]
    topic: String,
}

/// Forward broadcast lines to one subscriber until it disconnects.
async fn serve_subscriber(mut socket: TcpStream, mut rx: broadcast::Receiver<String>, cancel: CancellationToken) {
    let peer = socket
        .peer_addr()
        .map_or_else(|_| "unknown".to_string(), |a| a.to_string());
    info!(peer = %peer, "Subscriber connected");

    loop {
        let line = tokio::select! {
            () = cancel.cancelled() => break,
            msg = rx.recv() => match msg {
                Ok(line) => line,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(peer = %peer, skipped, "Subscriber lagging, dropped messages");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        };

        if let Err(e) = socket.write_all(line.as_bytes()).await {
            info!(peer = %peer, error = %e, "Subscriber disconnected");
            return;
        }
    }

    let _ = socket.shutdown().await;
    info!(peer = %peer, "Subscriber closed");
}

/// Accept subscribers and hand each a broadcast receiver.
async fn accept_loop(listener: TcpListener, tx: broadcast::Sender<String>, cancel: CancellationToken) {
    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((socket, _)) => {
                    tokio::spawn(serve_subscriber(socket, tx.subscribe(), cancel.clone()));
                }
                Err(e) => warn!(error = %e, "Accept failed"),
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for --stdout piping
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, stopping publisher...");
        shutdown.cancel();
    });

    let (tx, _) = broadcast::channel::<String>(64);
    if args.stdout {
        info!(topic = %args.topic, "Publishing to stdout");
    } else {
        let listener = TcpListener::bind(&args.addr)
            .await
            .with_context(|| format!("Failed to bind to {}", args.addr))?;
        info!(address = %args.addr, topic = %args.topic, "Publishing to TCP subscribers");
        tokio::spawn(accept_loop(listener, tx.clone(), cancel.clone()));
    }

    let mut sensor = MockSensor::new(args.seed);
    let mut stdout = tokio::io::stdout();
    let mut ticker = tokio::time::interval(Duration::from_millis(args.interval_ms.max(1)));
    let mut published: u64 = 0;

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let payload = sensor.sample();
        info!(
            vibration = payload.vibration_rms,
            status = %payload.status,
            dominant_freq = %payload.dominant_freq,
            "Publishing"
        );
        let line = encode_line(&TelemetryEnvelope::new(args.topic.clone(), payload))?;

        if args.stdout {
            stdout
                .write_all(line.as_bytes())
                .await
                .context("Failed to write to stdout")?;
            stdout.flush().await.context("Failed to flush stdout")?;
        } else {
            // No subscribers is not an error
            let receivers = tx.send(line).unwrap_or(0);
            debug!(receivers, "Broadcast message");
        }

        published += 1;
        if args.count.is_some_and(|n| published >= n) {
            info!(published, "Message count reached");
            break;
        }
    }

    cancel.cancel();
    info!(published, "Mock sensor stopped");
    Ok(())
}
