//! Long-lived telemetry feed task.
//!
//! Owns a [`TelemetrySource`], applies accepted readings to the
//! [`SharedContext`] and publishes each accepted payload on a `watch` channel.
//! Stopped explicitly through its `CancellationToken`, or ends on its own when
//! the source reaches EOF or gives up reconnecting.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::{decode_line, TelemetryError, TelemetrySource};
use crate::asset_health::{classify, Vibration};
use crate::context::SharedContext;
use crate::types::TelemetryPayload;

#[derive(Debug, Default)]
struct FeedCounters {
    received: AtomicU64,
    applied: AtomicU64,
    rejected: AtomicU64,
    ignored: AtomicU64,
    mismatches: AtomicU64,
}

/// Message counters for a feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeedStats {
    /// Lines read from the source
    pub received: u64,
    /// Readings written to the context
    pub applied: u64,
    /// Malformed lines and invalid readings
    pub rejected: u64,
    /// Valid messages on another topic
    pub ignored: u64,
    /// Applied readings whose reported status disagreed with the local model
    pub mismatches: u64,
}

impl FeedCounters {
    fn snapshot(&self) -> FeedStats {
        FeedStats {
            received: self.received.load(Ordering::Relaxed),
            applied: self.applied.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            ignored: self.ignored.load(Ordering::Relaxed),
            mismatches: self.mismatches.load(Ordering::Relaxed),
        }
    }
}

/// Handle to a running telemetry feed
pub struct TelemetryFeed {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
    latest: watch::Receiver<Option<TelemetryPayload>>,
    counters: Arc<FeedCounters>,
}

impl TelemetryFeed {
    /// Spawn the feed task.
    ///
    /// `cancel` is typically a child of the process shutdown token.
    pub fn start<S>(
        source: S,
        context: Arc<SharedContext>,
        topic: impl Into<String>,
        cancel: CancellationToken,
    ) -> Self
    where
        S: TelemetrySource + 'static,
    {
        let (tx, rx) = watch::channel(None);
        let counters = Arc::new(FeedCounters::default());
        let worker = FeedWorker {
            context,
            topic: topic.into(),
            tx,
            counters: Arc::clone(&counters),
        };
        let handle = tokio::spawn(worker.run(source, cancel.clone()));

        Self {
            cancel,
            handle,
            latest: rx,
            counters,
        }
    }

    /// Receiver that observes every accepted payload.
    pub fn subscribe(&self) -> watch::Receiver<Option<TelemetryPayload>> {
        self.latest.clone()
    }

    pub fn stats(&self) -> FeedStats {
        self.counters.snapshot()
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Cancel the task and wait for it to finish.
    pub async fn stop(self) -> FeedStats {
        self.cancel.cancel();
        self.join().await
    }

    /// Wait for the task to end on its own (EOF or reconnect exhausted).
    pub async fn join(self) -> FeedStats {
        if let Err(e) = self.handle.await {
            error!(error = %e, "Telemetry feed task panicked");
        }
        self.counters.snapshot()
    }
}

struct FeedWorker {
    context: Arc<SharedContext>,
    topic: String,
    tx: watch::Sender<Option<TelemetryPayload>>,
    counters: Arc<FeedCounters>,
}

impl FeedWorker {
    async fn run<S: TelemetrySource>(self, mut source: S, cancel: CancellationToken) {
        info!(source = source.source_name(), topic = %self.topic, "Telemetry feed started");

        loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    info!("Telemetry feed cancelled");
                    break;
                }
                next = source.next_line() => next,
            };

            match next {
                Ok(Some(line)) => self.handle_line(&line),
                Ok(None) => {
                    info!(source = source.source_name(), "Telemetry source ended");
                    break;
                }
                Err(e) => {
                    error!(source = source.source_name(), error = %e, "Telemetry source failed, feed stopping");
                    break;
                }
            }
        }

        if let Err(e) = source.disconnect().await {
            warn!(error = %e, "Error disconnecting telemetry source");
        }

        let stats = self.counters.snapshot();
        info!(
            received = stats.received,
            applied = stats.applied,
            rejected = stats.rejected,
            ignored = stats.ignored,
            "Telemetry feed stopped"
        );
    }

    fn handle_line(&self, line: &str) {
        self.counters.received.fetch_add(1, Ordering::Relaxed);

        match self.accept(line) {
            Ok(Some(payload)) => {
                self.counters.applied.fetch_add(1, Ordering::Relaxed);
                self.tx.send_replace(Some(payload));
            }
            Ok(None) => {
                self.counters.ignored.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                self.counters.rejected.fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, "Rejected telemetry message, keeping last valid reading");
            }
        }
    }

    /// Decode, filter and apply one line. `Ok(None)` means another topic.
    fn accept(&self, line: &str) -> Result<Option<TelemetryPayload>, TelemetryError> {
        let envelope = decode_line(line)?;
        if envelope.topic != self.topic {
            debug!(topic = %envelope.topic, "Ignoring telemetry on unsubscribed topic");
            return Ok(None);
        }

        let payload = envelope.payload;
        let vibration = Vibration::new(payload.vibration_rms).map_err(crate::context::ContextError::from)?;
        let local = classify(vibration);

        match payload.reported_classification() {
            Some(reported) if reported != local => {
                self.counters.mismatches.fetch_add(1, Ordering::Relaxed);
                warn!(
                    vibration = payload.vibration_rms,
                    reported = %reported,
                    local = %local,
                    "Publisher classification disagrees with local model, using local"
                );
            }
            None => {
                warn!(status = %payload.status, "Unrecognised telemetry status, using local classification");
            }
            Some(_) => {}
        }

        self.context.apply_telemetry(payload.clone())?;
        debug!(vibration = payload.vibration_rms, classification = %local, "Applied telemetry reading");
        Ok(Some(payload))
    }
}
