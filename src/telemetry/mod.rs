//! Telemetry Module - pump vibration feed
//!
//! Readings arrive as JSON lines, one [`TelemetryEnvelope`](crate::types::TelemetryEnvelope)
//! per line. A [`TelemetrySource`] yields raw lines; the [`TelemetryFeed`]
//! decodes them, filters on topic, validates the reading and applies it to
//! the shared context.
//!
//! ## Sources
//!
//! - **TcpSubscriber**: connects to a publisher (e.g. `mock-sensor`) with
//!   keepalive, read timeout and exponential-backoff reconnect
//! - **ReaderSource**: any async reader, typically stdin for
//!   `mock-sensor --stdout | lean-nexus --stdin`

mod codec;
mod feed;
mod mock;
mod reader_source;
mod tcp;

pub use codec::{decode_line, encode_line};
pub use feed::{FeedStats, TelemetryFeed};
pub use mock::MockSensor;
pub use reader_source::ReaderSource;
pub use tcp::{TcpSubscriber, TcpSubscriberStats};

use async_trait::async_trait;
use thiserror::Error;

/// Telemetry feed errors
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Timeout waiting for telemetry")]
    Timeout,

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Malformed telemetry message: {0}")]
    Malformed(String),

    #[error("Telemetry rejected: {0}")]
    Rejected(#[from] crate::context::ContextError),
}

/// Source of raw telemetry lines
#[async_trait]
pub trait TelemetrySource: Send {
    /// Open the underlying stream
    async fn connect(&mut self) -> Result<(), TelemetryError>;

    /// Next line, or `None` once the stream has ended for good
    async fn next_line(&mut self) -> Result<Option<String>, TelemetryError>;

    /// Close the underlying stream
    async fn disconnect(&mut self) -> Result<(), TelemetryError>;

    /// Get the source name for logging
    fn source_name(&self) -> &'static str;
}
