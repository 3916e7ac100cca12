//! TCP telemetry subscriber with reconnection and timeout resilience.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use super::{TelemetryError, TelemetrySource};
use crate::config::defaults::{
    TELEMETRY_CONNECT_TIMEOUT_SECS, TELEMETRY_INITIAL_RECONNECT_DELAY_SECS,
    TELEMETRY_MAX_RECONNECT_ATTEMPTS, TELEMETRY_MAX_RECONNECT_DELAY_SECS,
    TELEMETRY_READ_TIMEOUT_SECS,
};

/// Subscribes to a JSON-lines telemetry publisher over TCP
pub struct TcpSubscriber {
    addr: String,
    stream: Option<BufReader<TcpStream>>,
    line_buffer: String,
    read_timeout: Duration,
    max_reconnect_attempts: u32,
    initial_reconnect_delay: Duration,
    max_reconnect_delay: Duration,
    last_data: Option<Instant>,
    /// Lines received since creation
    lines_received: u64,
    /// Successful reconnections
    reconnections: u64,
    /// Read timeouts encountered
    timeouts: u64,
}

/// Connection health counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpSubscriberStats {
    pub connected: bool,
    pub lines_received: u64,
    pub reconnections: u64,
    pub timeouts: u64,
}

impl TcpSubscriber {
    /// Create a subscriber for `host:port` with default timeouts.
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            stream: None,
            line_buffer: String::with_capacity(256),
            read_timeout: Duration::from_secs(TELEMETRY_READ_TIMEOUT_SECS),
            max_reconnect_attempts: TELEMETRY_MAX_RECONNECT_ATTEMPTS,
            initial_reconnect_delay: Duration::from_secs(TELEMETRY_INITIAL_RECONNECT_DELAY_SECS),
            max_reconnect_delay: Duration::from_secs(TELEMETRY_MAX_RECONNECT_DELAY_SECS),
            last_data: None,
            lines_received: 0,
            reconnections: 0,
            timeouts: 0,
        }
    }

    /// Build from the `[telemetry]` config section.
    pub fn from_config(addr: impl Into<String>, config: &crate::config::TelemetryConfig) -> Self {
        Self::new(addr)
            .with_read_timeout(Duration::from_secs(config.read_timeout_secs))
            .with_max_reconnect_attempts(config.max_reconnect_attempts)
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    /// Set the first reconnect delay and the cap it doubles up to.
    pub fn with_reconnect_delays(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_reconnect_delay = initial;
        self.max_reconnect_delay = max;
        self
    }

    pub fn stats(&self) -> TcpSubscriberStats {
        TcpSubscriberStats {
            connected: self.stream.is_some(),
            lines_received: self.lines_received,
            reconnections: self.reconnections,
            timeouts: self.timeouts,
        }
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        self.initial_reconnect_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
            .min(self.max_reconnect_delay)
    }

    /// Reconnect with exponential backoff.
    ///
    /// Returns Ok(()) when reconnected, Err if max attempts exhausted.
    async fn reconnect(&mut self) -> Result<(), TelemetryError> {
        let _ = self.disconnect().await;

        for attempt in 1..=self.max_reconnect_attempts {
            let delay = self.backoff_delay(attempt);
            tracing::warn!(
                attempt,
                max_attempts = self.max_reconnect_attempts,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "Telemetry reconnecting after failure"
            );
            tokio::time::sleep(delay).await;

            match self.connect().await {
                Ok(()) => {
                    self.reconnections += 1;
                    tracing::info!(
                        attempt,
                        total_reconnections = self.reconnections,
                        "Telemetry reconnection successful"
                    );
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "Reconnection attempt failed");
                }
            }
        }

        tracing::error!(
            max_attempts = self.max_reconnect_attempts,
            "Telemetry reconnection exhausted, all attempts failed"
        );
        Err(TelemetryError::ConnectionFailed(format!(
            "Failed to reconnect to {} after {} attempts",
            self.addr, self.max_reconnect_attempts
        )))
    }

    /// Single read with timeout; does not reconnect.
    async fn read_line_inner(&mut self) -> Result<String, TelemetryError> {
        let reader = self
            .stream
            .as_mut()
            .ok_or_else(|| TelemetryError::ConnectionFailed("Not connected".to_string()))?;

        loop {
            self.line_buffer.clear();
            let bytes = match tokio::time::timeout(
                self.read_timeout,
                reader.read_line(&mut self.line_buffer),
            )
            .await
            {
                Ok(Ok(b)) => b,
                Ok(Err(e)) => return Err(TelemetryError::ConnectionFailed(e.to_string())),
                Err(_) => return Err(TelemetryError::Timeout),
            };

            if bytes == 0 {
                return Err(TelemetryError::ConnectionClosed);
            }

            let line = self.line_buffer.trim();
            if !line.is_empty() {
                return Ok(line.to_string());
            }
        }
    }
}

#[async_trait]
impl TelemetrySource for TcpSubscriber {
    async fn connect(&mut self) -> Result<(), TelemetryError> {
        if self.stream.is_some() {
            return Ok(());
        }

        tracing::info!(address = %self.addr, "Connecting to telemetry publisher");

        let connect_timeout = Duration::from_secs(TELEMETRY_CONNECT_TIMEOUT_SECS);
        let stream = tokio::time::timeout(connect_timeout, TcpStream::connect(&self.addr))
            .await
            .map_err(|_| TelemetryError::Timeout)?
            .map_err(|e| TelemetryError::ConnectionFailed(e.to_string()))?;

        // Keepalive detects a publisher that vanished without closing
        let sock_ref = socket2::SockRef::from(&stream);
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(Duration::from_secs(30))
            .with_interval(Duration::from_secs(10));
        if let Err(e) = sock_ref.set_tcp_keepalive(&keepalive) {
            tracing::debug!(error = %e, "Could not enable TCP keepalive");
        }

        self.stream = Some(BufReader::new(stream));
        self.last_data = Some(Instant::now());

        tracing::info!(address = %self.addr, "Telemetry connection established");
        Ok(())
    }

    /// Next line, reconnecting on timeout or a dropped connection.
    ///
    /// Never returns `None`: a TCP feed only ends when reconnection is exhausted.
    async fn next_line(&mut self) -> Result<Option<String>, TelemetryError> {
        if self.stream.is_none() {
            self.connect().await?;
        }

        loop {
            match self.read_line_inner().await {
                Ok(line) => {
                    self.last_data = Some(Instant::now());
                    self.lines_received += 1;
                    return Ok(Some(line));
                }
                Err(TelemetryError::Timeout) => {
                    self.timeouts += 1;
                    tracing::warn!(
                        timeout_secs = self.read_timeout.as_secs(),
                        silent_secs = self.last_data.map(|t| t.elapsed().as_secs()),
                        total_timeouts = self.timeouts,
                        "Telemetry read timeout, attempting reconnect"
                    );
                    self.reconnect().await?;
                }
                Err(TelemetryError::ConnectionClosed) => {
                    tracing::warn!("Telemetry publisher closed the connection, attempting reconnect");
                    self.reconnect().await?;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Telemetry read failed, attempting reconnect");
                    self.reconnect().await?;
                }
            }
        }
    }

    async fn disconnect(&mut self) -> Result<(), TelemetryError> {
        if let Some(mut reader) = self.stream.take() {
            let _ = reader.get_mut().shutdown().await;
            tracing::info!(address = %self.addr, "Telemetry connection closed");
        }
        Ok(())
    }

    fn source_name(&self) -> &'static str {
        "tcp"
    }
}
