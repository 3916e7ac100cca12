//! Telemetry from any line-oriented async reader (stdin in practice).

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use super::{TelemetryError, TelemetrySource};

/// Reads telemetry lines from an async reader until EOF
pub struct ReaderSource<R> {
    reader: Option<BufReader<R>>,
    pending: Option<R>,
    line_buffer: String,
    name: &'static str,
}

impl ReaderSource<tokio::io::Stdin> {
    /// Source reading JSON lines piped into the process.
    pub fn stdin() -> Self {
        Self::new(tokio::io::stdin(), "stdin")
    }
}

impl<R> ReaderSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    pub fn new(reader: R, name: &'static str) -> Self {
        Self {
            reader: None,
            pending: Some(reader),
            line_buffer: String::with_capacity(256),
            name,
        }
    }
}

#[async_trait]
impl<R> TelemetrySource for ReaderSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    async fn connect(&mut self) -> Result<(), TelemetryError> {
        if self.reader.is_some() {
            return Ok(());
        }
        let inner = self
            .pending
            .take()
            .ok_or_else(|| TelemetryError::ConnectionFailed(format!("{} already consumed", self.name)))?;
        self.reader = Some(BufReader::new(inner));
        tracing::info!(source = self.name, "Telemetry source connected, waiting for JSON lines");
        Ok(())
    }

    async fn next_line(&mut self) -> Result<Option<String>, TelemetryError> {
        if self.reader.is_none() {
            self.connect().await?;
        }
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| TelemetryError::ConnectionFailed("Not connected".to_string()))?;

        loop {
            self.line_buffer.clear();
            let bytes = reader
                .read_line(&mut self.line_buffer)
                .await
                .map_err(|e| TelemetryError::ConnectionFailed(format!("{} read error: {e}", self.name)))?;

            if bytes == 0 {
                tracing::info!(source = self.name, "Telemetry source reached EOF");
                return Ok(None);
            }

            let line = self.line_buffer.trim();
            if !line.is_empty() {
                return Ok(Some(line.to_string()));
            }
        }
    }

    async fn disconnect(&mut self) -> Result<(), TelemetryError> {
        if self.reader.take().is_some() {
            tracing::info!(source = self.name, "Telemetry source disconnected");
        }
        Ok(())
    }

    fn source_name(&self) -> &'static str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_yields_lines_then_eof() {
        let data: &[u8] = b"a\n\nb\r\n";
        let mut source = ReaderSource::new(data, "memory");
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("a"));
        assert_eq!(source.next_line().await.unwrap().as_deref(), Some("b"));
        assert_eq!(source.next_line().await.unwrap(), None);
        assert_eq!(source.source_name(), "memory");
    }

    #[tokio::test]
    async fn test_cannot_reconnect_after_disconnect() {
        let data: &[u8] = b"a\n";
        let mut source = ReaderSource::new(data, "memory");
        source.connect().await.unwrap();
        source.disconnect().await.unwrap();
        assert!(source.connect().await.is_err());
    }
}
