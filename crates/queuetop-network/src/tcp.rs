//! gearmand admin protocol over TCP.
//!
//! The connection is opened on the first fetch and reused afterwards.
//! Each fetch writes `status\n` and reads lines of
//! `<name>\t<queued>\t<running>\t<workers>` until a lone `.`.

use std::time::Duration;

use queuetop_protocol::{
    HostSpec, StatusRow, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_READ_TIMEOUT_MS, STATUS_COMMAND,
    STATUS_TERMINATOR,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::source::StatusSource;
use crate::SourceError;

/// Timeouts for one TCP status source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpSourceConfig {
    /// Upper bound on establishing the connection.
    pub connect_timeout: Duration,
    /// Upper bound on one `status` round trip.
    pub read_timeout: Duration,
}

impl Default for TcpSourceConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            read_timeout: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS),
        }
    }
}

/// Status source backed by a gearmand admin connection.
pub struct TcpStatusSource {
    spec: HostSpec,
    label: String,
    config: TcpSourceConfig,
    conn: Option<BufReader<TcpStream>>,
}

impl TcpStatusSource {
    pub fn new(spec: HostSpec, config: TcpSourceConfig) -> Self {
        let label = spec.to_string();
        Self {
            spec,
            label,
            config,
            conn: None,
        }
    }

    pub fn spec(&self) -> &HostSpec {
        &self.spec
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    async fn connect(&self) -> Result<BufReader<TcpStream>, SourceError> {
        tracing::debug!(host = %self.label, "Connecting to queue daemon");
        let addr = self.spec.connect_addr();
        match tokio::time::timeout(self.config.connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                tracing::info!(host = %self.label, "Connected to queue daemon");
                Ok(BufReader::new(stream))
            }
            Ok(Err(source)) => Err(SourceError::Connect {
                host: self.label.clone(),
                source,
            }),
            Err(_) => Err(SourceError::ConnectTimeout {
                host: self.label.clone(),
                timeout_ms: self.config.connect_timeout.as_millis(),
            }),
        }
    }
}

impl StatusSource for TcpStatusSource {
    fn host(&self) -> &str {
        &self.label
    }

    async fn fetch(&mut self) -> Result<Vec<StatusRow>, SourceError> {
        let mut conn = match self.conn.take() {
            Some(conn) => conn,
            None => self.connect().await?,
        };

        let rows = match tokio::time::timeout(
            self.config.read_timeout,
            read_status(&mut conn, &self.label),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(SourceError::ReadTimeout {
                    host: self.label.clone(),
                    timeout_ms: self.config.read_timeout.as_millis(),
                });
            }
        };

        tracing::trace!(host = %self.label, rows = rows.len(), "Status received");
        self.conn = Some(conn);
        Ok(rows)
    }
}

/// Send one `status` command and collect the response rows.
async fn read_status(
    conn: &mut BufReader<TcpStream>,
    host: &str,
) -> Result<Vec<StatusRow>, SourceError> {
    let io_error = |source| SourceError::Io {
        host: host.to_string(),
        source,
    };

    let stream = conn.get_mut();
    stream.write_all(STATUS_COMMAND).await.map_err(io_error)?;
    stream.flush().await.map_err(io_error)?;

    let mut rows = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = conn.read_until(b'\n', &mut buf).await.map_err(io_error)?;
        if read == 0 {
            return Err(SourceError::Closed {
                host: host.to_string(),
            });
        }

        // Job names are arbitrary bytes; anything not UTF-8 is shown lossily.
        let decoded = String::from_utf8_lossy(&buf);
        let line = decoded.trim_end();
        if line == STATUS_TERMINATOR {
            break;
        }
        match StatusRow::parse_line(line) {
            Ok(row) => rows.push(row),
            Err(e) => tracing::trace!(host, line, error = %e, "Skipping malformed status line"),
        }
    }

    Ok(rows)
}
