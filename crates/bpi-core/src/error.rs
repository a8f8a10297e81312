//! Shared error type across the exporter crates.

use thiserror::Error;

/// Stable error classification, used for log fields and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Upstream unreachable, timed out, or body could not be read.
    Network,
    /// Upstream answered with a non-2xx status.
    HttpStatus,
    /// Upstream body is not a valid quote.
    Decode,
    /// Invalid configuration.
    Config,
    /// Unsupported configuration version.
    UnsupportedVersion,
    /// Anything else.
    Internal,
}

impl ErrorKind {
    /// String representation used in logs and the `outcome` label.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::HttpStatus => "http_status",
            ErrorKind::Decode => "decode",
            ErrorKind::Config => "config",
            ErrorKind::UnsupportedVersion => "unsupported_version",
            ErrorKind::Internal => "internal",
        }
    }

    /// Whether the error only aborts the current refresh cycle.
    pub fn is_cycle_local(self) -> bool {
        matches!(self, ErrorKind::Network | ErrorKind::HttpStatus | ErrorKind::Decode)
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ExporterError>;

/// Unified error type used by core and exporter.
#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("network error: {0}")]
    Network(String),
    #[error("upstream returned HTTP {status}")]
    HttpStatus { status: u16 },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl ExporterError {
    /// Map the error to its stable kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExporterError::Network(_) => ErrorKind::Network,
            ExporterError::HttpStatus { .. } => ErrorKind::HttpStatus,
            ExporterError::Decode(_) => ErrorKind::Decode,
            ExporterError::Config(_) => ErrorKind::Config,
            ExporterError::UnsupportedVersion => ErrorKind::UnsupportedVersion,
            ExporterError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<serde_json::Error> for ExporterError {
    fn from(e: serde_json::Error) -> Self {
        ExporterError::Decode(e.to_string())
    }
}
