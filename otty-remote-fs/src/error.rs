use std::io;

use thiserror::Error;

use crate::protocol::OperationKind;
use crate::status::FileStatus;

/// Errors originating from the `otty-remote-fs` crate.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("listing error: {0}")]
    Listing(#[from] ListingError),

    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, BrowserError>;

/// Caller-contract violations detected by the listing model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingError {
    #[error("row {position} is out of range ({len} rows)")]
    OutOfRange { position: usize, len: usize },

    #[error("column is not editable")]
    NotEditable,

    #[error("edited row was replaced before the edit finished")]
    StaleEdit,
}

/// Rejected drag-and-drop payloads.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("items cannot be dropped onto the panel they came from")]
    SelfTransfer,

    #[error("unsupported payload format {0:?}")]
    UnknownFormat(String),

    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("payload carries no items")]
    Empty,
}

/// Failures delivering a request to the remote host.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport channel closed")]
    Disconnected,

    #[error("transport channel is full")]
    Full,

    #[error("timed out waiting for a reply")]
    Timeout,

    #[error("ssh error: {0}")]
    Ssh(#[from] ssh2::Error),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// Failures loading browser configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Remote operation that completed with a non-success status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {}", .kind.failure_message(), .status.reason())]
pub struct OperationError {
    pub kind: OperationKind,
    pub path: Option<String>,
    pub status: FileStatus,
}

impl OperationError {
    pub fn new(
        kind: OperationKind,
        path: Option<String>,
        status: FileStatus,
    ) -> Self {
        Self { kind, path, status }
    }

    /// Human-readable failure reason reported by the remote host.
    pub fn reason(&self) -> &'static str {
        self.status.reason()
    }
}
