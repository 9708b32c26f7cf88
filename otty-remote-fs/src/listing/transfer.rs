//! Drag-and-drop payload exchanged between two browser panels.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TransferError;
use crate::path::RemotePath;

/// Format tag carried by [`TransferData`] produced by this crate.
pub const TRANSFER_FORMAT: &str = "application/x-otty-remote-file-list";

/// Identity of a listing model, used to reject drops onto the source panel.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct ModelId(Uuid);

impl ModelId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ModelId {
    fn default() -> Self {
        Self::new()
    }
}

/// One dragged row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferItem {
    pub name: String,
    pub size: u64,
    pub is_directory: bool,
}

/// Rows dragged out of a panel together with their origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferPayload {
    origin: ModelId,
    source: RemotePath,
    items: Vec<TransferItem>,
}

impl TransferPayload {
    pub fn new(origin: ModelId, items: Vec<TransferItem>) -> Self {
        Self {
            origin,
            source: RemotePath::computer(),
            items,
        }
    }

    /// Attach the directory the items were dragged from.
    pub fn with_source(mut self, source: RemotePath) -> Self {
        self.source = source;
        self
    }

    pub fn origin(&self) -> ModelId {
        self.origin
    }

    pub fn source(&self) -> &RemotePath {
        &self.source
    }

    pub fn items(&self) -> &[TransferItem] {
        &self.items
    }

    /// Encode into the clipboard/drag representation.
    pub fn encode(&self) -> Result<TransferData, TransferError> {
        let bytes = serde_json::to_vec(self)?;
        Ok(TransferData::new(TRANSFER_FORMAT, bytes))
    }
}

/// Opaque drag-and-drop data as handed over by the UI toolkit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferData {
    format: String,
    bytes: Vec<u8>,
}

impl TransferData {
    pub fn new(format: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            format: format.into(),
            bytes,
        }
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    /// Return whether the data carries a file list produced by this crate.
    pub fn has_file_list(&self) -> bool {
        self.format == TRANSFER_FORMAT
    }

    /// Decode the file list payload.
    pub fn decode(&self) -> Result<TransferPayload, TransferError> {
        if !self.has_file_list() {
            return Err(TransferError::UnknownFormat(self.format.clone()));
        }

        Ok(serde_json::from_slice(&self.bytes)?)
    }
}

/// Accepted drop, to be turned into remote copy operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropRequest {
    /// Directory row the items were dropped on; empty for the current
    /// directory.
    pub target_folder: String,
    pub payload: TransferPayload,
}
