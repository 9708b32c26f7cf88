//! Request and reply types exchanged with the remote host.
//!
//! The browser never talks to the wire directly. It builds [`Request`]s,
//! hands them to a [`crate::transport::Transport`] and later receives a
//! [`Reply`] that echoes the originating request, so every reply can be
//! matched back to the state it is meant to update.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::path::RemotePath;
use crate::status::FileStatus;

/// Correlation id generated for every outgoing request.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What a request asks the remote host to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestKind {
    DriveList,
    FileList { path: RemotePath },
    CreateDirectory { path: String },
    Rename { old_path: String, new_path: String },
    Remove { path: String, is_directory: bool },
}

impl RequestKind {
    /// Operation category used for error reporting.
    pub fn operation(&self) -> OperationKind {
        match self {
            Self::DriveList => OperationKind::DriveList,
            Self::FileList { .. } => OperationKind::FileList,
            Self::CreateDirectory { .. } => OperationKind::CreateDirectory,
            Self::Rename { .. } => OperationKind::Rename,
            Self::Remove { .. } => OperationKind::Remove,
        }
    }

    /// Path the request targets, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::DriveList => None,
            Self::FileList { path } => Some(path.as_str()),
            Self::CreateDirectory { path } => Some(path),
            Self::Rename { old_path, .. } => Some(old_path),
            Self::Remove { path, .. } => Some(path),
        }
    }
}

/// Remote operation categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    DriveList,
    FileList,
    CreateDirectory,
    Rename,
    Remove,
    Transfer,
}

impl OperationKind {
    /// Sentence prefix used when describing a failure.
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::DriveList => "Failed to get list of drives",
            Self::FileList => "Failed to get list of files",
            Self::CreateDirectory => "Failed to create directory",
            Self::Rename => "Failed to rename item",
            Self::Remove => "Failed to remove item",
            Self::Transfer => "Failed to transfer item",
        }
    }
}

/// Outgoing request with its correlation id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    id: RequestId,
    kind: RequestKind,
}

impl Request {
    pub fn new(kind: RequestKind) -> Self {
        Self {
            id: RequestId::new(),
            kind,
        }
    }

    pub fn drive_list() -> Self {
        Self::new(RequestKind::DriveList)
    }

    pub fn file_list(path: RemotePath) -> Self {
        Self::new(RequestKind::FileList { path })
    }

    pub fn create_directory(path: String) -> Self {
        Self::new(RequestKind::CreateDirectory { path })
    }

    pub fn rename(old_path: String, new_path: String) -> Self {
        Self::new(RequestKind::Rename { old_path, new_path })
    }

    pub fn remove(path: String, is_directory: bool) -> Self {
        Self::new(RequestKind::Remove { path, is_directory })
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn kind(&self) -> &RequestKind {
        &self.kind
    }
}

/// Drive or special folder category reported by the host.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum DriveKind {
    #[default]
    Unknown,
    Removable,
    Fixed,
    Remote,
    Cdrom,
    Ram,
    HomeFolder,
    DesktopFolder,
}

/// One entry of a drive list reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drive {
    pub kind: DriveKind,
    pub path: String,
}

impl Drive {
    pub fn new(kind: DriveKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

/// One entry of a file list reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub name: String,
    pub size: u64,
    /// Seconds since the unix epoch.
    pub modified: i64,
    pub is_directory: bool,
}

impl RemoteEntry {
    pub fn directory(name: impl Into<String>, modified: i64) -> Self {
        Self {
            name: name.into(),
            size: 0,
            modified,
            is_directory: true,
        }
    }

    pub fn file(name: impl Into<String>, size: u64, modified: i64) -> Self {
        Self {
            name: name.into(),
            size,
            modified,
            is_directory: false,
        }
    }
}

/// Kind-specific reply data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplyPayload {
    #[default]
    None,
    DriveList(Vec<Drive>),
    FileList(Vec<RemoteEntry>),
}

/// Reply delivered by the transport for a previously sent request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    request: Request,
    status: FileStatus,
    payload: ReplyPayload,
}

impl Reply {
    pub fn new(
        request: Request,
        status: FileStatus,
        payload: ReplyPayload,
    ) -> Self {
        Self {
            request,
            status,
            payload,
        }
    }

    /// Successful reply carrying `payload`.
    pub fn success(request: Request, payload: ReplyPayload) -> Self {
        Self::new(request, FileStatus::Success, payload)
    }

    /// Failed reply without payload.
    pub fn failure(request: Request, status: FileStatus) -> Self {
        Self::new(request, status, ReplyPayload::None)
    }

    /// The request this reply answers.
    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn status(&self) -> FileStatus {
        self.status
    }

    pub fn payload(&self) -> &ReplyPayload {
        &self.payload
    }

    pub fn into_parts(self) -> (Request, FileStatus, ReplyPayload) {
        (self.request, self.status, self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::{OperationKind, Reply, ReplyPayload, Request};
    use crate::path::normalize;
    use crate::status::FileStatus;

    #[test]
    fn given_two_requests_when_created_then_ids_differ() {
        let first = Request::drive_list();
        let second = Request::drive_list();

        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn given_reply_when_built_then_originating_request_is_echoed() {
        let request = Request::file_list(normalize("/home"));
        let reply = Reply::failure(request.clone(), FileStatus::AccessDenied);

        assert_eq!(reply.request(), &request);
        assert_eq!(reply.payload(), &ReplyPayload::None);
        assert_eq!(
            reply.request().kind().operation(),
            OperationKind::FileList
        );
        assert_eq!(reply.request().kind().target(), Some("/home/"));
    }
}
