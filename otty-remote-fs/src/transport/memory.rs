//! In-process remote host backed by a map of paths.
//!
//! Used by tests and demos to drive the browser without a network. Every
//! request is answered synchronously on `send`.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use flume::Sender;

use crate::error::TransportError;
use crate::path::normalize;
use crate::protocol::{
    Drive, DriveKind, RemoteEntry, Reply, ReplyPayload, Request, RequestKind,
};
use crate::status::FileStatus;

use super::{
    ChannelConfig, ReplyReceiver, Transport, build_channel, map_send_error,
};

#[derive(Debug, Clone, Copy)]
struct MemoryNode {
    size: u64,
    modified: i64,
    is_directory: bool,
}

/// Simulated remote file system.
#[derive(Debug, Default)]
pub struct MemoryHost {
    drives: Vec<Drive>,
    nodes: BTreeMap<String, MemoryNode>,
    faults: HashMap<String, FileStatus>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advertise a drive and create its root directory.
    pub fn with_drive(mut self, kind: DriveKind, path: &str) -> Self {
        self.add_directory(path);
        self.drives.push(Drive::new(kind, normalize(path).as_str()));
        self
    }

    /// Create a directory together with any missing ancestors.
    pub fn add_directory(&mut self, path: &str) {
        let key = node_key(path);
        self.ensure_parents(&key);
        if !key.is_empty() {
            self.nodes.insert(
                key,
                MemoryNode {
                    size: 0,
                    modified: 0,
                    is_directory: true,
                },
            );
        }
    }

    /// Create a file together with any missing ancestors.
    pub fn add_file(&mut self, path: &str, size: u64, modified: i64) {
        let key = node_key(path);
        self.ensure_parents(&key);
        self.nodes.insert(
            key,
            MemoryNode {
                size,
                modified,
                is_directory: false,
            },
        );
    }

    /// Answer every request targeting `path` with `status`.
    pub fn fail(&mut self, path: &str, status: FileStatus) {
        self.faults.insert(node_key(path), status);
    }

    /// Stop failing requests for `path`.
    pub fn heal(&mut self, path: &str) {
        self.faults.remove(&node_key(path));
    }

    pub fn exists(&self, path: &str) -> bool {
        let key = node_key(path);
        key.is_empty() || self.nodes.contains_key(&key)
    }

    /// Execute `request` and build its reply.
    pub fn handle(&mut self, request: Request) -> Reply {
        let outcome = match request.kind() {
            RequestKind::DriveList => self.drive_list(),
            other => match other.target().and_then(|path| self.fault(path)) {
                Some(status) => Err(status),
                None => self.execute(other),
            },
        };

        match outcome {
            Ok(payload) => Reply::success(request, payload),
            Err(status) => {
                log::debug!("memory host: {:?} -> {status}", request.kind());
                Reply::failure(request, status)
            },
        }
    }

    fn execute(
        &mut self,
        kind: &RequestKind,
    ) -> Result<ReplyPayload, FileStatus> {
        match kind {
            RequestKind::DriveList => self.drive_list(),
            RequestKind::FileList { path } => self.file_list(path.as_str()),
            RequestKind::CreateDirectory { path } => {
                self.create_directory(path).map(|_| ReplyPayload::None)
            },
            RequestKind::Rename { old_path, new_path } => self
                .rename(old_path, new_path)
                .map(|_| ReplyPayload::None),
            RequestKind::Remove { path, is_directory } => self
                .remove(path, *is_directory)
                .map(|_| ReplyPayload::None),
        }
    }

    fn fault(&self, path: &str) -> Option<FileStatus> {
        self.faults.get(&node_key(path)).copied()
    }

    fn drive_list(&self) -> Result<ReplyPayload, FileStatus> {
        if self.drives.is_empty() {
            return Err(FileStatus::NoDrivesFound);
        }

        Ok(ReplyPayload::DriveList(self.drives.clone()))
    }

    fn file_list(&self, path: &str) -> Result<ReplyPayload, FileStatus> {
        let key = node_key(path);
        if !self.is_directory(&key) {
            return Err(FileStatus::PathNotFound);
        }

        let entries = self
            .nodes
            .iter()
            .filter_map(|(child, node)| {
                let (parent, name) = child.rsplit_once('/')?;
                if parent != key {
                    return None;
                }

                Some(if node.is_directory {
                    RemoteEntry::directory(name, node.modified)
                } else {
                    RemoteEntry::file(name, node.size, node.modified)
                })
            })
            .collect();

        Ok(ReplyPayload::FileList(entries))
    }

    fn create_directory(&mut self, path: &str) -> Result<(), FileStatus> {
        let key = node_key(path);
        let (parent, name) = split_key(&key)?;
        if !self.is_directory(parent) {
            return Err(FileStatus::PathNotFound);
        }
        if name.is_empty() {
            return Err(FileStatus::InvalidPathName);
        }
        if self.nodes.contains_key(&key) {
            return Err(FileStatus::PathAlreadyExists);
        }

        self.nodes.insert(
            key,
            MemoryNode {
                size: 0,
                modified: chrono::Utc::now().timestamp(),
                is_directory: true,
            },
        );
        Ok(())
    }

    fn rename(
        &mut self,
        old_path: &str,
        new_path: &str,
    ) -> Result<(), FileStatus> {
        let old_key = node_key(old_path);
        let new_key = node_key(new_path);
        let (new_parent, new_name) = split_key(&new_key)?;
        if new_name.is_empty() {
            return Err(FileStatus::InvalidPathName);
        }
        if !self.nodes.contains_key(&old_key) {
            return Err(FileStatus::PathNotFound);
        }
        if !self.is_directory(new_parent) {
            return Err(FileStatus::PathNotFound);
        }
        if self.nodes.contains_key(&new_key) {
            return Err(FileStatus::PathAlreadyExists);
        }

        let prefix = format!("{old_key}/");
        let moved: Vec<String> = self
            .nodes
            .keys()
            .filter(|key| **key == old_key || key.starts_with(&prefix))
            .cloned()
            .collect();

        for key in moved {
            if let Some(node) = self.nodes.remove(&key) {
                let renamed = format!("{new_key}{}", &key[old_key.len()..]);
                self.nodes.insert(renamed, node);
            }
        }

        Ok(())
    }

    fn remove(
        &mut self,
        path: &str,
        is_directory: bool,
    ) -> Result<(), FileStatus> {
        let key = node_key(path);
        let Some(node) = self.nodes.get(&key) else {
            return Err(FileStatus::PathNotFound);
        };
        if node.is_directory != is_directory {
            return Err(FileStatus::InvalidRequest);
        }

        let prefix = format!("{key}/");
        if self.nodes.keys().any(|other| other.starts_with(&prefix)) {
            return Err(FileStatus::AccessDenied);
        }

        self.nodes.remove(&key);
        Ok(())
    }

    fn is_directory(&self, key: &str) -> bool {
        key.is_empty()
            || self.nodes.get(key).is_some_and(|node| node.is_directory)
    }

    fn ensure_parents(&mut self, key: &str) {
        for (end, _) in key.match_indices('/').filter(|(end, _)| *end > 0) {
            self.nodes.entry(key[..end].to_string()).or_insert(MemoryNode {
                size: 0,
                modified: 0,
                is_directory: true,
            });
        }
    }
}

/// Map key for a path: normalized, without the trailing separator. The root
/// maps to the empty key.
fn node_key(path: &str) -> String {
    let normalized = normalize(path);
    normalized.as_str().trim_end_matches('/').to_string()
}

fn split_key(key: &str) -> Result<(&str, &str), FileStatus> {
    key.rsplit_once('/').ok_or(FileStatus::InvalidPathName)
}

/// [`Transport`] that answers requests from a shared [`MemoryHost`].
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    host: Arc<Mutex<MemoryHost>>,
    replies: Sender<Reply>,
}

impl MemoryTransport {
    /// Wrap `host` and return the transport with its reply receiver.
    pub fn new(
        host: MemoryHost,
        channels: &ChannelConfig,
    ) -> (Self, ReplyReceiver) {
        let (replies, receiver) = build_channel(channels.reply_capacity);
        let transport = Self {
            host: Arc::new(Mutex::new(host)),
            replies,
        };

        (transport, ReplyReceiver::new(receiver))
    }

    /// Shared handle to the simulated host for inspection or mutation.
    pub fn host(&self) -> Arc<Mutex<MemoryHost>> {
        Arc::clone(&self.host)
    }
}

impl Transport for MemoryTransport {
    fn send(&self, request: Request) -> Result<(), TransportError> {
        let reply = self
            .host
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .handle(request);

        self.replies.try_send(reply).map_err(map_send_error)
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryHost, MemoryTransport};
    use crate::path::normalize;
    use crate::protocol::{
        DriveKind, RemoteEntry, ReplyPayload, Request, RequestKind,
    };
    use crate::status::FileStatus;
    use crate::transport::{ChannelConfig, Transport};

    fn host() -> MemoryHost {
        let mut host = MemoryHost::new()
            .with_drive(DriveKind::Fixed, "/")
            .with_drive(DriveKind::HomeFolder, "/home/otty");
        host.add_file("/home/otty/notes.txt", 512, 100);
        host.add_directory("/home/otty/projects");
        host
    }

    fn listing(host: &mut MemoryHost, path: &str) -> Vec<RemoteEntry> {
        let reply = host.handle(Request::file_list(normalize(path)));
        match reply.into_parts() {
            (_, FileStatus::Success, ReplyPayload::FileList(entries)) => {
                entries
            },
            (_, status, _) => panic!("listing failed: {status}"),
        }
    }

    #[test]
    fn given_nested_file_when_listed_then_only_direct_children_are_returned() {
        let mut host = host();

        let names: Vec<String> = listing(&mut host, "/home/otty")
            .into_iter()
            .map(|entry| entry.name)
            .collect();

        assert_eq!(names, vec!["notes.txt", "projects"]);
        assert_eq!(listing(&mut host, "/").len(), 1);
    }

    #[test]
    fn given_relative_multibyte_path_when_added_then_parents_are_created() {
        let mut host = MemoryHost::new();

        host.add_directory("é/x");
        host.add_file("日本/文書/a.txt", 1, 0);

        assert!(host.exists("é/x"));
        assert!(host.exists("é"));
        assert!(host.exists("日本/文書"));
        assert!(host.exists("日本"));
        let names: Vec<String> = listing(&mut host, "é")
            .into_iter()
            .map(|entry| entry.name)
            .collect();
        assert_eq!(names, vec!["x"]);
    }

    #[test]
    fn given_missing_directory_when_listed_then_path_not_found() {
        let mut host = host();

        let reply = host.handle(Request::file_list(normalize("/nope")));

        assert_eq!(reply.status(), FileStatus::PathNotFound);
    }

    #[test]
    fn given_existing_name_when_creating_then_path_already_exists() {
        let mut host = host();

        let created = host.handle(Request::create_directory(String::from(
            "/home/otty/new",
        )));
        let duplicate = host.handle(Request::create_directory(String::from(
            "/home/otty/projects",
        )));

        assert!(created.status().is_success());
        assert!(host.exists("/home/otty/new/"));
        assert_eq!(duplicate.status(), FileStatus::PathAlreadyExists);
    }

    #[test]
    fn given_directory_when_renamed_then_children_move_along() {
        let mut host = host();
        host.add_file("/home/otty/projects/main.rs", 10, 0);

        let reply = host.handle(Request::rename(
            String::from("/home/otty/projects"),
            String::from("/home/otty/work"),
        ));

        assert!(reply.status().is_success());
        assert!(host.exists("/home/otty/work/main.rs"));
        assert!(!host.exists("/home/otty/projects"));
    }

    #[test]
    fn given_non_empty_directory_when_removed_then_access_is_denied() {
        let mut host = host();

        let reply = host.handle(Request::remove(String::from("/home"), true));
        let file = host.handle(Request::remove(
            String::from("/home/otty/notes.txt"),
            false,
        ));

        assert_eq!(reply.status(), FileStatus::AccessDenied);
        assert!(file.status().is_success());
        assert!(!host.exists("/home/otty/notes.txt"));
    }

    #[test]
    fn given_fault_when_requested_then_fault_status_is_returned() {
        let mut host = host();
        host.fail("/home/otty/", FileStatus::AccessDenied);

        let reply = host.handle(Request::file_list(normalize("/home/otty")));
        assert_eq!(reply.status(), FileStatus::AccessDenied);

        host.heal("/home/otty");
        let reply = host.handle(Request::file_list(normalize("/home/otty")));
        assert!(reply.status().is_success());
    }

    #[test]
    fn given_host_without_drives_when_drive_list_requested_then_no_drives() {
        let mut host = MemoryHost::new();

        let reply = host.handle(Request::drive_list());

        assert_eq!(reply.status(), FileStatus::NoDrivesFound);
    }

    #[test]
    fn given_transport_when_request_sent_then_reply_is_queued() {
        let (transport, replies) =
            MemoryTransport::new(host(), &ChannelConfig::default());
        let request = Request::drive_list();
        let id = request.id();

        transport.send(request).expect("send should succeed");

        let reply = replies
            .try_recv()
            .expect("channel should be open")
            .expect("reply should be queued");
        assert_eq!(reply.request().id(), id);
        assert_eq!(reply.request().kind(), &RequestKind::DriveList);
        match reply.payload() {
            ReplyPayload::DriveList(drives) => assert_eq!(drives.len(), 2),
            other => panic!("unexpected payload {other:?}"),
        }
    }
}
