use crate::error::OperationError;
use crate::path::RemotePath;
use crate::protocol::{OperationKind, Request};
use crate::remover::{RemovalTask, RemoverEvent};

/// Side effects produced by the orchestrator for the embedding session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserEffect {
    /// Deliver a request to the remote host.
    Send(Request),
    /// The address bar selected a path (re-selection included).
    PathChanged(RemotePath),
    /// A remote operation failed; show a dismissible message.
    Error(OperationError),
    /// Copy one dropped item; executed by the file transfer machinery.
    Transfer(TransferJob),
    /// Batch removal progress for the removal dialog.
    Removal(RemoverEvent),
    /// A request never reached the remote host.
    TransportFailed {
        operation: OperationKind,
        message: String,
    },
}

/// One item of an accepted drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferJob {
    pub source_path: String,
    pub target_path: String,
    pub size: u64,
    pub is_directory: bool,
}

/// Request phase, keyed by the last outstanding navigation or mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BrowserPhase {
    #[default]
    Idle,
    AwaitingDriveList,
    AwaitingFileList,
    AwaitingCreateDirectory,
    AwaitingRename,
}

/// Yes/no question asked before a batch removal starts.
pub trait ConfirmationPrompt {
    /// Return `true` to remove `tasks`.
    fn confirm_removal(&mut self, tasks: &[RemovalTask]) -> bool;
}

impl<F> ConfirmationPrompt for F
where
    F: FnMut(&[RemovalTask]) -> bool,
{
    fn confirm_removal(&mut self, tasks: &[RemovalTask]) -> bool {
        self(tasks)
    }
}
