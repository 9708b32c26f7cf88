//! Browsing state for one side of a remote file-transfer session.
//!
//! The crate keeps everything a file panel needs between user input and the
//! remote host:
//! - [`AddressState`] for the address bar with known drives and one typed
//!   location,
//! - [`ListingModel`] for the sortable, editable directory listing with drag
//!   and drop packaging,
//! - [`BrowserOrchestrator`] for turning actions into requests and replies
//!   into state,
//! - [`BatchRemover`] for sequential, cancellable batch removal.
//!
//! Requests travel through a [`Transport`]. [`MemoryTransport`] serves an
//! in-process file system, [`SftpTransport`] talks to a real host over SSH.
//! [`BrowserSession`] ties an orchestrator to a transport:
//!
//! 1. Build a transport and its [`ReplyReceiver`].
//! 2. Wrap them with a [`BrowserOrchestrator`] in a [`BrowserSession`].
//! 3. `dispatch` user actions and `pump` replies; both return the
//!    [`BrowserEffect`]s to show to the user.

pub mod address;
pub mod browser;
pub mod config;
mod error;
pub mod listing;
pub mod path;
pub mod protocol;
pub mod remover;
mod session;
mod status;
pub mod transport;

pub use address::{AddressState, Location, LocationKind, PathChanged};
pub use browser::{
    BrowserEffect, BrowserOrchestrator, BrowserPhase, ConfirmationPrompt,
    TransferJob,
};
pub use config::{BrowserConfig, SftpAuth, SftpConfig};
pub use error::{
    BrowserError, ConfigError, ListingError, OperationError, Result,
    TransferError, TransportError,
};
pub use listing::ListingModel;
pub use path::{RemotePath, normalize};
pub use remover::{BatchRemover, RemovalTask, RemoverEvent, RemoverState};
pub use session::BrowserSession;
pub use status::FileStatus;
pub use transport::{
    ChannelConfig, MemoryHost, MemoryTransport, ReplyReceiver, SftpTransport,
    Transport,
};
