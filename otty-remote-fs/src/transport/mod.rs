//! Request delivery to a remote host.
//!
//! A [`Transport`] accepts requests without blocking; replies come back on a
//! [`ReplyReceiver`] in whatever order the host answers them.

mod memory;
mod sftp;

use std::time::Duration;

use flume::{Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};

use crate::config::BrowserConfig;
use crate::error::TransportError;
use crate::protocol::{Reply, Request};

pub use memory::{MemoryHost, MemoryTransport};
pub use sftp::SftpTransport;

/// Sink for outgoing requests.
pub trait Transport {
    /// Queue `request` for delivery.
    fn send(&self, request: Request) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: Request) -> Result<(), TransportError> {
        (**self).send(request)
    }
}

/// Channel sizing options for request/reply plumbing.
#[derive(Default, Clone, Debug)]
pub struct ChannelConfig {
    /// Capacity for the request channel (`None` means unbounded).
    pub request_capacity: Option<usize>,
    /// Capacity for the reply channel (`None` means unbounded).
    pub reply_capacity: Option<usize>,
}

impl ChannelConfig {
    /// Use the same bounded capacity for requests and replies.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            request_capacity: Some(capacity),
            reply_capacity: Some(capacity),
        }
    }
}

impl From<&BrowserConfig> for ChannelConfig {
    fn from(config: &BrowserConfig) -> Self {
        match config.channel_capacity {
            Some(capacity) => Self::bounded(capacity),
            None => Self::default(),
        }
    }
}

/// Receiving end for replies with blocking and polling helpers.
#[derive(Debug)]
pub struct ReplyReceiver {
    receiver: Receiver<Reply>,
}

impl ReplyReceiver {
    pub(crate) fn new(receiver: Receiver<Reply>) -> Self {
        Self { receiver }
    }

    /// Blocking receive.
    pub fn recv(&self) -> Result<Reply, TransportError> {
        self.receiver
            .recv()
            .map_err(|_| TransportError::Disconnected)
    }

    /// Non-blocking receive; `Ok(None)` when nothing is queued.
    pub fn try_recv(&self) -> Result<Option<Reply>, TransportError> {
        match self.receiver.try_recv() {
            Ok(reply) => Ok(Some(reply)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                Err(TransportError::Disconnected)
            },
        }
    }

    /// Wait up to `timeout` for the next reply.
    pub fn recv_timeout(
        &self,
        timeout: Duration,
    ) -> Result<Option<Reply>, TransportError> {
        match self.receiver.recv_timeout(timeout) {
            Ok(reply) => Ok(Some(reply)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                Err(TransportError::Disconnected)
            },
        }
    }
}

pub(crate) fn build_channel<T>(
    capacity: Option<usize>,
) -> (Sender<T>, Receiver<T>) {
    match capacity {
        Some(cap) => flume::bounded(cap),
        None => flume::unbounded(),
    }
}

pub(crate) fn map_send_error<T>(err: TrySendError<T>) -> TransportError {
    match err {
        TrySendError::Full(_) => TransportError::Full,
        TrySendError::Disconnected(_) => TransportError::Disconnected,
    }
}
