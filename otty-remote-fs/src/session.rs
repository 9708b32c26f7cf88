//! Glue between a browser panel and its transport.

use std::collections::VecDeque;
use std::time::Duration;

use crate::browser::{BrowserEffect, BrowserOrchestrator};
use crate::error::TransportError;
use crate::transport::{ReplyReceiver, Transport};

/// One browser panel wired to a remote host.
///
/// All state changes happen on the caller's thread: replies are taken from
/// the receiver and applied one at a time.
pub struct BrowserSession<T> {
    orchestrator: BrowserOrchestrator,
    transport: T,
    replies: ReplyReceiver,
}

impl<T: Transport> BrowserSession<T> {
    pub fn new(
        orchestrator: BrowserOrchestrator,
        transport: T,
        replies: ReplyReceiver,
    ) -> Self {
        Self {
            orchestrator,
            transport,
            replies,
        }
    }

    pub fn orchestrator(&self) -> &BrowserOrchestrator {
        &self.orchestrator
    }

    pub fn orchestrator_mut(&mut self) -> &mut BrowserOrchestrator {
        &mut self.orchestrator
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run a user action and deliver the requests it produced.
    ///
    /// Returns the effects meant for the user.
    pub fn dispatch<F>(&mut self, action: F) -> Vec<BrowserEffect>
    where
        F: FnOnce(&mut BrowserOrchestrator) -> Vec<BrowserEffect>,
    {
        let effects = action(&mut self.orchestrator);
        self.deliver(effects)
    }

    /// Apply every reply that is already queued.
    pub fn pump(&mut self) -> Result<Vec<BrowserEffect>, TransportError> {
        let mut output = Vec::new();
        while let Some(reply) = self.replies.try_recv()? {
            let effects = self.orchestrator.handle_reply(reply);
            output.extend(self.deliver(effects));
        }

        Ok(output)
    }

    /// Block until no reply is outstanding, waiting at most `timeout` for
    /// each one.
    pub fn pump_until_idle(
        &mut self,
        timeout: Duration,
    ) -> Result<Vec<BrowserEffect>, TransportError> {
        let mut output = self.pump()?;
        while self.orchestrator.is_busy() {
            let Some(reply) = self.replies.recv_timeout(timeout)? else {
                return Err(TransportError::Timeout);
            };

            let effects = self.orchestrator.handle_reply(reply);
            output.extend(self.deliver(effects));
        }

        Ok(output)
    }

    fn deliver(&mut self, effects: Vec<BrowserEffect>) -> Vec<BrowserEffect> {
        let mut queue = VecDeque::from(effects);
        let mut output = Vec::new();

        while let Some(effect) = queue.pop_front() {
            let request = match effect {
                BrowserEffect::Send(request) => request,
                other => {
                    output.push(other);
                    continue;
                },
            };

            if let Err(err) = self.transport.send(request.clone()) {
                log::warn!("failed to send {:?}: {err}", request.kind());
                output.push(BrowserEffect::TransportFailed {
                    operation: request.kind().operation(),
                    message: err.to_string(),
                });
                queue.extend(self.orchestrator.abandon(&request));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::BrowserSession;
    use crate::browser::{BrowserEffect, BrowserOrchestrator, BrowserPhase};
    use crate::error::TransportError;
    use crate::protocol::{OperationKind, Request};
    use crate::transport::{ReplyReceiver, Transport, build_channel};

    /// Transport that refuses every request.
    struct ClosedTransport {
        attempts: Cell<usize>,
    }

    impl Transport for ClosedTransport {
        fn send(&self, _request: Request) -> Result<(), TransportError> {
            self.attempts.set(self.attempts.get() + 1);
            Err(TransportError::Disconnected)
        }
    }

    #[test]
    fn given_closed_transport_when_refreshing_then_failure_is_reported() {
        let (_replies_tx, replies_rx) = build_channel(None);
        let mut session = BrowserSession::new(
            BrowserOrchestrator::default(),
            ClosedTransport {
                attempts: Cell::new(0),
            },
            ReplyReceiver::new(replies_rx),
        );

        let effects = session.dispatch(BrowserOrchestrator::refresh);

        assert_eq!(
            effects,
            vec![BrowserEffect::TransportFailed {
                operation: OperationKind::DriveList,
                message: String::from("transport channel closed"),
            }]
        );
        assert_eq!(session.transport().attempts.get(), 1);
        assert_eq!(session.orchestrator().phase(), BrowserPhase::Idle);
        assert!(!session.orchestrator().is_busy());
    }
}
