//! Sequential removal of a batch of remote entries.
//!
//! The remover issues one remove request at a time. Callers pull the next
//! request with [`BatchRemover::next_request`] after every reply, so a
//! cancellation between two replies prevents the following item from ever
//! being sent.

use crate::protocol::{Reply, Request, RequestId};
use crate::status::FileStatus;

/// Snapshot of one selected entry scheduled for removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalTask {
    path: String,
    is_directory: bool,
}

impl RemovalTask {
    pub fn new(path: impl Into<String>, is_directory: bool) -> Self {
        Self {
            path: path.into(),
            is_directory,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_directory(&self) -> bool {
        self.is_directory
    }
}

/// Remover lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoverState {
    NotStarted,
    Running,
    Completed,
    Cancelled,
}

/// Progress notifications for the removal dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoverEvent {
    Started { total: usize },
    Progress { completed: usize, total: usize },
    Failed { path: String, status: FileStatus },
    Finished,
    Cancelled,
}

/// Issues remove requests for a batch of tasks, strictly in order.
#[derive(Debug)]
pub struct BatchRemover {
    tasks: Vec<RemovalTask>,
    next: usize,
    completed: usize,
    in_flight: Option<(RequestId, usize)>,
    state: RemoverState,
}

impl Default for BatchRemover {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchRemover {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next: 0,
            completed: 0,
            in_flight: None,
            state: RemoverState::NotStarted,
        }
    }

    pub fn state(&self) -> RemoverState {
        self.state
    }

    pub fn total(&self) -> usize {
        self.tasks.len()
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Completion percentage for a progress bar.
    pub fn percent(&self) -> u8 {
        if self.tasks.is_empty() {
            return 0;
        }

        (self.completed * 100 / self.tasks.len()) as u8
    }

    /// Return whether `id` is the request currently in flight.
    pub fn is_waiting_for(&self, id: RequestId) -> bool {
        self.in_flight.is_some_and(|(in_flight, _)| in_flight == id)
    }

    /// Start removing `tasks`. An empty batch is ignored.
    pub fn start(&mut self, tasks: Vec<RemovalTask>) -> Vec<RemoverEvent> {
        if tasks.is_empty() || self.state != RemoverState::NotStarted {
            return Vec::new();
        }

        log::info!("removing {} item(s)", tasks.len());
        self.tasks = tasks;
        self.state = RemoverState::Running;

        vec![RemoverEvent::Started {
            total: self.tasks.len(),
        }]
    }

    /// Build the remove request for the next task, if one may be issued.
    pub fn next_request(&mut self) -> Option<Request> {
        if self.state != RemoverState::Running || self.in_flight.is_some() {
            return None;
        }

        let index = self.next;
        let task = self.tasks.get(index)?;
        let request = Request::remove(task.path.clone(), task.is_directory);

        self.in_flight = Some((request.id(), index));
        self.next += 1;
        Some(request)
    }

    /// Record the reply for the in-flight task.
    pub fn on_reply(&mut self, reply: &Reply) -> Vec<RemoverEvent> {
        let Some((id, index)) = self.in_flight else {
            return Vec::new();
        };
        if id != reply.request().id() {
            return Vec::new();
        }

        self.in_flight = None;
        if self.state != RemoverState::Running {
            // Cancelled while this request was in flight.
            return Vec::new();
        }

        let mut events = Vec::new();
        let status = reply.status();
        if !status.is_success() {
            let path = self.tasks[index].path.clone();
            log::warn!("failed to remove {path}: {status}");
            events.push(RemoverEvent::Failed { path, status });
        }

        self.completed += 1;
        events.push(RemoverEvent::Progress {
            completed: self.completed,
            total: self.tasks.len(),
        });

        if self.completed == self.tasks.len() {
            log::info!("removal finished");
            self.state = RemoverState::Completed;
            events.push(RemoverEvent::Finished);
        }

        events
    }

    /// Stop issuing further requests.
    pub fn cancel(&mut self) -> Vec<RemoverEvent> {
        if self.state != RemoverState::Running {
            return Vec::new();
        }

        log::info!(
            "removal cancelled after {} of {} item(s)",
            self.completed,
            self.tasks.len()
        );
        self.state = RemoverState::Cancelled;
        vec![RemoverEvent::Cancelled]
    }
}

#[cfg(test)]
mod tests {
    use super::{BatchRemover, RemovalTask, RemoverEvent, RemoverState};
    use crate::protocol::{Reply, ReplyPayload, Request, RequestKind};
    use crate::status::FileStatus;

    fn tasks() -> Vec<RemovalTask> {
        vec![
            RemovalTask::new("/srv/a", false),
            RemovalTask::new("/srv/b", true),
            RemovalTask::new("/srv/c", false),
        ]
    }

    fn target(request: &Request) -> String {
        match request.kind() {
            RequestKind::Remove { path, .. } => path.clone(),
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn given_empty_batch_when_started_then_nothing_is_emitted() {
        let mut remover = BatchRemover::new();

        assert!(remover.start(Vec::new()).is_empty());
        assert!(remover.next_request().is_none());
        assert_eq!(remover.state(), RemoverState::NotStarted);
    }

    #[test]
    fn given_batch_with_failing_item_when_processed_then_all_items_are_attempted()
     {
        let mut remover = BatchRemover::new();
        let mut events = remover.start(tasks());
        let mut issued = Vec::new();

        while let Some(request) = remover.next_request() {
            issued.push(target(&request));
            let reply = if target(&request) == "/srv/b" {
                Reply::failure(request, FileStatus::AccessDenied)
            } else {
                Reply::success(request, ReplyPayload::None)
            };
            events.extend(remover.on_reply(&reply));
        }

        assert_eq!(issued, vec!["/srv/a", "/srv/b", "/srv/c"]);
        let finished = events
            .iter()
            .filter(|event| **event == RemoverEvent::Finished)
            .count();
        assert_eq!(finished, 1);
        let failures: Vec<&RemoverEvent> = events
            .iter()
            .filter(|event| matches!(event, RemoverEvent::Failed { .. }))
            .collect();
        assert_eq!(
            failures,
            vec![&RemoverEvent::Failed {
                path: String::from("/srv/b"),
                status: FileStatus::AccessDenied,
            }]
        );
        assert!(events.contains(&RemoverEvent::Progress {
            completed: 3,
            total: 3
        }));
        assert_eq!(remover.percent(), 100);
        assert_eq!(remover.state(), RemoverState::Completed);
    }

    #[test]
    fn given_cancel_after_first_reply_when_polled_then_remaining_are_not_issued()
    {
        let mut remover = BatchRemover::new();
        let _ = remover.start(tasks());
        let first = remover.next_request().expect("first task is issued");
        let _ = remover.on_reply(&Reply::success(first, ReplyPayload::None));

        let events = remover.cancel();

        assert_eq!(events, vec![RemoverEvent::Cancelled]);
        assert!(remover.next_request().is_none());
        assert_eq!(remover.state(), RemoverState::Cancelled);
        assert_eq!(remover.percent(), 33);
    }

    #[test]
    fn given_cancel_while_in_flight_when_reply_arrives_then_it_is_absorbed() {
        let mut remover = BatchRemover::new();
        let _ = remover.start(tasks());
        let first = remover.next_request().expect("first task is issued");
        let _ = remover.cancel();

        let events =
            remover.on_reply(&Reply::failure(first, FileStatus::DiskFull));

        assert!(events.is_empty());
        assert!(remover.next_request().is_none());
    }

    #[test]
    fn given_reply_for_other_request_when_received_then_it_is_ignored() {
        let mut remover = BatchRemover::new();
        let _ = remover.start(tasks());
        let _ = remover.next_request().expect("first task is issued");

        let events = remover.on_reply(&Reply::success(
            Request::remove(String::from("/srv/a"), false),
            ReplyPayload::None,
        ));

        assert!(events.is_empty());
        assert_eq!(remover.completed(), 0);
    }

    #[test]
    fn given_idle_remover_when_cancelled_then_nothing_happens() {
        let mut remover = BatchRemover::new();

        assert!(remover.cancel().is_empty());
        assert_eq!(remover.state(), RemoverState::NotStarted);
    }

    #[test]
    fn given_running_remover_when_started_again_then_second_batch_is_ignored()
    {
        let mut remover = BatchRemover::new();
        let _ = remover.start(tasks());

        assert!(remover.start(tasks()).is_empty());
        assert_eq!(remover.total(), 3);
    }
}
