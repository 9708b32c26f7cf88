use std::collections::{HashMap, HashSet};

use crate::address::{AddressState, PathChanged};
use crate::config::BrowserConfig;
use crate::error::{ListingError, OperationError, TransferError};
use crate::listing::{
    Column, EditOutcome, EditToken, ExtensionClassifier, FileTypeClassifier,
    ListingModel, SortOrder, TransferData,
};
use crate::path::RemotePath;
use crate::protocol::{Reply, ReplyPayload, Request, RequestId, RequestKind};
use crate::remover::{BatchRemover, RemovalTask, RemoverEvent, RemoverState};
use crate::status::FileStatus;

use super::effect::{
    BrowserEffect, BrowserPhase, ConfirmationPrompt, TransferJob,
};

/// Request/reply state machine of one browser panel.
///
/// Every user action becomes a list of [`BrowserEffect`]s; replies coming
/// back from the transport are fed into [`BrowserOrchestrator::handle_reply`]
/// one at a time.
pub struct BrowserOrchestrator {
    address: AddressState,
    listing: ListingModel,
    classifier: Box<dyn FileTypeClassifier + Send>,
    outstanding: HashMap<RequestId, RequestKind>,
    phase: BrowserPhase,
    remover: Option<BatchRemover>,
    /// Configured sort, applied once the first listing arrives.
    initial_sort: Option<(Column, SortOrder)>,
    resort_on_refresh: bool,
}

impl Default for BrowserOrchestrator {
    fn default() -> Self {
        Self::new(Box::new(ExtensionClassifier))
    }
}

impl BrowserOrchestrator {
    pub fn new(classifier: Box<dyn FileTypeClassifier + Send>) -> Self {
        Self {
            address: AddressState::new(),
            listing: ListingModel::new(),
            classifier,
            outstanding: HashMap::new(),
            phase: BrowserPhase::Idle,
            remover: None,
            initial_sort: None,
            resort_on_refresh: false,
        }
    }

    /// Build an orchestrator with the sort preferences from `config`.
    pub fn with_config(config: &BrowserConfig) -> Self {
        let mut orchestrator = Self::default();
        orchestrator.initial_sort =
            config.sort_column.map(|column| (column, config.sort_order));
        orchestrator.resort_on_refresh = config.resort_on_refresh;
        orchestrator
    }

    // --- Read access ---

    pub fn address(&self) -> &AddressState {
        &self.address
    }

    pub fn listing(&self) -> &ListingModel {
        &self.listing
    }

    /// Drain listing change notifications for the renderer.
    pub fn listing_mut(&mut self) -> &mut ListingModel {
        &mut self.listing
    }

    /// Classifier used for file rows and the folder type.
    pub fn classifier(&self) -> &dyn FileTypeClassifier {
        self.classifier.as_ref()
    }

    pub fn phase(&self) -> BrowserPhase {
        self.phase
    }

    pub fn current_path(&self) -> RemotePath {
        self.address.current_path()
    }

    pub fn remover_state(&self) -> Option<RemoverState> {
        self.remover.as_ref().map(BatchRemover::state)
    }

    /// Return whether any reply is still expected.
    pub fn is_busy(&self) -> bool {
        !self.outstanding.is_empty()
            || self.remover_state() == Some(RemoverState::Running)
    }

    // --- Navigation ---

    /// Reload the drive list, then the current directory.
    pub fn refresh(&mut self) -> Vec<BrowserEffect> {
        let mut effects = Vec::new();
        self.issue(Request::drive_list(), &mut effects);
        effects
    }

    /// Navigate to a path typed into the address bar.
    pub fn set_current_path(&mut self, path: &str) -> Vec<BrowserEffect> {
        let changed = self.address.set_current_path(path);
        self.navigate(changed)
    }

    /// Navigate to the address bar entry at `index`.
    pub fn select_location(&mut self, index: usize) -> Vec<BrowserEffect> {
        match self.address.select(index) {
            Some(changed) => self.navigate(changed),
            None => Vec::new(),
        }
    }

    pub fn to_child(&mut self, name: &str) -> Vec<BrowserEffect> {
        let changed = self.address.to_child(name);
        self.navigate(changed)
    }

    pub fn to_parent(&mut self) -> Vec<BrowserEffect> {
        match self.address.to_parent() {
            Some(changed) => self.navigate(changed),
            None => Vec::new(),
        }
    }

    /// Open the row at `position`; only directories can be entered.
    pub fn open(&mut self, position: usize) -> Vec<BrowserEffect> {
        let Some(row) = self.listing.row(position) else {
            return Vec::new();
        };
        if !row.is_directory() || row.is_pending() {
            return Vec::new();
        }

        let name = row.name().to_string();
        self.to_child(&name)
    }

    // --- Editing ---

    /// Insert a folder placeholder and open its name edit.
    pub fn add_folder(&mut self) -> EditToken {
        self.listing.add_pending_directory()
    }

    /// Open an inline edit of the cell at `position`.
    pub fn begin_edit(
        &self,
        position: usize,
        column: Column,
    ) -> Result<EditToken, ListingError> {
        self.listing.begin_edit(position, column)
    }

    /// Apply the result of an inline name edit.
    ///
    /// An edit whose rows were replaced in the meantime is dropped.
    pub fn commit_edit(
        &mut self,
        token: EditToken,
        name: &str,
    ) -> Vec<BrowserEffect> {
        let outcome = match self.listing.resolve_edit(token, name) {
            Ok(outcome) => outcome,
            Err(err) => {
                log::debug!(
                    "ignoring edit of row {}: {err}",
                    token.position()
                );
                return Vec::new();
            },
        };

        let current = self.address.current_path();
        let mut effects = Vec::new();
        match outcome {
            EditOutcome::Unchanged | EditOutcome::Discarded => {},
            EditOutcome::CreateDirectory { name } => {
                self.issue(
                    Request::create_directory(current.entry(&name)),
                    &mut effects,
                );
            },
            EditOutcome::Rename { old_name, new_name } => {
                self.issue(
                    Request::rename(
                        current.entry(&old_name),
                        current.entry(&new_name),
                    ),
                    &mut effects,
                );
            },
        }

        effects
    }

    pub fn sort_by(&mut self, column: Column, order: SortOrder) -> bool {
        self.initial_sort = None;
        self.listing.sort_by(column, order)
    }

    // --- Drag and drop ---

    /// Encode the selected rows for dragging to another panel.
    pub fn begin_drag(&self, positions: &[usize]) -> Option<TransferData> {
        let payload = self
            .listing
            .package_for_transfer(positions)?
            .with_source(self.address.current_path());

        match payload.encode() {
            Ok(data) => Some(data),
            Err(err) => {
                log::warn!("failed to encode drag payload: {err}");
                None
            },
        }
    }

    /// Accept items dropped from another panel and fan them out into one
    /// transfer job per item.
    pub fn drop_transfer(
        &mut self,
        data: &TransferData,
        target: Option<usize>,
    ) -> Result<Vec<BrowserEffect>, TransferError> {
        let request = self.listing.accept_incoming_transfer(data, target)?;

        let current = self.address.current_path();
        let target_dir = if request.target_folder.is_empty() {
            current
        } else {
            current.join(&request.target_folder)
        };

        let source_dir = request.payload.source();
        let effects = request
            .payload
            .items()
            .iter()
            .map(|item| {
                BrowserEffect::Transfer(TransferJob {
                    source_path: source_dir.entry(&item.name),
                    target_path: target_dir.entry(&item.name),
                    size: item.size,
                    is_directory: item.is_directory,
                })
            })
            .collect();

        Ok(effects)
    }

    // --- Removal ---

    /// Ask for confirmation and start removing the selected rows.
    pub fn remove_selected(
        &mut self,
        positions: &[usize],
        prompt: &mut dyn ConfirmationPrompt,
    ) -> Vec<BrowserEffect> {
        if self.remover_state() == Some(RemoverState::Running) {
            log::debug!("removal already in progress");
            return Vec::new();
        }

        let current = self.address.current_path();
        let mut seen = HashSet::new();
        let tasks: Vec<RemovalTask> = positions
            .iter()
            .filter(|position| seen.insert(**position))
            .filter_map(|position| self.listing.row(*position))
            .filter(|row| !row.is_pending())
            .map(|row| {
                RemovalTask::new(current.entry(row.name()), row.is_directory())
            })
            .collect();

        if tasks.is_empty() || !prompt.confirm_removal(&tasks) {
            return Vec::new();
        }

        let mut remover = BatchRemover::new();
        let mut effects: Vec<BrowserEffect> = remover
            .start(tasks)
            .into_iter()
            .map(BrowserEffect::Removal)
            .collect();
        if let Some(request) = remover.next_request() {
            effects.push(BrowserEffect::Send(request));
        }

        self.remover = Some(remover);
        effects
    }

    /// Stop the running batch removal after the in-flight item.
    pub fn cancel_removal(&mut self) -> Vec<BrowserEffect> {
        let Some(remover) = self.remover.as_mut() else {
            return Vec::new();
        };

        let mut effects: Vec<BrowserEffect> = remover
            .cancel()
            .into_iter()
            .map(BrowserEffect::Removal)
            .collect();
        if !effects.is_empty() {
            effects.extend(self.refresh());
        }

        effects
    }

    // --- Replies ---

    /// Apply a reply from the transport.
    pub fn handle_reply(&mut self, reply: Reply) -> Vec<BrowserEffect> {
        let id = reply.request().id();

        if self
            .remover
            .as_ref()
            .is_some_and(|remover| remover.is_waiting_for(id))
        {
            return self.handle_removal_reply(&reply);
        }

        let Some(kind) = self.outstanding.remove(&id) else {
            log::debug!("ignoring reply for unknown request {id}");
            return Vec::new();
        };

        let (request, status, payload) = reply.into_parts();
        let mut effects = Vec::new();

        match kind {
            RequestKind::DriveList => {
                if !status.is_success() {
                    self.report(&request, status, &mut effects);
                } else if let ReplyPayload::DriveList(drives) = payload {
                    if let Some(changed) =
                        self.address.set_known_locations(&drives)
                    {
                        effects.extend(self.navigate(changed));
                    }
                } else {
                    log::warn!("drive list reply without drive list payload");
                }
            },
            RequestKind::FileList { path } => {
                if path != self.address.current_path() {
                    log::debug!("ignoring stale file list for {path}");
                } else if !status.is_success() {
                    self.report(&request, status, &mut effects);
                } else if let ReplyPayload::FileList(entries) = payload {
                    self.listing.set_entries(entries, self.classifier.as_ref());
                    if let Some((column, order)) = self.initial_sort.take() {
                        self.listing.sort_by(column, order);
                    } else if self.resort_on_refresh {
                        self.listing.resort();
                    }
                } else {
                    log::warn!("file list reply without file list payload");
                }
            },
            RequestKind::CreateDirectory { .. }
            | RequestKind::Rename { .. } => {
                if !status.is_success() {
                    self.report(&request, status, &mut effects);
                }
                let current = self.address.current_path();
                self.issue(Request::file_list(current), &mut effects);
            },
            RequestKind::Remove { .. } => {
                log::debug!("ignoring remove reply outside of a batch");
            },
        }

        self.settle_phase();
        effects
    }

    fn handle_removal_reply(&mut self, reply: &Reply) -> Vec<BrowserEffect> {
        let Some(remover) = self.remover.as_mut() else {
            return Vec::new();
        };

        let events = remover.on_reply(reply);
        let next = remover.next_request();
        let finished = events.contains(&RemoverEvent::Finished);

        let mut effects: Vec<BrowserEffect> =
            events.into_iter().map(BrowserEffect::Removal).collect();
        if let Some(request) = next {
            effects.push(BrowserEffect::Send(request));
        }
        if finished {
            effects.extend(self.refresh());
        }

        effects
    }

    fn navigate(&mut self, changed: PathChanged) -> Vec<BrowserEffect> {
        let mut effects =
            vec![BrowserEffect::PathChanged(changed.path.clone())];
        self.issue(Request::file_list(changed.path), &mut effects);
        effects
    }

    fn issue(&mut self, request: Request, effects: &mut Vec<BrowserEffect>) {
        self.phase = match request.kind() {
            RequestKind::DriveList => BrowserPhase::AwaitingDriveList,
            RequestKind::FileList { .. } => BrowserPhase::AwaitingFileList,
            RequestKind::CreateDirectory { .. } => {
                BrowserPhase::AwaitingCreateDirectory
            },
            RequestKind::Rename { .. } => BrowserPhase::AwaitingRename,
            RequestKind::Remove { .. } => self.phase,
        };

        log::debug!("issuing request {}: {:?}", request.id(), request.kind());
        self.outstanding.insert(request.id(), request.kind().clone());
        effects.push(BrowserEffect::Send(request));
    }

    fn report(
        &self,
        request: &Request,
        status: FileStatus,
        effects: &mut Vec<BrowserEffect>,
    ) {
        let kind = request.kind();
        let error = OperationError::new(
            kind.operation(),
            kind.target().map(ToString::to_string),
            status,
        );

        log::warn!("{error}");
        effects.push(BrowserEffect::Error(error));
    }

    fn settle_phase(&mut self) {
        if self.outstanding.is_empty() {
            self.phase = BrowserPhase::Idle;
        }
    }

    /// Forget a request the transport failed to deliver.
    pub(crate) fn abandon(&mut self, request: &Request) -> Vec<BrowserEffect> {
        let id = request.id();
        if let Some(remover) = self
            .remover
            .as_mut()
            .filter(|remover| remover.is_waiting_for(id))
        {
            return remover
                .cancel()
                .into_iter()
                .map(BrowserEffect::Removal)
                .collect();
        }

        self.outstanding.remove(&id);
        self.settle_phase();
        Vec::new()
    }
}
