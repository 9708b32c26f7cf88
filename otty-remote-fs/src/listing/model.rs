use std::cmp::Ordering;

use crate::error::{ListingError, TransferError};
use crate::protocol::RemoteEntry;

use super::classify::FileTypeClassifier;
use super::column::{Column, ItemFlags, SortOrder};
use super::entry::{DirectoryEntry, FileEntry, Row};
use super::transfer::{
    DropRequest, ModelId, TransferData, TransferItem, TransferPayload,
};

/// Structural change notifications for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingChange {
    /// Every row was replaced.
    Reset,
    RowsInserted { first: usize, last: usize },
    RowsRemoved { first: usize, last: usize },
    /// Rows were reordered in place.
    DataChanged,
}

/// Result of an inline name edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Name left as it was.
    Unchanged,
    /// Placeholder abandoned with an empty name.
    Discarded,
    /// Placeholder confirmed; the directory must be created remotely.
    CreateDirectory { name: String },
    /// Existing entry renamed; applied only after the remote confirms.
    Rename { old_name: String, new_name: String },
}

/// Handle to an inline name edit.
///
/// A token for an existing row expires on any structural change. A token
/// for the placeholder stays valid while that placeholder exists, so it
/// survives sorting but not a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditToken {
    position: usize,
    generation: u64,
    placeholder: Option<u64>,
}

impl EditToken {
    /// Row the edit was opened on.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder.is_some()
    }
}

/// Directories and files of the displayed directory as one sequence.
///
/// Rows `0..directories` are directories, the rest are files. A pending
/// placeholder directory is always the last directory row.
#[derive(Debug)]
pub struct ListingModel {
    id: ModelId,
    directories: Vec<DirectoryEntry>,
    files: Vec<FileEntry>,
    sort: Option<(Column, SortOrder)>,
    changes: Vec<ListingChange>,
    generation: u64,
    placeholders: u64,
}

impl Default for ListingModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingModel {
    pub fn new() -> Self {
        Self {
            id: ModelId::new(),
            directories: Vec::new(),
            files: Vec::new(),
            sort: None,
            changes: Vec::new(),
            generation: 0,
            placeholders: 0,
        }
    }

    // --- Read access ---

    /// Identity used to detect drops onto the panel the drag started from.
    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.directories.len() + self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn directories(&self) -> &[DirectoryEntry] {
        &self.directories
    }

    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    /// Return the row at `position` in the merged sequence.
    pub fn row(&self, position: usize) -> Option<Row<'_>> {
        match self.directories.get(position) {
            Some(directory) => Some(Row::Directory(directory)),
            None => self
                .files
                .get(position - self.directories.len())
                .map(Row::File),
        }
    }

    /// Iterate rows in display order.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.directories
            .iter()
            .map(Row::Directory)
            .chain(self.files.iter().map(Row::File))
    }

    pub fn is_directory(&self, position: usize) -> bool {
        position < self.directories.len()
    }

    pub fn name_at(&self, position: usize) -> Option<&str> {
        self.row(position).map(|row| row.name())
    }

    pub fn size_at(&self, position: usize) -> Option<u64> {
        self.row(position).map(|row| row.size())
    }

    /// Position of the pending placeholder, if one exists.
    pub fn pending_position(&self) -> Option<usize> {
        match self.directories.last() {
            Some(directory) if directory.is_pending() => {
                Some(self.directories.len() - 1)
            },
            _ => None,
        }
    }

    /// Currently active sort column and order.
    pub fn sort_state(&self) -> Option<(Column, SortOrder)> {
        self.sort
    }

    /// Interaction flags of a cell.
    pub fn flags(&self, position: usize, column: Column) -> ItemFlags {
        let Some(row) = self.row(position) else {
            return ItemFlags::DROP;
        };

        let mut flags = ItemFlags::SELECTABLE;
        if column.is_editable() {
            flags |= ItemFlags::EDITABLE | ItemFlags::DRAG;
            if row.is_directory() {
                flags |= ItemFlags::DROP;
            }
        }

        flags
    }

    /// Drain structural change notifications.
    pub fn take_changes(&mut self) -> Vec<ListingChange> {
        std::mem::take(&mut self.changes)
    }

    // --- Write access ---

    /// Replace both collections at once.
    pub fn set_listing(
        &mut self,
        directories: Vec<DirectoryEntry>,
        files: Vec<FileEntry>,
    ) {
        self.directories = directories;
        self.files = files;
        self.record(ListingChange::Reset);
    }

    /// Replace the listing with remote file list entries.
    pub fn set_entries(
        &mut self,
        entries: Vec<RemoteEntry>,
        classifier: &dyn FileTypeClassifier,
    ) {
        let mut directories = Vec::new();
        let mut files = Vec::new();

        for entry in entries {
            if entry.is_directory {
                directories
                    .push(DirectoryEntry::new(entry.name, entry.modified));
            } else {
                files.push(FileEntry::new(
                    entry.name,
                    entry.size,
                    entry.modified,
                    classifier,
                ));
            }
        }

        self.set_listing(directories, files);
    }

    /// Remove every row.
    pub fn clear(&mut self) {
        if self.is_empty() {
            return;
        }

        self.directories.clear();
        self.files.clear();
        self.record(ListingChange::Reset);
    }

    /// Append an unnamed directory placeholder and open its name edit.
    ///
    /// An existing placeholder is reused.
    pub fn add_pending_directory(&mut self) -> EditToken {
        if let Some(position) = self.pending_position() {
            return self.placeholder_token(position);
        }

        self.directories.push(DirectoryEntry::pending());
        self.placeholders += 1;
        let position = self.directories.len() - 1;
        self.record(ListingChange::RowsInserted {
            first: position,
            last: position,
        });

        self.placeholder_token(position)
    }

    /// Open an inline edit of the cell at `position`.
    pub fn begin_edit(
        &self,
        position: usize,
        column: Column,
    ) -> Result<EditToken, ListingError> {
        let len = self.len();
        if self.row(position).is_none() {
            return Err(ListingError::OutOfRange { position, len });
        }
        if !column.is_editable() {
            return Err(ListingError::NotEditable);
        }

        if self.pending_position() == Some(position) {
            return Ok(self.placeholder_token(position));
        }

        Ok(EditToken {
            position,
            generation: self.generation,
            placeholder: None,
        })
    }

    /// Resolve the inline edit opened as `token`.
    ///
    /// Fails with [`ListingError::StaleEdit`] when the rows moved or were
    /// replaced since the edit began.
    pub fn resolve_edit(
        &mut self,
        token: EditToken,
        new_name: &str,
    ) -> Result<EditOutcome, ListingError> {
        let position = self.edit_position(token)?;
        let len = self.len();
        let row = self
            .row(position)
            .ok_or(ListingError::OutOfRange { position, len })?;

        let old_name = row.name().to_string();
        if token.is_placeholder() {
            self.directories.remove(position);
            self.record(ListingChange::RowsRemoved {
                first: position,
                last: position,
            });

            if new_name.is_empty() {
                return Ok(EditOutcome::Discarded);
            }

            return Ok(EditOutcome::CreateDirectory {
                name: new_name.to_string(),
            });
        }

        if old_name == new_name {
            return Ok(EditOutcome::Unchanged);
        }

        Ok(EditOutcome::Rename {
            old_name,
            new_name: new_name.to_string(),
        })
    }

    /// Sort by `column`. Returns `false` without touching the rows when the
    /// same column and order are already active.
    pub fn sort_by(&mut self, column: Column, order: SortOrder) -> bool {
        if self.sort == Some((column, order)) {
            return false;
        }

        self.sort = Some((column, order));
        self.apply_sort(column, order);
        true
    }

    /// Re-apply the active sort, for example after a refresh.
    pub fn resort(&mut self) -> bool {
        let Some((column, order)) = self.sort else {
            return false;
        };

        self.apply_sort(column, order);
        true
    }

    /// Build the drag payload for the selected positions.
    ///
    /// Returns `None` when nothing valid is selected.
    pub fn package_for_transfer(
        &self,
        positions: &[usize],
    ) -> Option<TransferPayload> {
        let items: Vec<TransferItem> = positions
            .iter()
            .filter_map(|position| self.row(*position))
            .filter(|row| !row.is_pending())
            .map(|row| TransferItem {
                name: row.name().to_string(),
                size: row.size(),
                is_directory: row.is_directory(),
            })
            .collect();

        if items.is_empty() {
            return None;
        }

        Some(TransferPayload::new(self.id, items))
    }

    /// Validate dropped data and resolve the folder it was dropped on.
    ///
    /// `target` is the row under the cursor; dropping on a file or outside
    /// any row targets the current directory.
    pub fn accept_incoming_transfer(
        &self,
        data: &TransferData,
        target: Option<usize>,
    ) -> Result<DropRequest, TransferError> {
        let payload = data.decode()?;
        if payload.origin() == self.id {
            return Err(TransferError::SelfTransfer);
        }
        if payload.items().is_empty() {
            return Err(TransferError::Empty);
        }

        let target_folder = target
            .and_then(|position| self.row(position))
            .filter(|row| row.is_directory())
            .map(|row| row.name().to_string())
            .unwrap_or_default();

        Ok(DropRequest {
            target_folder,
            payload,
        })
    }

    fn apply_sort(&mut self, column: Column, order: SortOrder) {
        let pending = match self.pending_position() {
            Some(position) => Some(self.directories.remove(position)),
            None => None,
        };

        match column {
            Column::Name => {
                sort_ordered(&mut self.directories, order, |a, b| {
                    compare_names(a.name(), b.name())
                });
                sort_ordered(&mut self.files, order, |a, b| {
                    compare_names(a.name(), b.name())
                });
            },
            Column::Size => {
                sort_ordered(&mut self.files, order, |a, b| {
                    a.size().cmp(&b.size())
                });
            },
            Column::Type => {
                sort_ordered(&mut self.files, order, |a, b| {
                    a.file_type().label().cmp(b.file_type().label())
                });
            },
            Column::Modified => {
                sort_ordered(&mut self.directories, order, |a, b| {
                    a.last_write().cmp(&b.last_write())
                });
                sort_ordered(&mut self.files, order, |a, b| {
                    a.last_write().cmp(&b.last_write())
                });
            },
        }

        self.directories.extend(pending);
        self.record(ListingChange::DataChanged);
    }

    fn record(&mut self, change: ListingChange) {
        self.generation += 1;
        self.changes.push(change);
    }

    fn placeholder_token(&self, position: usize) -> EditToken {
        EditToken {
            position,
            generation: self.generation,
            placeholder: Some(self.placeholders),
        }
    }

    fn edit_position(&self, token: EditToken) -> Result<usize, ListingError> {
        match token.placeholder {
            Some(serial) if serial == self.placeholders => {
                self.pending_position().ok_or(ListingError::StaleEdit)
            },
            Some(_) => Err(ListingError::StaleEdit),
            None if token.generation == self.generation => Ok(token.position),
            None => Err(ListingError::StaleEdit),
        }
    }
}

fn sort_ordered<T>(
    items: &mut [T],
    order: SortOrder,
    compare: impl Fn(&T, &T) -> Ordering,
) {
    match order {
        SortOrder::Ascending => items.sort_by(|a, b| compare(a, b)),
        SortOrder::Descending => items.sort_by(|a, b| compare(b, a)),
    }
}

fn compare_names(left: &str, right: &str) -> Ordering {
    left.to_lowercase().cmp(&right.to_lowercase())
}
