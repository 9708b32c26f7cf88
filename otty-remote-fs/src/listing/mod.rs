//! Directory listing model: directories and files merged into one sortable,
//! editable sequence that can be dragged to another panel.

mod classify;
mod column;
mod entry;
mod format;
mod model;
mod transfer;

pub use classify::{
    ExtensionClassifier, FileType, FileTypeClassifier, IconHandle,
};
pub use column::{Column, ItemFlags, SortOrder};
pub use entry::{DirectoryEntry, FileEntry, Row};
pub use format::{format_size, format_time, selection_status};
pub use model::{EditOutcome, EditToken, ListingChange, ListingModel};
pub use transfer::{
    DropRequest, ModelId, TRANSFER_FORMAT, TransferData, TransferItem,
    TransferPayload,
};
