use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Listing columns in display order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Name,
    Size,
    Type,
    Modified,
}

impl Column {
    pub const ALL: [Column; 4] =
        [Column::Name, Column::Size, Column::Type, Column::Modified];

    /// Header title.
    pub fn title(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Size => "Size",
            Self::Type => "Type",
            Self::Modified => "Modified",
        }
    }

    /// Only the name column accepts inline edits.
    pub fn is_editable(self) -> bool {
        self == Self::Name
    }
}

/// Sort direction.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

bitflags! {
    /// Interaction capabilities of a listing cell.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ItemFlags: u8 {
        const SELECTABLE = 1 << 0;
        const EDITABLE = 1 << 1;
        const DRAG = 1 << 2;
        const DROP = 1 << 3;
    }
}
