use super::classify::{FileType, FileTypeClassifier};

/// Remote subdirectory row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    name: String,
    last_write: i64,
}

impl DirectoryEntry {
    pub fn new(name: impl Into<String>, last_write: i64) -> Self {
        Self {
            name: name.into(),
            last_write,
        }
    }

    /// Unnamed placeholder awaiting a name from the user.
    pub(crate) fn pending() -> Self {
        Self::new(String::new(), 0)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn last_write(&self) -> i64 {
        self.last_write
    }

    pub fn is_pending(&self) -> bool {
        self.name.is_empty()
    }
}

/// Remote file row with its cached type information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    name: String,
    size: u64,
    last_write: i64,
    file_type: FileType,
}

impl FileEntry {
    pub fn new(
        name: impl Into<String>,
        size: u64,
        last_write: i64,
        classifier: &dyn FileTypeClassifier,
    ) -> Self {
        let name = name.into();
        let file_type = classifier.classify(&name);
        Self {
            name,
            size,
            last_write,
            file_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn last_write(&self) -> i64 {
        self.last_write
    }

    pub fn file_type(&self) -> &FileType {
        &self.file_type
    }
}

/// Row of the merged directories-then-files sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row<'a> {
    Directory(&'a DirectoryEntry),
    File(&'a FileEntry),
}

impl<'a> Row<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            Row::Directory(directory) => directory.name(),
            Row::File(file) => file.name(),
        }
    }

    /// Size in bytes; directories report zero.
    pub fn size(&self) -> u64 {
        match self {
            Row::Directory(_) => 0,
            Row::File(file) => file.size(),
        }
    }

    pub fn last_write(&self) -> i64 {
        match self {
            Row::Directory(directory) => directory.last_write(),
            Row::File(file) => file.last_write(),
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Row::Directory(_))
    }

    /// Whether this is the unnamed placeholder directory.
    pub fn is_pending(&self) -> bool {
        matches!(self, Row::Directory(directory) if directory.is_pending())
    }
}
