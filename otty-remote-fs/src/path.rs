//! Remote path normalization.
//!
//! Remote hosts may report paths with either separator style. Every path the
//! browser stores goes through [`normalize`] so that comparisons are done on a
//! single canonical form: forward slashes only and a trailing separator.

use std::fmt;

use serde::{Deserialize, Serialize};

const SEPARATOR: char = '/';

/// Normalized remote directory path.
///
/// The empty path is reserved for the computer root, the aggregate view of
/// all drives. Every other value ends with `/`.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct RemotePath(String);

impl RemotePath {
    /// Return the computer root pseudo-path.
    pub fn computer() -> Self {
        Self(String::new())
    }

    /// Return whether this is the computer root pseudo-path.
    pub fn is_computer(&self) -> bool {
        self.0.is_empty()
    }

    /// Return the normalized text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the parent directory, or `None` for a root.
    pub fn parent(&self) -> Option<RemotePath> {
        if self.is_computer() {
            return None;
        }

        let trimmed = self.0.strip_suffix(SEPARATOR).unwrap_or(&self.0);
        let last_separator = trimmed.rfind(SEPARATOR)?;

        Some(normalize(&trimmed[..last_separator]))
    }

    /// Append a child entry name.
    pub fn join(&self, name: &str) -> RemotePath {
        let mut joined = normalize(&self.0).0;
        joined.push_str(name);
        normalize(&joined)
    }

    /// Return the last path segment without separators.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.0.strip_suffix(SEPARATOR)?;
        let name = match trimmed.rfind(SEPARATOR) {
            Some(index) => &trimmed[index + 1..],
            None => trimmed,
        };

        if name.is_empty() { None } else { Some(name) }
    }

    /// Build the full path of an entry inside this directory without adding
    /// a trailing separator.
    pub fn entry(&self, name: &str) -> String {
        format!("{}{name}", self.0)
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RemotePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Canonicalize separators and make sure the path ends with `/`.
pub fn normalize(path: &str) -> RemotePath {
    let mut normalized = path.replace('\\', "/");
    if !normalized.ends_with(SEPARATOR) {
        normalized.push(SEPARATOR);
    }

    RemotePath(normalized)
}
