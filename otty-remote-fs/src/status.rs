use std::fmt;

use serde::{Deserialize, Serialize};

/// Status code reported by the remote host for every reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileStatus {
    Success,
    InvalidRequest,
    InvalidPathName,
    PathNotFound,
    PathAlreadyExists,
    NoDrivesFound,
    DiskFull,
    AccessDenied,
    FileOpenError,
    FileCreateError,
    FileWriteError,
    FileReadError,
    Unknown(i32),
}

impl FileStatus {
    /// Decode a raw wire status code.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Success,
            1 => Self::InvalidRequest,
            2 => Self::InvalidPathName,
            3 => Self::PathNotFound,
            4 => Self::PathAlreadyExists,
            5 => Self::NoDrivesFound,
            6 => Self::DiskFull,
            7 => Self::AccessDenied,
            8 => Self::FileOpenError,
            9 => Self::FileCreateError,
            10 => Self::FileWriteError,
            11 => Self::FileReadError,
            other => Self::Unknown(other),
        }
    }

    /// Raw wire status code.
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::InvalidRequest => 1,
            Self::InvalidPathName => 2,
            Self::PathNotFound => 3,
            Self::PathAlreadyExists => 4,
            Self::NoDrivesFound => 5,
            Self::DiskFull => 6,
            Self::AccessDenied => 7,
            Self::FileOpenError => 8,
            Self::FileCreateError => 9,
            Self::FileWriteError => 10,
            Self::FileReadError => 11,
            Self::Unknown(code) => code,
        }
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    /// Human-readable reason shown to the user.
    pub fn reason(self) -> &'static str {
        match self {
            Self::Success => "Successfully completed",
            Self::InvalidRequest => "Invalid request",
            Self::InvalidPathName => "Invalid directory or file name",
            Self::PathNotFound => "Path not found",
            Self::PathAlreadyExists => "Path already exists",
            Self::NoDrivesFound => "No drives found",
            Self::DiskFull => "Disk is full",
            Self::AccessDenied => "Access denied",
            Self::FileOpenError => "Could not open file",
            Self::FileCreateError => "Could not create or replace file",
            Self::FileWriteError => "Could not write to file",
            Self::FileReadError => "Could not read file",
            Self::Unknown(_) => "Unknown status code",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}
