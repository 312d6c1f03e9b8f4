use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort the engine call that produced them.
/// We use `anyhow` at the top level for CLI error handling,
/// but these typed errors allow modules to be precise about failures.
#[derive(Debug, Error)]
pub enum DedupError {
    /// Scan root is missing or is not a directory
    #[error("Directory does not exist: {}", path.display())]
    InvalidDirectory { path: PathBuf },

    /// A group or member index that does not exist in the current result set
    #[error("No such selection: group {group_index}, member {member_index:?}")]
    InvalidSelection {
        group_index: usize,
        member_index: Option<usize>,
    },

    /// File system operation failed
    #[error("I/O error at '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is invalid
    #[error("Config error in '{}': {message}", path.display())]
    Config { path: PathBuf, message: String },

    /// Worker pool could not be started
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(String),
}

/// Per-file soft failure while fingerprinting or describing an image.
///
/// A file that is unavailable is skipped by the scan; it never aborts it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("'{}' unavailable: {reason}", path.display())]
pub struct Unavailable {
    pub path: PathBuf,
    pub reason: String,
}

impl Unavailable {
    pub fn new(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Per-file failure while removing a duplicate from disk.
#[derive(Debug, Clone, Error, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[error("Error deleting {}: {message}", path.display())]
pub struct DeletionError {
    pub path: PathBuf,
    pub message: String,
}

impl DeletionError {
    pub fn new(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self {
            path: path.into(),
            message: message.to_string(),
        }
    }
}
