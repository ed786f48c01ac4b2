//! Persistence error types.
//!
//! Every failure here aborts the triggering load/save action and leaves
//! prior in-memory state untouched; the messages are written to be shown
//! to the user directly.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    /// File I/O error.
    #[error("failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File extension not recognized as any supported format.
    #[error("{path} is not a supported file format")]
    UnsupportedExtension { path: PathBuf },

    /// The format is recognized but no adapter is registered for it.
    #[error("no adapter registered for {extension} files: {path}")]
    NoAdapter { extension: String, path: PathBuf },

    /// File content unparsable as a delimited table.
    #[error("failed to parse {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    /// Atomic write failed (temp file could not be renamed).
    #[error("failed to complete save to {target_path}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PersistenceError {
    /// User-facing message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => format!("Could not {} the file at {}", operation, path.display()),
            Self::UnsupportedExtension { path } => {
                format!("{} is not a CSV or spreadsheet file", path.display())
            }
            Self::NoAdapter { extension, path } => format!(
                "Opening {} requires a {} adapter, which is not installed",
                path.display(),
                extension
            ),
            Self::Malformed { path, reason } => {
                format!("The file {} could not be read: {}", path.display(), reason)
            }
            Self::AtomicWriteFailed { target_path, .. } => format!(
                "Could not save the file to {}. Check disk space and permissions.",
                target_path.display()
            ),
        }
    }

    /// Suggestion for resolving this error, when there is one.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Io { operation, .. } => {
                if *operation == "read" {
                    Some("Check that the file exists and you have permission to read it.".into())
                } else {
                    Some("Check that you have permission to write to this location.".into())
                }
            }
            Self::UnsupportedExtension { .. } => {
                Some("Save the log as a .csv file and open that instead.".into())
            }
            Self::NoAdapter { .. } => {
                Some("Export the spreadsheet to CSV and open the exported file.".into())
            }
            Self::Malformed { .. } => None,
            Self::AtomicWriteFailed { .. } => {
                Some("Free up disk space or save to a different location.".into())
            }
        }
    }
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
