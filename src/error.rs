//! Error types for code2xml operations.
//!
//! Every failure maps to a process exit code and a set of recovery suggestions
//! shown to the user after the error message.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for code2xml operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Exit code for a successful run
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for unclassified failures
pub const EXIT_FAILURE: i32 = 1;

/// Exit code for usage errors (matches clap's own usage exit code)
pub const EXIT_USAGE: i32 = 2;

/// Exit code when the target path does not exist
pub const EXIT_PATH_NOT_FOUND: i32 = 3;

/// Exit code when the target path cannot be read
pub const EXIT_PERMISSION_DENIED: i32 = 4;

/// Exit code when the target cannot be converted (binary, oversized, blank)
pub const EXIT_UNSUPPORTED: i32 = 5;

/// Main error type for all conversion operations
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Missing or inconsistent command line arguments
    #[error("Invalid arguments: {reason}")]
    Usage {
        /// Reason for the error
        reason: String,
    },

    /// Target path does not exist
    #[error("Path not found: {}", .path.display())]
    PathNotFound {
        /// Path as given by the caller
        path: PathBuf,
    },

    /// Target path exists but cannot be read
    #[error("Permission denied: {}", .path.display())]
    PermissionDenied {
        /// Path that could not be read
        path: PathBuf,
    },

    /// Target exists but has nothing convertible in it
    #[error("Cannot convert {}: {reason}", .path.display())]
    Unsupported {
        /// Offending path
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// I/O error with the operation and path that caused it.
    ///
    /// Created by the [`ErrorExt`] trait's `fs_context` method.
    #[error("{context} {}: {error}", .path.display())]
    Fs {
        /// Operation being performed, e.g. "creating output file"
        context: &'static str,
        /// Path that was being accessed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        error: io::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Background conversion task panicked or was cancelled
    #[error("Conversion task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ConvertError {
    /// Classify an I/O error raised while inspecting the target path.
    ///
    /// `NotFound` and `PermissionDenied` become their dedicated variants so the
    /// caller can tell them apart by exit code.
    pub fn from_target_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => ConvertError::PathNotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => ConvertError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => ConvertError::Fs {
                context: "resolving",
                path: path.to_path_buf(),
                error,
            },
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ConvertError::Usage { .. } => EXIT_USAGE,
            ConvertError::PathNotFound { .. } => EXIT_PATH_NOT_FOUND,
            ConvertError::PermissionDenied { .. } => EXIT_PERMISSION_DENIED,
            ConvertError::Unsupported { .. } => EXIT_UNSUPPORTED,
            ConvertError::Fs { error, .. } if error.kind() == io::ErrorKind::PermissionDenied => {
                EXIT_PERMISSION_DENIED
            }
            _ => EXIT_FAILURE,
        }
    }

    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ConvertError::Usage { .. } => {
                vec!["Run with --help to see the accepted arguments".to_string()]
            }
            ConvertError::PathNotFound { path } => vec![
                format!("Check that '{}' exists", path.display()),
                "Quote paths that contain spaces".to_string(),
            ],
            ConvertError::PermissionDenied { path } => vec![
                format!("Check read permissions on '{}'", path.display()),
                "Run from an account that can read the target".to_string(),
            ],
            ConvertError::Unsupported { .. } => vec![
                "Only non-empty text files can be converted".to_string(),
                "Use --max-file-size to raise the size limit".to_string(),
            ],
            ConvertError::Fs { path, .. } => vec![
                format!("Check that '{}' is writable", path.display()),
                "Use --output to write the document somewhere else".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}

/// Attach filesystem context to I/O results.
///
/// ```
/// use code2xml::error::{ErrorExt, Result};
/// use std::path::Path;
///
/// fn read(path: &Path) -> Result<String> {
///     std::fs::read_to_string(path).fs_context("reading", path)
/// }
/// ```
pub trait ErrorExt<T> {
    /// Add filesystem context to an I/O error.
    ///
    /// The `context` should be a present-tense verb phrase describing the operation,
    /// e.g., "reading file", "creating output file".
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| ConvertError::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}
