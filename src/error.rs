//! Error types for the release index core
//!
//! Fatal conditions carry enough context to tell the user which document or
//! input was at fault. A duplicate platform target is not an error: it is
//! reported as [`AddOutcome::Conflict`](crate::index::AddOutcome) and the
//! rest of the operation proceeds.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal error taxonomy for index operations
#[derive(Error, Debug)]
pub enum RelstageError {
    /// Version string that is not exactly `major.minor.patch`
    #[error("Malformed version '{input}': {reason}")]
    MalformedVersion { input: String, reason: String },

    /// Unknown version update kind
    #[error("Invalid update kind '{kind}' (expected 'major', 'minor', or 'patch')")]
    InvalidUpdateKind { kind: String },

    /// On-disk index exists but cannot be understood
    #[error("Corrupt release index at {}: {reason}", .path.display())]
    CorruptIndex { path: PathBuf, reason: String },

    /// I/O failure while loading or saving a document
    #[error("Failed to persist {}: {message}", .path.display())]
    Persistence {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl RelstageError {
    /// Create a malformed-version error
    pub fn malformed_version(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedVersion {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a corrupt-index error
    pub fn corrupt_index(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CorruptIndex {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a persistence error wrapping an I/O failure
    pub fn persistence(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Self::Persistence {
            path: path.into(),
            message: message.into(),
            source: Some(source),
        }
    }
}

/// Common hints surfaced alongside fatal errors
pub mod hints {
    /// Hint for a corrupt index document
    pub fn corrupt_index() -> &'static str {
        "The index file exists but could not be parsed.\n\
         \n\
         To recover:\n\
         • Restore the file from your build pipeline's backing store, or\n\
         • Move it aside and re-stage; a fresh empty index will be created\n\
         \n\
         Do not hand-edit the file while staging runs are in flight."
    }

    /// Hint for an invalid builder string
    pub fn builder_format() -> &'static str {
        "Builders are written as '<os>_<arch>', e.g. 'ubuntu_amd64' or 'macos_arm64'."
    }
}
