//! Command implementations
//!
//! Each command module provides a clap-derived struct and execute method.

pub mod edit;
pub mod latest;
pub mod show;
pub mod stage;

use std::path::Path;

use anyhow::Result;

use crate::error::{hints, RelstageError};
use crate::index::{store, ReleaseIndex};

/// Load the index, attaching the recovery hint when the document is corrupt
pub(crate) fn load_index(path: &Path) -> Result<ReleaseIndex> {
    store::load(path).map_err(|err| match err {
        RelstageError::CorruptIndex { .. } => {
            anyhow::Error::new(err).context(hints::corrupt_index())
        }
        other => other.into(),
    })
}
