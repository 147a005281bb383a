//! Release index: document model and atomic persistence
//!
//! This module owns the single metadata document tracking, per package, the
//! set of released versions and the platforms each version was built for:
//!
//! - [`model`]: the in-memory document and its update/query operations
//!   (create, merge, platform-scoped latest lookup, target field edits)
//! - [`store`]: load/save with write-temp-then-rename atomicity
//!
//! The index is loaded fully into memory, mutated, and rewritten wholesale;
//! there are no partial or streaming updates.

pub mod model;
pub mod store;

pub use model::{
    AddOutcome, ArtifactDescriptor, PackageEntry, PlatformKey, ReleaseIndex, TargetEntry,
    TargetField, VersionEntry, DEFAULT_DOWNLOAD_URL, SIGNATURE_EXT,
};
