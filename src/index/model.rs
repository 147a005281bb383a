//! Release index document model
//!
//! The index is a single JSON object mapping package names to their release
//! history:
//!
//! ```text
//! {
//!   "acme-agent": {
//!     "latest": "1.4.0",
//!     "versions": {
//!       "1.4.0": { "targets": {
//!         "ubuntu_amd64": { "url": "...", "signature": "...", "sha256": "..." }
//!       }}
//!     }
//!   }
//! }
//! ```
//!
//! The `latest` pointer is maintained incrementally on every insert and is
//! never recomputed from the version keys on read. Platform targets are
//! append-only from the index's point of view: a duplicate
//! (package, version, platform) add reports a conflict instead of replacing
//! the existing entry, and field updates go through [`ReleaseIndex::edit_target`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::error::RelstageError;
use crate::version::Version;

/// Placeholder download URL recorded for a freshly staged target
///
/// The real URL is filled in by the upload step via `edit`.
pub const DEFAULT_DOWNLOAD_URL: &str = "https://example.com/package";

/// File extension for detached signature files
pub const SIGNATURE_EXT: &str = "sig";

/// An operating-system/architecture pair a build was produced for
///
/// Serialized as `"{os}_{arch}"` in target maps and builder flags. Both
/// components are case-sensitive and must be non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlatformKey {
    pub os: String,
    pub arch: String,
}

impl PlatformKey {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        PlatformKey {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Parse a builder string like "ubuntu_amd64"
    ///
    /// Splits at the first underscore, so any further underscores belong to
    /// the architecture component.
    pub fn parse(s: &str) -> Result<Self> {
        match s.split_once('_') {
            Some((os, arch)) if !os.is_empty() && !arch.is_empty() => {
                Ok(PlatformKey::new(os, arch))
            }
            _ => bail!("Invalid builder '{}': expected '<os>_<arch>'", s),
        }
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.os, self.arch)
    }
}

/// Download metadata for one (version, platform) build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetEntry {
    /// Download location
    pub url: String,

    /// Detached-signature reference or filename
    pub signature: String,

    /// Content digest; empty until the artifact is published
    #[serde(default)]
    pub sha256: String,
}

impl TargetEntry {
    /// Entry recorded at stage time, before upload and signing
    pub fn placeholder() -> Self {
        TargetEntry {
            url: DEFAULT_DOWNLOAD_URL.to_string(),
            signature: String::new(),
            sha256: String::new(),
        }
    }
}

/// One released version of a package: the set of platforms it was built for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    /// Targets keyed by serialized [`PlatformKey`]
    pub targets: BTreeMap<String, TargetEntry>,
}

impl VersionEntry {
    /// Version entry holding a single placeholder target
    fn for_platform(platform: &PlatformKey) -> Self {
        let mut targets = BTreeMap::new();
        targets.insert(platform.to_string(), TargetEntry::placeholder());
        VersionEntry { targets }
    }
}

/// Release history of a single package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageEntry {
    /// Greatest version recorded so far, across all platforms
    pub latest: String,

    /// All recorded versions, keyed by version string
    pub versions: BTreeMap<String, VersionEntry>,
}

/// Outcome of recording a build in the index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Package was unknown; a fresh entry was initialized
    Created,
    /// Version was new for the package
    VersionAdded,
    /// Version existed; a new platform target was added to it
    TargetAdded,
    /// The (version, platform) pair was already recorded; nothing changed
    Conflict,
}

impl fmt::Display for AddOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddOutcome::Created => write!(f, "package created"),
            AddOutcome::VersionAdded => write!(f, "version added"),
            AddOutcome::TargetAdded => write!(f, "target added"),
            AddOutcome::Conflict => write!(f, "target already recorded"),
        }
    }
}

/// Editable fields of a [`TargetEntry`]
///
/// An explicit allow-list: unknown field names never reach the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetField {
    Url,
    Signature,
    Sha256,
}

impl FromStr for TargetField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "url" => Ok(TargetField::Url),
            "signature" => Ok(TargetField::Signature),
            "sha256" => Ok(TargetField::Sha256),
            other => bail!(
                "Unknown target field '{}' (editable fields: url, signature, sha256)",
                other
            ),
        }
    }
}

/// The root release index document
///
/// Loaded fully into memory, mutated through the methods below, then
/// persisted wholesale. One instance per invocation, passed explicitly;
/// there is no shared global.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReleaseIndex {
    packages: BTreeMap<String, PackageEntry>,
}

impl ReleaseIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&PackageEntry> {
        self.packages.get(name)
    }

    /// Iterate packages in name order
    pub fn packages(&self) -> impl Iterator<Item = (&String, &PackageEntry)> {
        self.packages.iter()
    }

    /// Initialize (or reset) a package entry
    ///
    /// Unconditionally replaces any existing entry for `name` with a fresh
    /// one holding a single placeholder target. Callers must only invoke
    /// this for names not yet present; [`ReleaseIndex::add_version`] is the
    /// safe entry point and delegates here exactly when the name is absent.
    pub fn create_package(&mut self, name: &str, version: &Version, platform: &PlatformKey) {
        let mut versions = BTreeMap::new();
        versions.insert(version.to_string(), VersionEntry::for_platform(platform));
        self.packages.insert(
            name.to_string(),
            PackageEntry {
                latest: version.to_string(),
                versions,
            },
        );
    }

    /// Record a build of `version` for `platform`
    ///
    /// Advances the package's `latest` pointer whenever `version` supersedes
    /// it, regardless of platform. A duplicate (version, platform) pair
    /// leaves the existing target untouched and reports
    /// [`AddOutcome::Conflict`]; the `latest` advance, if any, still stands.
    pub fn add_version(
        &mut self,
        name: &str,
        version: &Version,
        platform: &PlatformKey,
    ) -> Result<AddOutcome, RelstageError> {
        let Some(entry) = self.packages.get_mut(name) else {
            self.create_package(name, version, platform);
            return Ok(AddOutcome::Created);
        };

        let current = Version::parse(&entry.latest)?;
        if version.supersedes(Some(&current)) {
            entry.latest = version.to_string();
        }

        let version_key = version.to_string();
        let target_key = platform.to_string();
        match entry.versions.get_mut(&version_key) {
            None => {
                entry
                    .versions
                    .insert(version_key, VersionEntry::for_platform(platform));
                Ok(AddOutcome::VersionAdded)
            }
            Some(version_entry) => {
                if version_entry.targets.contains_key(&target_key) {
                    return Ok(AddOutcome::Conflict);
                }
                version_entry
                    .targets
                    .insert(target_key, TargetEntry::placeholder());
                Ok(AddOutcome::TargetAdded)
            }
        }
    }

    /// Greatest version of `name` that was built for `platform`
    ///
    /// A full scan over the package's versions; the index is deliberately
    /// not platform-indexed, and version counts per package stay small.
    pub fn latest_for_platform(&self, name: &str, platform: &PlatformKey) -> Option<Version> {
        let entry = self.packages.get(name)?;
        let target_key = platform.to_string();

        entry
            .versions
            .iter()
            .filter(|(_, version_entry)| version_entry.targets.contains_key(&target_key))
            .filter_map(|(version, _)| Version::parse(version).ok())
            .max()
    }

    /// Update a single field of an existing target
    ///
    /// Returns false without mutating anything when the package, version, or
    /// platform target does not exist. Any value is accepted, including
    /// overwriting a previously set one.
    pub fn edit_target(
        &mut self,
        name: &str,
        version: &Version,
        platform: &PlatformKey,
        field: TargetField,
        value: &str,
    ) -> bool {
        let Some(target) = self
            .packages
            .get_mut(name)
            .and_then(|entry| entry.versions.get_mut(&version.to_string()))
            .and_then(|version_entry| version_entry.targets.get_mut(&platform.to_string()))
        else {
            return false;
        };

        match field {
            TargetField::Url => target.url = value.to_string(),
            TargetField::Signature => target.signature = value.to_string(),
            TargetField::Sha256 => target.sha256 = value.to_string(),
        }
        true
    }
}

/// Detached metadata document for one staged build
///
/// Written next to the artifact, never merged back into the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactDescriptor {
    pub name: String,
    pub version: String,
    pub os: String,
    pub arch: String,

    /// Dependency name → required version constraint, stored verbatim
    pub dependencies: BTreeMap<String, String>,
}

impl ArtifactDescriptor {
    pub fn new(
        name: &str,
        version: &Version,
        platform: &PlatformKey,
        dependencies: BTreeMap<String, String>,
    ) -> Self {
        ArtifactDescriptor {
            name: name.to_string(),
            version: version.to_string(),
            os: platform.os.clone(),
            arch: platform.arch.clone(),
            dependencies,
        }
    }

    /// Deterministic lowercase base name for on-disk artifact files
    ///
    /// `"{name}_v{version}_{os}_{arch}"`, optionally suffixed with the
    /// signature extension. ASCII lowercasing keeps the result
    /// locale-independent.
    pub fn file_stem(&self, with_signature_ext: bool) -> String {
        let stem = format!(
            "{}_v{}_{}_{}",
            self.name, self.version, self.os, self.arch
        )
        .to_ascii_lowercase();

        if with_signature_ext {
            format!("{}.{}", stem, SIGNATURE_EXT)
        } else {
            stem
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linux_amd64() -> PlatformKey {
        PlatformKey::new("linux", "amd64")
    }

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_platform_key_parse() {
        let key = PlatformKey::parse("ubuntu_amd64").unwrap();
        assert_eq!(key.os, "ubuntu");
        assert_eq!(key.arch, "amd64");
        assert_eq!(key.to_string(), "ubuntu_amd64");

        assert!(PlatformKey::parse("ubuntu").is_err());
        assert!(PlatformKey::parse("_amd64").is_err());
        assert!(PlatformKey::parse("ubuntu_").is_err());
        assert!(PlatformKey::parse("").is_err());
    }

    #[test]
    fn test_platform_key_equality_is_exact() {
        assert_ne!(PlatformKey::new("Linux", "amd64"), linux_amd64());
        assert_ne!(PlatformKey::new("linux", "arm64"), linux_amd64());
        assert_eq!(PlatformKey::new("linux", "amd64"), linux_amd64());
    }

    #[test]
    fn test_create_package_initializes_entry() {
        let mut index = ReleaseIndex::new();
        index.create_package("p", &v("1.0.0"), &linux_amd64());

        let entry = index.get("p").unwrap();
        assert_eq!(entry.latest, "1.0.0");
        assert_eq!(entry.versions.len(), 1);

        let target = &entry.versions["1.0.0"].targets["linux_amd64"];
        assert_eq!(target.url, DEFAULT_DOWNLOAD_URL);
        assert_eq!(target.signature, "");
        assert_eq!(target.sha256, "");
    }

    #[test]
    fn test_create_package_resets_existing_entry() {
        let mut index = ReleaseIndex::new();
        index.create_package("p", &v("1.0.0"), &linux_amd64());
        index.add_version("p", &v("1.0.1"), &linux_amd64()).unwrap();

        // Documented destructive precondition violation: the prior history
        // is gone, not merged.
        index.create_package("p", &v("2.0.0"), &linux_amd64());
        let entry = index.get("p").unwrap();
        assert_eq!(entry.latest, "2.0.0");
        assert_eq!(entry.versions.len(), 1);
    }

    #[test]
    fn test_add_version_creates_unknown_package() {
        let mut index = ReleaseIndex::new();
        let outcome = index.add_version("p", &v("1.0.0"), &linux_amd64()).unwrap();
        assert_eq!(outcome, AddOutcome::Created);
        assert!(index.contains("p"));
    }

    #[test]
    fn test_add_version_tracks_latest_incrementally() {
        let mut index = ReleaseIndex::new();
        index.create_package("p", &v("1.0.0"), &linux_amd64());

        assert_eq!(
            index.add_version("p", &v("1.0.1"), &linux_amd64()).unwrap(),
            AddOutcome::VersionAdded
        );
        assert_eq!(
            index.add_version("p", &v("1.0.2"), &linux_amd64()).unwrap(),
            AddOutcome::VersionAdded
        );

        let entry = index.get("p").unwrap();
        assert_eq!(entry.latest, "1.0.2");
        assert_eq!(entry.versions.len(), 3);
    }

    #[test]
    fn test_add_version_lower_version_keeps_latest() {
        let mut index = ReleaseIndex::new();
        index.create_package("p", &v("2.0.0"), &linux_amd64());

        let macos = PlatformKey::new("macos", "arm64");
        index.add_version("p", &v("1.5.0"), &macos).unwrap();

        let entry = index.get("p").unwrap();
        assert_eq!(entry.latest, "2.0.0");
        assert_eq!(index.latest_for_platform("p", &macos), Some(v("1.5.0")));
    }

    #[test]
    fn test_duplicate_target_reports_conflict_and_changes_nothing() {
        let mut index = ReleaseIndex::new();
        index.add_version("p", &v("1.0.0"), &linux_amd64()).unwrap();
        index.edit_target(
            "p",
            &v("1.0.0"),
            &linux_amd64(),
            TargetField::Url,
            "https://cdn.example.com/p-1.0.0.tar.gz",
        );

        let before = index.clone();
        let outcome = index.add_version("p", &v("1.0.0"), &linux_amd64()).unwrap();

        assert_eq!(outcome, AddOutcome::Conflict);
        assert_eq!(index, before);
    }

    #[test]
    fn test_new_target_on_existing_version() {
        let mut index = ReleaseIndex::new();
        index.add_version("p", &v("1.0.0"), &linux_amd64()).unwrap();

        let macos = PlatformKey::new("macos", "arm64");
        let outcome = index.add_version("p", &v("1.0.0"), &macos).unwrap();
        assert_eq!(outcome, AddOutcome::TargetAdded);

        let entry = index.get("p").unwrap();
        assert_eq!(entry.versions["1.0.0"].targets.len(), 2);
        assert_eq!(entry.versions.len(), 1);
    }

    #[test]
    fn test_latest_for_platform_isolation() {
        let mut index = ReleaseIndex::new();
        index.create_package("p", &v("1.0.0"), &linux_amd64());
        index.add_version("p", &v("1.0.1"), &linux_amd64()).unwrap();
        index.add_version("p", &v("1.0.2"), &linux_amd64()).unwrap();

        let arch = PlatformKey::new("arch", "amd64");
        index.add_version("p", &v("1.0.4"), &arch).unwrap();

        // A newer version on an unrelated platform does not leak into the
        // linux query, but it does advance the package-wide latest.
        assert_eq!(
            index.latest_for_platform("p", &linux_amd64()),
            Some(v("1.0.2"))
        );
        assert_eq!(index.latest_for_platform("p", &arch), Some(v("1.0.4")));
        assert_eq!(index.get("p").unwrap().latest, "1.0.4");
    }

    #[test]
    fn test_latest_for_platform_absent_cases() {
        let mut index = ReleaseIndex::new();
        assert_eq!(index.latest_for_platform("ghost", &linux_amd64()), None);

        index.create_package("p", &v("1.0.0"), &linux_amd64());
        let riscv = PlatformKey::new("linux", "riscv64");
        assert_eq!(index.latest_for_platform("p", &riscv), None);
    }

    #[test]
    fn test_edit_target() {
        let mut index = ReleaseIndex::new();
        index.add_version("p", &v("1.0.0"), &linux_amd64()).unwrap();

        assert!(index.edit_target(
            "p",
            &v("1.0.0"),
            &linux_amd64(),
            TargetField::Sha256,
            "deadbeef",
        ));
        assert!(index.edit_target(
            "p",
            &v("1.0.0"),
            &linux_amd64(),
            TargetField::Signature,
            "p_v1.0.0_linux_amd64.sig",
        ));

        let target = &index.get("p").unwrap().versions["1.0.0"].targets["linux_amd64"];
        assert_eq!(target.sha256, "deadbeef");
        assert_eq!(target.signature, "p_v1.0.0_linux_amd64.sig");

        // Overwriting an already-set field is allowed
        assert!(index.edit_target(
            "p",
            &v("1.0.0"),
            &linux_amd64(),
            TargetField::Sha256,
            "cafebabe",
        ));
        assert_eq!(
            index.get("p").unwrap().versions["1.0.0"].targets["linux_amd64"].sha256,
            "cafebabe"
        );
    }

    #[test]
    fn test_edit_target_missing_entities() {
        let mut index = ReleaseIndex::new();
        index.add_version("p", &v("1.0.0"), &linux_amd64()).unwrap();
        let before = index.clone();

        assert!(!index.edit_target("ghost", &v("1.0.0"), &linux_amd64(), TargetField::Url, "x"));
        assert!(!index.edit_target("p", &v("9.9.9"), &linux_amd64(), TargetField::Url, "x"));
        assert!(!index.edit_target(
            "p",
            &v("1.0.0"),
            &PlatformKey::new("macos", "arm64"),
            TargetField::Url,
            "x",
        ));
        assert_eq!(index, before);
    }

    #[test]
    fn test_target_field_parse() {
        assert_eq!("url".parse::<TargetField>().unwrap(), TargetField::Url);
        assert_eq!(
            "signature".parse::<TargetField>().unwrap(),
            TargetField::Signature
        );
        assert_eq!("sha256".parse::<TargetField>().unwrap(), TargetField::Sha256);
        assert!("md5".parse::<TargetField>().is_err());
    }

    #[test]
    fn test_artifact_descriptor() {
        let descriptor = ArtifactDescriptor::new(
            "Acme-Agent",
            &v("1.2.3"),
            &PlatformKey::new("Ubuntu", "AMD64"),
            BTreeMap::from([("libfoo".to_string(), "^2.0".to_string())]),
        );

        assert_eq!(descriptor.file_stem(false), "acme-agent_v1.2.3_ubuntu_amd64");
        assert_eq!(
            descriptor.file_stem(true),
            "acme-agent_v1.2.3_ubuntu_amd64.sig"
        );

        let json = serde_json::to_string_pretty(&descriptor).unwrap();
        assert!(json.contains("\"name\": \"Acme-Agent\""));
        assert!(json.contains("\"version\": \"1.2.3\""));
        assert!(json.contains("\"libfoo\": \"^2.0\""));
    }

    #[test]
    fn test_index_serialization_shape() {
        let mut index = ReleaseIndex::new();
        index.create_package("p", &v("1.0.0"), &linux_amd64());

        let json = serde_json::to_string_pretty(&index).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.contains("\"latest\": \"1.0.0\""));
        assert!(json.contains("\"linux_amd64\""));

        let parsed: ReleaseIndex = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, index);

        // Empty index is the empty object
        assert_eq!(serde_json::to_string(&ReleaseIndex::new()).unwrap(), "{}");
    }

    #[test]
    fn test_index_deserializes_entry_without_sha256() {
        // Documents written before the digest field existed
        let json = r#"{
            "p": {
                "latest": "1.0.0",
                "versions": {
                    "1.0.0": { "targets": {
                        "linux_amd64": { "url": "https://example.com/package", "signature": "" }
                    }}
                }
            }
        }"#;

        let index: ReleaseIndex = serde_json::from_str(json).unwrap();
        let target = &index.get("p").unwrap().versions["1.0.0"].targets["linux_amd64"];
        assert_eq!(target.sha256, "");
    }
}
