//! Stage command implementation
//!
//! The central operation: resolve the next version for a (package, platform)
//! pair, merge it into the release index, persist the index atomically, and
//! write the detached artifact metadata document.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::Args;
use console::style;

use crate::commands::load_index;
use crate::config;
use crate::error::hints;
use crate::index::{store, AddOutcome, ArtifactDescriptor, PlatformKey};
use crate::utils::paths::ensure_dir;
use crate::utils::terminal::{print_success, print_warning};
use crate::version::{UpdateKind, Version};

/// Stage a build: bump the version and record it in the index
#[derive(Args, Debug)]
pub struct StageCommand {
    /// Name of the package being staged
    pub name: String,

    /// Version update to apply: major, minor, or patch
    pub kind: String,

    /// Builder platform the artifact was produced on, as <os>_<arch>
    #[arg(short = 'b', long, env = config::ENV_BUILDER, default_value = config::DEFAULT_BUILDER)]
    pub builder: String,

    /// Path to the release index JSON file
    #[arg(long, env = config::ENV_INDEX_FILE, default_value = config::DEFAULT_INDEX_FILE)]
    pub index_file: PathBuf,

    /// Output directory for artifact metadata documents
    #[arg(long, env = config::ENV_OUT_DIR, default_value = config::DEFAULT_OUT_DIR)]
    pub out_dir: PathBuf,

    /// Record a dependency as NAME=CONSTRAINT (repeatable)
    #[arg(long = "dep", value_name = "NAME=CONSTRAINT")]
    pub deps: Vec<String>,
}

impl StageCommand {
    /// Execute the stage command
    pub fn execute(self, verbose: bool) -> Result<()> {
        let platform =
            PlatformKey::parse(&self.builder).with_context(|| hints::builder_format())?;
        let kind = UpdateKind::from_str(&self.kind)?;
        let dependencies = parse_deps(&self.deps)?;

        let mut index = load_index(&self.index_file)?;

        // A first release is always 1.0.0; the update kind applies from the
        // second release on. The bump base is the platform-scoped latest,
        // so a package's first build on a new platform also starts at 1.0.0.
        let version = if index.contains(&self.name) {
            match index.latest_for_platform(&self.name, &platform) {
                Some(current) => current.bump(kind),
                None => Version::new(1, 0, 0),
            }
        } else {
            Version::new(1, 0, 0)
        };

        let outcome = index.add_version(&self.name, &version, &platform)?;
        if outcome == AddOutcome::Conflict {
            print_warning(&format!(
                "{} {} already has a target for {}; keeping the existing entry",
                self.name, version, platform
            ));
        }

        store::save(&self.index_file, &index)?;

        let descriptor = ArtifactDescriptor::new(&self.name, &version, &platform, dependencies);
        let stem = descriptor.file_stem(false);
        ensure_dir(&self.out_dir)?;
        let out_path = self.out_dir.join(format!("{}_md.json", stem));
        store::save_json(&out_path, &descriptor)?;

        if verbose {
            println!("{} {}", style("Outcome:").dim(), outcome);
            println!("{} {}", style("Index:").dim(), self.index_file.display());
            println!("{} {}", style("Metadata:").dim(), out_path.display());
        }

        print_success(&format!(
            "staged {} {} for {}",
            self.name, version, platform
        ));
        println!("{}", stem);
        Ok(())
    }
}

/// Parse repeated NAME=CONSTRAINT dependency flags, kept verbatim
fn parse_deps(specs: &[String]) -> Result<BTreeMap<String, String>> {
    let mut deps = BTreeMap::new();
    for spec in specs {
        match spec.split_once('=') {
            Some((name, constraint)) if !name.is_empty() => {
                deps.insert(name.to_string(), constraint.to_string());
            }
            _ => bail!("Invalid dependency '{}': expected NAME=CONSTRAINT", spec),
        }
    }
    Ok(deps)
}
