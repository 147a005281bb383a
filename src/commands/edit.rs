//! Edit command implementation
//!
//! Fills in target metadata after the fact: the upload step sets `url` and
//! `sha256`, the signing step sets `signature`. Only existing targets can
//! be edited; recording a build is the stage command's job.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Args;

use crate::commands::load_index;
use crate::config;
use crate::error::hints;
use crate::index::{store, PlatformKey, TargetField};
use crate::utils::terminal::{print_error, print_success};
use crate::version::Version;

/// Update a field of a recorded target after upload or signing
#[derive(Args, Debug)]
#[command(disable_version_flag = true)]
pub struct EditCommand {
    /// Name of the package
    pub name: String,

    /// Version whose target is being edited
    pub version: String,

    /// Field to set: url, signature, or sha256
    pub field: String,

    /// New field value
    pub value: String,

    /// Builder platform of the target, as <os>_<arch>
    #[arg(short = 'b', long, env = config::ENV_BUILDER, default_value = config::DEFAULT_BUILDER)]
    pub builder: String,

    /// Path to the release index JSON file
    #[arg(long, env = config::ENV_INDEX_FILE, default_value = config::DEFAULT_INDEX_FILE)]
    pub index_file: PathBuf,
}

impl EditCommand {
    /// Execute the edit command
    pub fn execute(self, _verbose: bool) -> Result<()> {
        let platform =
            PlatformKey::parse(&self.builder).with_context(|| hints::builder_format())?;
        let version = Version::parse(&self.version)?;
        let field = TargetField::from_str(&self.field)?;

        let mut index = load_index(&self.index_file)?;
        if !index.edit_target(&self.name, &version, &platform, field, &self.value) {
            print_error(&format!(
                "no target {} recorded for {} {}",
                platform, self.name, version
            ));
            std::process::exit(1);
        }

        store::save(&self.index_file, &index)?;
        print_success(&format!(
            "set {} for {} {} ({})",
            self.field, self.name, version, platform
        ));
        Ok(())
    }
}
