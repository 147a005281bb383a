//! Latest command implementation

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::commands::load_index;
use crate::config;
use crate::error::hints;
use crate::index::PlatformKey;
use crate::utils::terminal::print_error;

/// Print the most recent version recorded for a platform
#[derive(Args, Debug)]
pub struct LatestCommand {
    /// Name of the package to query
    pub name: String,

    /// Builder platform to query, as <os>_<arch>
    #[arg(short = 'b', long, env = config::ENV_BUILDER, default_value = config::DEFAULT_BUILDER)]
    pub builder: String,

    /// Path to the release index JSON file
    #[arg(long, env = config::ENV_INDEX_FILE, default_value = config::DEFAULT_INDEX_FILE)]
    pub index_file: PathBuf,
}

impl LatestCommand {
    /// Execute the latest command
    pub fn execute(self, _verbose: bool) -> Result<()> {
        let platform =
            PlatformKey::parse(&self.builder).with_context(|| hints::builder_format())?;
        let index = load_index(&self.index_file)?;

        match index.latest_for_platform(&self.name, &platform) {
            Some(version) => {
                println!("{}", version);
                Ok(())
            }
            None => {
                print_error(&format!(
                    "no release of '{}' recorded for {}",
                    self.name, platform
                ));
                std::process::exit(1);
            }
        }
    }
}
