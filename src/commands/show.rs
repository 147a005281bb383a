//! Show command implementation

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use console::style;

use crate::commands::load_index;
use crate::config;
use crate::index::PackageEntry;
use crate::utils::terminal::{print_error, print_info};
use crate::version::Version;

/// Show recorded packages, versions, and targets
#[derive(Args, Debug)]
pub struct ShowCommand {
    /// Package to show (defaults to the whole index)
    pub name: Option<String>,

    /// Print raw JSON instead of the formatted listing
    #[arg(long)]
    pub json: bool,

    /// Path to the release index JSON file
    #[arg(long, env = config::ENV_INDEX_FILE, default_value = config::DEFAULT_INDEX_FILE)]
    pub index_file: PathBuf,
}

impl ShowCommand {
    /// Execute the show command
    pub fn execute(self, _verbose: bool) -> Result<()> {
        let index = load_index(&self.index_file)?;

        if let Some(name) = &self.name {
            let Some(entry) = index.get(name) else {
                print_error(&format!("package '{}' is not in the index", name));
                std::process::exit(1);
            };
            if self.json {
                println!("{}", serde_json::to_string_pretty(entry)?);
            } else {
                print_package(name, entry);
            }
            return Ok(());
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&index)?);
            return Ok(());
        }

        if index.is_empty() {
            print_info("the release index is empty");
            return Ok(());
        }

        for (name, entry) in index.packages() {
            print_package(name, entry);
        }
        Ok(())
    }
}

fn print_package(name: &str, entry: &PackageEntry) {
    println!(
        "{} (latest {})",
        style(name).bold(),
        style(&entry.latest).green()
    );

    // Version keys sort lexicographically in the map; order the listing by
    // actual version so 1.0.10 lands after 1.0.9.
    let mut versions: Vec<_> = entry
        .versions
        .iter()
        .filter_map(|(text, version_entry)| {
            Version::parse(text).ok().map(|v| (v, version_entry))
        })
        .collect();
    versions.sort_by_key(|(version, _)| *version);

    for (version, version_entry) in versions {
        let platforms: Vec<&str> = version_entry.targets.keys().map(String::as_str).collect();
        println!("  v{}: {}", version, platforms.join(", "));
    }
}
