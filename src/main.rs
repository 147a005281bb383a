//! relstage CLI - release staging for built software packages
//!
//! Maintains a single JSON release index (package → latest + versions →
//! platform targets) and emits a detached metadata document per staged
//! artifact.
//!
//! ## Architecture
//!
//! ```text
//! CLI commands → index model (version ordering) → atomic JSON store
//! ```

mod cli;
mod commands;
mod config;
mod error;
mod index;
mod utils;
mod version;

use anyhow::Result;
use clap::Parser;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.execute()
}
