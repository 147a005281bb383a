//! CLI argument parsing using clap derive macros

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{
    edit::EditCommand, latest::LatestCommand, show::ShowCommand, stage::StageCommand,
};

/// relstage - Release staging CLI
///
/// Maintains a multi-platform release index for built software packages and
/// emits per-artifact metadata documents.
#[derive(Parser, Debug)]
#[command(name = "relstage")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stage a build: bump the version and record it in the index
    Stage(StageCommand),

    /// Print the most recent version recorded for a platform
    Latest(LatestCommand),

    /// Show recorded packages, versions, and targets
    Show(ShowCommand),

    /// Update a field of a recorded target after upload or signing
    Edit(EditCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        // Set up terminal colors
        if self.no_color {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        }

        // Execute the subcommand
        match self.command {
            Commands::Stage(cmd) => cmd.execute(self.verbose),
            Commands::Latest(cmd) => cmd.execute(self.verbose),
            Commands::Show(cmd) => cmd.execute(self.verbose),
            Commands::Edit(cmd) => cmd.execute(self.verbose),
        }
    }
}
