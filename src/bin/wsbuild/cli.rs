//! CLI definitions using clap.

use std::path::PathBuf;

use clap::Parser;

/// wsbuild - build a workspace of C, C++ and D projects
#[derive(Parser)]
#[command(name = "wsbuild")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path of the workspace descriptor (workspace.ini)
    pub workspace: PathBuf,

    /// Build type: debug, release (optionally suffixed 32 or 64) or lint
    pub mode: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}
