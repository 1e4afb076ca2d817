use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Simple, file-backed task manager CLI.
/// Records live under ~/.taskflow or a directory passed via --data-dir.
#[derive(Parser)]
#[command(name = "tf", version, about = "Task and checklist management CLI")]
pub struct Cli {
    /// Directory holding the JSON records.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
