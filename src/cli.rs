use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "autoupdate",
    about = "Dependency auto-update client - fetch update sets and apply them to your dependency files",
    version
)]
pub struct Cli {
    /// Path to the project directory (defaults to current directory)
    #[arg(short, long, default_value = ".", global = true)]
    pub path: String,

    /// Configuration file (defaults to .gemnasium.yml in the project directory)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch an update set and show the proposed changes
    Fetch {
        /// Update set identifier assigned by the update service
        #[arg(value_name = "ID")]
        id: String,

        /// Print the update set as JSON
        #[arg(long)]
        raw: bool,
    },

    /// Fetch an update set and apply it to the project's dependency files
    Apply {
        /// Update set identifier assigned by the update service
        #[arg(value_name = "ID")]
        id: String,

        /// Restore the original files after reporting the changes
        #[arg(long)]
        dry_run: bool,

        /// Print the report as JSON
        #[arg(long)]
        raw: bool,

        /// Command to run after applying; original files are restored if it fails
        #[arg(long, value_name = "CMD")]
        test_command: Option<String>,
    },
}
