//! Root CLI structure for gtacam-rs

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gtacam-rs")]
#[command(about = "Command-line tools for GTA San Andreas cutscene camera files", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Cutscene camera .dat operations
    Dat {
        #[command(subcommand)]
        command: crate::commands::dat::DatCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
