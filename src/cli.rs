use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "menugit")]
#[command(about = "Menu-driven git porcelain")]
#[command(version)]
pub struct Cli {
    /// Run as if started in this directory
    #[arg(short = 'C', long, default_value = ".", global = true)]
    pub path: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the fetch menu
    Fetch,
    /// Open the push menu
    Push,
    /// Open the commit menu
    Commit {
        /// Do not show staged changes while composing the message
        #[arg(long)]
        no_preview: bool,
        /// Exit with an error when git fails instead of only reporting it
        #[arg(long)]
        propagate_errors: bool,
    },
    /// Compose a commit message (invoked by git as its editor)
    Edit {
        /// Block until the message is written
        #[arg(long)]
        wait: bool,
        /// Message file written by git
        file: PathBuf,
    },
    /// Print the repository state menus are built from
    State {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}
