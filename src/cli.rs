use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Single-screen task list with image attachments.
/// Tasks live in memory only and are gone when the program exits.
#[derive(Parser)]
#[command(name = "tasklist", version, about = "Terminal task list with image attachments")]
pub struct Cli {
    /// Directory the image picker browses.
    #[arg(long, env = "TASKLIST_MEDIA_DIR", global = true)]
    pub media_dir: Option<PathBuf>,

    /// Platform version used to choose the media permission.
    #[arg(long, env = "TASKLIST_PLATFORM_VERSION", default_value_t = 34, global = true)]
    pub platform_version: u32,

    /// How many directory levels the image picker descends.
    #[arg(long, default_value_t = 4, global = true)]
    pub max_depth: usize,

    /// Write logs to this file. Filter with TASKLIST_LOG.
    #[arg(long, env = "TASKLIST_LOG_FILE", global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the task list (default)
    Ui,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runtime settings resolved from the command line and environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub media_dir: PathBuf,
    pub platform_version: u32,
    pub max_depth: usize,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Self {
        let media_dir = cli.media_dir.clone().unwrap_or_else(default_media_dir);
        Self {
            media_dir,
            platform_version: cli.platform_version,
            max_depth: cli.max_depth.max(1),
        }
    }
}

/// `$HOME/Pictures`, or `./Pictures` when HOME is unset.
pub fn default_media_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join("Pictures")
}
