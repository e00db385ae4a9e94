//! # tasklist - single-screen terminal task list
//!
//! Add, edit and delete tasks. Each task has a title and may carry an image
//! picked from a media directory on this machine.
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch with images from ~/Pictures
//! tasklist
//!
//! # Browse a different directory and log to a file
//! tasklist --media-dir ~/Downloads --log-file /tmp/tasklist.log
//!
//! # Shell completions
//! tasklist completions zsh > ~/.zfunc/_tasklist
//! ```
//!
//! ## Screen
//!
//! - **New task form** at the top: type a title, `Ctrl+P` attaches an image,
//!   `Enter` adds the task. Empty titles are rejected.
//! - **Task list** below: `Tab` moves focus there, `e` edits the selected
//!   task in a dialog, `d` deletes it immediately.
//! - **Edit dialog**: `Enter` saves, `Esc` discards.
//!
//! On startup the app asks once for read access to the media directory. A
//! refusal shows a short "Permission denied" notice and nothing else changes.
//!
//! Tasks live only in memory. Nothing is written to disk, and the list is
//! gone when the program exits.

use std::io;

use clap::{CommandFactory, Parser};

pub mod cli;
pub mod error;
pub mod logging;
pub mod platform;
pub mod store;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod picker;
    pub mod run;
    pub mod task_form;
    pub mod task_list;
    pub mod toast;
    pub mod utils;
}

use cli::{Cli, Commands, Config};
use error::AppError;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    if let Some(Commands::Completions { shell }) = &cli.command {
        clap_complete::generate(*shell, &mut Cli::command(), "tasklist", &mut io::stdout());
        return Ok(());
    }

    logging::init_logging(cli.log_file.as_deref())?;
    let config = Config::from_cli(&cli);
    tui::run::run_tui(&config)?;
    Ok(())
}
