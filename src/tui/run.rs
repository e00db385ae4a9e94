//! TUI entry point and terminal setup.

use std::io::{self, Write};

use crossterm::{
    cursor::Show,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::CrosstermBackend, Terminal};
use tracing::{info, warn};

use crate::cli::Config;
use crate::platform::{DirectoryLibrary, FsPermissionService};
use crate::tui::app::App;

/// Initialise the terminal, run the task list until the user quits, then
/// restore the terminal even if the event loop failed.
pub fn run_tui(config: &Config) -> io::Result<()> {
    let mut app = App::new(
        Box::new(FsPermissionService::new(&config.media_dir)),
        Box::new(DirectoryLibrary::new(&config.media_dir, config.max_depth)),
        config.platform_version,
    );
    info!(media_dir = %config.media_dir.display(), "starting task list");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e);
    }

    let result = Terminal::new(CrosstermBackend::new(stdout)).and_then(|mut terminal| {
        let result = app.run(&mut terminal);
        let restored = restore_terminal(terminal.backend_mut());
        result.and(restored)
    });
    if result.is_err() {
        // Terminal::new failed or the loop bailed; make sure raw mode is off.
        let _ = disable_raw_mode();
    }

    info!("task list closed");
    result
}

/// Undo raw mode, the alternate screen and the hidden cursor. Every step is
/// attempted; the first failure is returned.
fn restore_terminal<W: Write>(out: &mut W) -> io::Result<()> {
    let steps = [
        disable_raw_mode(),
        execute!(out, LeaveAlternateScreen),
        execute!(out, Show),
    ];
    let mut first_err = None;
    for step in steps {
        if let Err(e) = step {
            warn!(error = %e, "terminal restore step failed");
            first_err.get_or_insert(e);
        }
    }
    match first_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
