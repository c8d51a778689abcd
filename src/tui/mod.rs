//! Terminal User Interface (TUI) for breathe.
//!
//! An exercise list beside the running exercise: current phase, countdown
//! and progress. Built with ratatui and crossterm.

mod app;
mod event;
mod ui;

pub use app::App;

use std::io;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use crate::error::BreatheError;

const HELP: &str = "space:start/pause | s:sound | j/k:select | q:quit";

/// Run the TUI application.
///
/// The engine is disposed and audio stopped before the terminal is restored,
/// whether the loop ended normally or with an error.
///
/// # Errors
///
/// Returns an error if the TUI fails to initialize or run, or the last
/// session cannot be recorded.
pub fn run(mut app: App) -> Result<(), BreatheError> {
    enable_raw_mode()
        .map_err(|e| BreatheError::Terminal(format!("Failed to enable raw mode: {e}")))?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)
        .map_err(|e| BreatheError::Terminal(format!("Failed to setup terminal: {e}")))?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)
        .map_err(|e| BreatheError::Terminal(format!("Failed to create terminal: {e}")))?;

    let result = run_app(&mut terminal, &mut app);
    let shutdown = app.shutdown();

    // Restore terminal
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    result.and(shutdown)
}

/// Run the main application loop.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), BreatheError> {
    loop {
        app.tick();

        terminal
            .draw(|frame| ui::render(frame, app))
            .map_err(|e| BreatheError::Terminal(format!("Failed to draw: {e}")))?;

        if let Some(action) = event::handle_events()? {
            match action {
                event::Action::Quit => break,
                event::Action::ToggleRunning => app.toggle_running()?,
                event::Action::ToggleSound => app.toggle_sound(),
                event::Action::Next => app.select_next()?,
                event::Action::Previous => app.select_previous()?,
                event::Action::Help => app.status = Some(HELP.to_string()),
            }
        }
    }

    Ok(())
}
