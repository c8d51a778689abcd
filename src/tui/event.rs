//! Event handling for the TUI.

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::error::BreatheError;

/// How long to wait for input before redrawing.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Action to take after handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Quit the application.
    Quit,
    /// Start or pause the cycle.
    ToggleRunning,
    /// Flip the sound flag.
    ToggleSound,
    /// Select the next exercise.
    Next,
    /// Select the previous exercise.
    Previous,
    /// Show key bindings.
    Help,
}

/// Poll terminal events.
///
/// Returns an action to take, or None if no action is needed.
///
/// # Errors
///
/// Returns an error if event polling fails.
pub fn handle_events() -> Result<Option<Action>, BreatheError> {
    if event::poll(POLL_INTERVAL)
        .map_err(|e| BreatheError::Terminal(format!("Event poll failed: {e}")))?
    {
        if let Event::Key(key) = event::read()
            .map_err(|e| BreatheError::Terminal(format!("Event read failed: {e}")))?
        {
            return Ok(map_key(key));
        }
    }

    Ok(None)
}

/// Map a key press to an action.
pub fn map_key(key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    // Handle Ctrl+C
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char(' ') | KeyCode::Enter => Some(Action::ToggleRunning),
        KeyCode::Char('s') => Some(Action::ToggleSound),
        KeyCode::Char('j') | KeyCode::Down => Some(Action::Next),
        KeyCode::Char('k') | KeyCode::Up => Some(Action::Previous),
        KeyCode::Char('?') => Some(Action::Help),
        _ => None,
    }
}
