//! UI rendering for the TUI.

use chrono::Duration;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::HELP;
use crate::output::format_duration_mmss;
use crate::tui::app::App;

/// Render the application UI.
pub fn render(frame: &mut Frame<'_>, app: &App) {
    // Exercise list on the left, session on the right, status bar below
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(0)])
        .split(rows[0]);

    render_list(frame, app, columns[0]);
    render_session(frame, app, columns[1]);
    render_status_bar(frame, app, rows[1]);
}

/// Render the exercise list.
fn render_list(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let items: Vec<ListItem<'_>> = app
        .exercises
        .iter()
        .enumerate()
        .map(|(i, exercise)| {
            let is_selected = i == app.selected;
            let spans = vec![
                Span::styled(
                    exercise.name.as_str(),
                    Style::default().add_modifier(if is_selected {
                        Modifier::BOLD
                    } else {
                        Modifier::empty()
                    }),
                ),
                Span::styled(
                    format!("  {}", exercise.pattern()),
                    Style::default().fg(Color::DarkGray),
                ),
            ];
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(" Exercises ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White)),
        )
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    state.select(Some(app.selected));

    frame.render_stateful_widget(list, area, &mut state);
}

/// Render the running exercise.
fn render_session(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let exercise = app.exercise();
    let engine = app.engine();
    let state = engine.state();

    let block = Block::default()
        .title(format!(" {} ", exercise.name))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Description
            Constraint::Length(2), // Phase
            Constraint::Length(2), // Countdown
            Constraint::Length(1), // Progress
            Constraint::Length(1),
            Constraint::Min(0), // Details
        ])
        .split(inner);

    let description = Paragraph::new(exercise.description.as_str())
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(description, chunks[0]);

    let phase_color = if state.running {
        Color::Green
    } else {
        Color::DarkGray
    };
    let phase = Paragraph::new(engine.current_phase().label.as_str())
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(phase_color)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(phase, chunks[1]);

    let countdown = Paragraph::new(format_duration_mmss(Duration::seconds(
        state.remaining_seconds,
    )))
    .alignment(Alignment::Center)
    .style(Style::default().fg(Color::Yellow));
    frame.render_widget(countdown, chunks[2]);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(engine.phase_progress().clamp(0.0, 1.0))
        .label("");
    frame.render_widget(gauge, chunks[3]);

    let running = if state.running { "running" } else { "paused" };
    let sound = if state.sound_enabled { "on" } else { "off" };
    let track = exercise.ambient_track.as_deref().unwrap_or("none");
    let details = vec![
        Line::from(vec![
            Span::styled("Status: ", Style::default().fg(Color::DarkGray)),
            Span::raw(running),
        ]),
        Line::from(vec![
            Span::styled("Cycles: ", Style::default().fg(Color::DarkGray)),
            Span::raw(state.cycles_completed.to_string()),
        ]),
        Line::from(vec![
            Span::styled("Sound:  ", Style::default().fg(Color::DarkGray)),
            Span::raw(format!("{sound} ({track})")),
        ]),
    ];
    frame.render_widget(Paragraph::new(details), chunks[5]);
}

/// Render the status bar.
fn render_status_bar(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let status_text = app.status.as_deref().unwrap_or(HELP);
    let status = Paragraph::new(status_text).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(status, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::exercises::ExerciseCatalog;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    #[test]
    fn test_render_idle() {
        let app = App::new(&ExerciseCatalog::builtin(), Some("relaxing"), true, None).unwrap();
        let screen = draw(&app);
        assert!(screen.contains("Exercises"));
        assert!(screen.contains("Relaxing Breath"));
        assert!(screen.contains("00:04"));
        assert!(screen.contains("paused"));
        assert!(screen.contains("space:start/pause"));
    }

    #[test]
    fn test_render_running() {
        let mut app = App::new(&ExerciseCatalog::builtin(), Some("relaxing"), false, None).unwrap();
        app.toggle_running().unwrap();
        app.tick_to(std::time::Duration::from_secs(6));
        let screen = draw(&app);
        assert!(screen.contains("Hold"));
        assert!(screen.contains("00:05"));
        assert!(screen.contains("running"));
        assert!(screen.contains("off (soft_rain.mp3)"));
    }
}
