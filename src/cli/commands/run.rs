//! `breathe run`: drive an exercise in real time on a plain terminal.
//!
//! The loop sleeps until the engine's next deadline, then advances the
//! engine to the wall-clock time. When both stdin and stdout are terminals
//! the wait doubles as a key poll (q/Esc/Ctrl-C stop, s toggles sound).

use std::io::{self, IsTerminal, Write};
use std::time::{Duration, Instant};

use colored::Colorize;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;

use super::catalog;
use crate::cli::args::{OutputFormat, RunArgs};
use crate::config::Config;
use crate::core::{
    AudioSync, BreathCycleEngine, CycleEvent, CycleObserver, LoggingPlayer, PhaseDefinition,
};
use crate::error::BreatheError;
use crate::features::exercises::{exercise_from_pattern, Exercise};
use crate::features::practice::{PracticeSession, PracticeStorage, SessionState};
use crate::output::{format_duration_mmss, format_duration_short, render_progress_bar, to_json};

const BAR_WIDTH: usize = 24;

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the exercise cannot be resolved or is invalid, the
/// terminal cannot be written, or the session cannot be recorded.
pub fn run(args: &RunArgs, config: &Config, format: OutputFormat) -> Result<String, BreatheError> {
    let exercise = resolve_exercise(args, config)?;
    let sequence = exercise.sequence()?;
    let target = args.cycles.unwrap_or(config.practice.default_cycles).max(1);
    let sound = config.practice.sound_enabled && !args.mute;

    tracing::info!(exercise = %exercise.slug, target, sound, "starting run");

    let stdout = io::stdout();
    let observer = TerminalObserver::new(stdout.lock(), format, &sequence.first().key, target);
    let mut engine = BreathCycleEngine::new(sequence, sound, observer);
    let mut audio = AudioSync::new(LoggingPlayer::new(exercise.ambient_track.clone()));
    let mut session = PracticeSession::begin(&exercise.slug, Some(target));

    let keys = if format == OutputFormat::Pretty
        && io::stdin().is_terminal()
        && io::stdout().is_terminal()
    {
        Some(RawMode::enable()?)
    } else {
        None
    };

    engine.observer_mut().banner(&exercise, target, keys.is_some());

    let origin = Instant::now();
    engine.start();
    audio.sync(engine.is_running(), engine.sound_enabled());

    while engine.cycles_completed() < target {
        let Some(deadline) = engine.next_deadline() else {
            break;
        };
        let wait = deadline.saturating_sub(origin.elapsed());

        if keys.is_some() {
            match poll_key(wait)? {
                Some(RunKey::Quit) => break,
                Some(RunKey::ToggleSound) => {
                    engine.toggle_sound();
                }
                None => {}
            }
        } else {
            std::thread::sleep(wait);
        }

        engine.advance_to(origin.elapsed());
        audio.sync(engine.is_running(), engine.sound_enabled());
    }

    let practiced = origin.elapsed();
    let cycles = engine.cycles_completed().min(target);
    engine.dispose();
    audio.shutdown();
    drop(keys);
    engine.observer_mut().finish()?;

    session.finish(cycles, i64::try_from(practiced.as_secs()).unwrap_or(i64::MAX));
    if config.practice.record_history {
        PracticeStorage::new()?.save(&mut session)?;
    }

    match format {
        OutputFormat::Json => to_json(&session),
        OutputFormat::Pretty => Ok(format_summary(&exercise, &session)),
    }
}

fn resolve_exercise(args: &RunArgs, config: &Config) -> Result<Exercise, BreatheError> {
    if let Some(pattern) = &args.pattern {
        return exercise_from_pattern(pattern);
    }

    let name = args
        .exercise
        .as_deref()
        .unwrap_or(&config.practice.default_exercise);
    catalog(config).find(name).cloned()
}

fn format_summary(exercise: &Exercise, session: &PracticeSession) -> String {
    let target = session.target_cycles.unwrap_or(session.cycles_completed);
    let line = format!(
        "{} {}/{} cycles of {} in {}",
        session.state,
        session.cycles_completed,
        target,
        exercise.name,
        format_duration_short(session.practiced())
    );
    match session.state {
        SessionState::Completed => line.green().to_string(),
        _ => line.yellow().to_string(),
    }
}

/// Keys understood while an exercise runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunKey {
    Quit,
    ToggleSound,
}

fn poll_key(wait: Duration) -> Result<Option<RunKey>, BreatheError> {
    if !event::poll(wait).map_err(|e| BreatheError::Terminal(format!("Event poll failed: {e}")))? {
        return Ok(None);
    }

    let Event::Key(key) =
        event::read().map_err(|e| BreatheError::Terminal(format!("Event read failed: {e}")))?
    else {
        return Ok(None);
    };
    if key.kind != KeyEventKind::Press {
        return Ok(None);
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Ok(Some(RunKey::Quit));
    }

    Ok(match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(RunKey::Quit),
        KeyCode::Char('s') => Some(RunKey::ToggleSound),
        _ => None,
    })
}

/// Raw terminal mode for the lifetime of the value.
struct RawMode;

impl RawMode {
    fn enable() -> Result<Self, BreatheError> {
        terminal::enable_raw_mode()
            .map_err(|e| BreatheError::Terminal(format!("Failed to enable raw mode: {e}")))?;
        Ok(Self)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        terminal::disable_raw_mode().ok();
    }
}

/// Prints engine notifications to a terminal.
///
/// Pretty output redraws a countdown line in place; JSON output writes one
/// [`CycleEvent`] per line. Notifications after the cycle target is reached
/// are swallowed, so the first phase of the next cycle never shows up.
/// Lines end in `\r\n` so they render correctly in raw mode.
pub struct TerminalObserver<W: Write> {
    out: W,
    format: OutputFormat,
    first_key: String,
    target: u64,
    cycles: u64,
    started: bool,
    finished: bool,
    phase_seconds: i64,
    error: Option<io::Error>,
}

impl<W: Write> TerminalObserver<W> {
    /// Create an observer that stops printing after `target` cycles.
    pub fn new(out: W, format: OutputFormat, first_key: &str, target: u64) -> Self {
        Self {
            out,
            format,
            first_key: first_key.to_string(),
            target,
            cycles: 0,
            started: false,
            finished: false,
            phase_seconds: 0,
            error: None,
        }
    }

    /// Print the exercise header (pretty output only).
    pub fn banner(&mut self, exercise: &Exercise, target: u64, interactive: bool) {
        if self.format != OutputFormat::Pretty {
            return;
        }
        let hint = if interactive {
            "q to stop, s to toggle sound"
        } else {
            "Ctrl-C to stop"
        };
        let text = format!(
            "{} {}  {}\r\n",
            exercise.name.bold(),
            format!("({}, {target} cycles)", exercise.pattern()).dimmed(),
            hint.dimmed()
        );
        self.write(&text);
    }

    /// Terminate the countdown line and surface any write error.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error hit while printing.
    pub fn finish(&mut self) -> Result<(), BreatheError> {
        if self.format == OutputFormat::Pretty {
            self.write("\r\n");
        }
        match self.error.take() {
            Some(e) => Err(BreatheError::Io(e)),
            None => Ok(()),
        }
    }

    /// Whether the cycle target has been reached.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    fn write(&mut self, text: &str) {
        if self.error.is_some() {
            return;
        }
        let result = self
            .out
            .write_all(text.as_bytes())
            .and_then(|()| self.out.flush());
        if let Err(e) = result {
            self.error = Some(e);
        }
    }

    fn emit(&mut self, event: &CycleEvent) {
        match serde_json::to_string(event) {
            Ok(line) => self.write(&format!("{line}\n")),
            Err(e) => self.error = Some(io::Error::other(e)),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn draw_countdown(&mut self, remaining_seconds: i64) {
        let total = self.phase_seconds.max(1) as f64;
        let progress = 1.0 - remaining_seconds as f64 / total;
        let text = format!(
            "\r  {}  {}",
            format_duration_mmss(chrono::Duration::seconds(remaining_seconds)).yellow(),
            render_progress_bar(progress, BAR_WIDTH)
        );
        self.write(&text);
    }
}

impl<W: Write> CycleObserver for TerminalObserver<W> {
    fn on_phase_change(&mut self, phase: &PhaseDefinition) {
        if self.finished {
            return;
        }
        if self.started && phase.key == self.first_key {
            self.cycles += 1;
            if self.cycles >= self.target {
                self.finished = true;
                return;
            }
        }
        self.started = true;
        self.phase_seconds = phase.duration_seconds;

        match self.format {
            OutputFormat::Json => self.emit(&CycleEvent::PhaseChanged {
                key: phase.key.clone(),
                label: phase.label.clone(),
            }),
            OutputFormat::Pretty => {
                let header = format!(
                    "\r\n{} {}\r\n",
                    format!("[{}/{}]", self.cycles + 1, self.target).dimmed(),
                    phase.label.bold().cyan()
                );
                self.write(&header);
                self.draw_countdown(phase.duration_seconds);
            }
        }
    }

    fn on_tick(&mut self, remaining_seconds: i64) {
        if self.finished {
            return;
        }
        match self.format {
            OutputFormat::Json => self.emit(&CycleEvent::Tick { remaining_seconds }),
            OutputFormat::Pretty => self.draw_countdown(remaining_seconds),
        }
    }
}
