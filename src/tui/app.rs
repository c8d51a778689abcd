//! Application state for the TUI.

use std::time::{Duration, Instant};

use crate::core::{AudioSync, BreathCycleEngine, CycleEvent, EventLog, LoggingPlayer};
use crate::error::BreatheError;
use crate::features::exercises::{Exercise, ExerciseCatalog};
use crate::features::practice::{PracticeSession, PracticeStorage};

/// Application state.
///
/// Holds one engine for the selected exercise. Selecting another exercise
/// closes the current session and disposes the engine before a fresh one is
/// built. Engine time is measured from `origin`, the moment the current
/// engine was created.
pub struct App {
    /// Exercises with a valid phase sequence.
    pub exercises: Vec<Exercise>,
    /// Currently selected index.
    pub selected: usize,
    /// Status message to display.
    pub status: Option<String>,
    /// Label of the phase most recently entered.
    pub last_phase: Option<String>,
    engine: BreathCycleEngine<EventLog>,
    audio: AudioSync<LoggingPlayer>,
    origin: Instant,
    sound_enabled: bool,
    session: Option<(PracticeSession, Duration)>,
    storage: Option<PracticeStorage>,
}

impl App {
    /// Create a new app instance.
    ///
    /// Exercises whose phases fail validation are left out with a warning.
    /// `storage` of `None` disables history recording.
    ///
    /// # Errors
    ///
    /// Returns `BreatheError::NotFound` if `initial` names no valid exercise,
    /// or `BreatheError::InvalidInput` if no valid exercise is left.
    pub fn new(
        catalog: &ExerciseCatalog,
        initial: Option<&str>,
        sound_enabled: bool,
        storage: Option<PracticeStorage>,
    ) -> Result<Self, BreatheError> {
        let exercises: Vec<Exercise> = catalog
            .iter()
            .filter(|e| match e.sequence() {
                Ok(_) => true,
                Err(err) => {
                    tracing::warn!(exercise = %e.slug, error = %err, "skipping invalid exercise");
                    false
                }
            })
            .cloned()
            .collect();

        let selected = match initial {
            Some(name) => {
                let slug = &catalog.find(name)?.slug;
                exercises
                    .iter()
                    .position(|e| &e.slug == slug)
                    .ok_or_else(|| BreatheError::NotFound(format!("valid exercise '{name}'")))?
            }
            None => 0,
        };

        let exercise = exercises
            .get(selected)
            .ok_or_else(|| BreatheError::InvalidInput("no valid exercises".to_string()))?;
        let (engine, audio) = build_engine(exercise, sound_enabled)?;

        Ok(Self {
            exercises,
            selected,
            status: None,
            last_phase: None,
            engine,
            audio,
            origin: Instant::now(),
            sound_enabled,
            session: None,
            storage,
        })
    }

    /// The selected exercise.
    #[must_use]
    pub fn exercise(&self) -> &Exercise {
        &self.exercises[self.selected]
    }

    /// The engine driving the selected exercise.
    #[must_use]
    pub const fn engine(&self) -> &BreathCycleEngine<EventLog> {
        &self.engine
    }

    /// Whether background audio is playing.
    #[must_use]
    pub const fn audio_playing(&self) -> bool {
        self.audio.is_playing()
    }

    /// Advance the engine to the wall clock.
    pub fn tick(&mut self) {
        let elapsed = self.origin.elapsed();
        self.tick_to(elapsed);
    }

    /// Advance the engine to `elapsed` since the engine was created.
    pub fn tick_to(&mut self, elapsed: Duration) {
        self.engine.advance_to(elapsed);
        for event in self.engine.observer_mut().drain() {
            if let CycleEvent::PhaseChanged { label, .. } = event {
                self.last_phase = Some(label);
            }
        }
    }

    /// Start or pause the cycle.
    ///
    /// # Errors
    ///
    /// Returns an error if a finished session cannot be recorded.
    pub fn toggle_running(&mut self) -> Result<(), BreatheError> {
        if self.engine.is_running() {
            self.close_session()?;
            self.engine.pause();
            self.status = Some("Paused".to_string());
        } else {
            self.engine.start();
            self.session = Some((
                PracticeSession::begin(&self.exercise().slug, None),
                self.engine.now(),
            ));
            self.status = None;
            self.tick_to(self.engine.now());
        }
        self.audio
            .sync(self.engine.is_running(), self.engine.sound_enabled());
        Ok(())
    }

    /// Flip the sound flag.
    pub fn toggle_sound(&mut self) {
        self.sound_enabled = self.engine.toggle_sound();
        self.audio
            .sync(self.engine.is_running(), self.engine.sound_enabled());
        self.status = Some(if self.sound_enabled {
            "Sound on".to_string()
        } else {
            "Sound off".to_string()
        });
    }

    /// Move selection down.
    ///
    /// # Errors
    ///
    /// Returns an error if the running session cannot be recorded.
    pub fn select_next(&mut self) -> Result<(), BreatheError> {
        if self.selected + 1 < self.exercises.len() {
            self.select(self.selected + 1)?;
        }
        Ok(())
    }

    /// Move selection up.
    ///
    /// # Errors
    ///
    /// Returns an error if the running session cannot be recorded.
    pub fn select_previous(&mut self) -> Result<(), BreatheError> {
        if self.selected > 0 {
            self.select(self.selected - 1)?;
        }
        Ok(())
    }

    fn select(&mut self, index: usize) -> Result<(), BreatheError> {
        self.shutdown()?;
        self.selected = index;

        let (engine, audio) = build_engine(&self.exercises[index], self.sound_enabled)?;
        self.engine = engine;
        self.audio = audio;
        self.origin = Instant::now();
        self.last_phase = None;
        self.status = None;
        Ok(())
    }

    /// Close any open session, stop audio and dispose the engine.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be recorded.
    pub fn shutdown(&mut self) -> Result<(), BreatheError> {
        let recorded = self.close_session();
        self.engine.dispose();
        self.audio.shutdown();
        recorded
    }

    fn close_session(&mut self) -> Result<(), BreatheError> {
        let Some((mut session, started)) = self.session.take() else {
            return Ok(());
        };

        let practiced = self.engine.now().saturating_sub(started);
        session.finish(
            self.engine.cycles_completed(),
            i64::try_from(practiced.as_secs()).unwrap_or(i64::MAX),
        );
        tracing::info!(status = %session.format_status(), "practice session ended");

        if let Some(storage) = &self.storage {
            storage.save(&mut session)?;
        }
        Ok(())
    }
}

fn build_engine(
    exercise: &Exercise,
    sound_enabled: bool,
) -> Result<(BreathCycleEngine<EventLog>, AudioSync<LoggingPlayer>), BreatheError> {
    let engine = BreathCycleEngine::new(exercise.sequence()?, sound_enabled, EventLog::new());
    let audio = AudioSync::new(LoggingPlayer::new(exercise.ambient_track.clone()));
    Ok((engine, audio))
}
