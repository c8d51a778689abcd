//! Keeps background audio in step with the engine.
//!
//! Audio plays only while the cycle is running and sound is enabled. The
//! presentation layer calls [`AudioSync::sync`] after every start, pause or
//! sound toggle, and [`AudioSync::shutdown`] when the screen goes away.

use tracing::{debug, info};

use super::traits::AudioPlayer;

/// Reconciles an [`AudioPlayer`] with the engine's running and sound flags.
#[derive(Debug)]
pub struct AudioSync<P> {
    player: P,
    playing: bool,
    looping_set: bool,
}

impl<P: AudioPlayer> AudioSync<P> {
    /// Wrap a player. Nothing is played until the first `sync`.
    pub const fn new(player: P) -> Self {
        Self {
            player,
            playing: false,
            looping_set: false,
        }
    }

    /// Play or pause so that audio is audible iff `running && sound_enabled`.
    pub fn sync(&mut self, running: bool, sound_enabled: bool) {
        let wanted = running && sound_enabled;
        if wanted == self.playing {
            return;
        }

        if wanted {
            if !self.looping_set {
                self.player.set_looping(true);
                self.looping_set = true;
            }
            self.player.play();
        } else {
            self.player.pause();
        }
        self.playing = wanted;
    }

    /// Stop playback for good.
    pub fn shutdown(&mut self) {
        self.player.stop();
        self.playing = false;
        self.looping_set = false;
    }

    /// Whether audio is currently playing.
    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    /// Borrow the wrapped player.
    pub const fn player(&self) -> &P {
        &self.player
    }
}

/// Player that records its state and logs instead of producing sound.
#[derive(Debug, Clone, Default)]
pub struct LoggingPlayer {
    track: Option<String>,
    playing: bool,
    looping: bool,
}

impl LoggingPlayer {
    /// Create a player for the named ambient track.
    #[must_use]
    pub fn new(track: Option<String>) -> Self {
        Self {
            track,
            playing: false,
            looping: false,
        }
    }

    /// Name of the ambient track, if any.
    #[must_use]
    pub fn track(&self) -> Option<&str> {
        self.track.as_deref()
    }

    /// Whether the player is playing.
    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether looping is enabled.
    #[must_use]
    pub const fn is_looping(&self) -> bool {
        self.looping
    }
}

impl AudioPlayer for LoggingPlayer {
    fn play(&mut self) {
        self.playing = true;
        info!(track = ?self.track, "ambient audio playing");
    }

    fn pause(&mut self) {
        self.playing = false;
        info!(track = ?self.track, "ambient audio paused");
    }

    fn stop(&mut self) {
        self.playing = false;
        debug!(track = ?self.track, "ambient audio stopped");
    }

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }
}
