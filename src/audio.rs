//! Sound events for an abstract audio sink
//!
//! The core fires events and never waits for playback; the platform layer
//! supplies the actual sink implementation.

/// Sound event types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sound {
    /// Player fired a bullet
    PlayerShoot,
    /// Enemy fired a bullet/bolt/missile
    EnemyShoot,
    /// Scorpio flame spray tick
    FlameSpray,
    /// Player took damage
    PlayerHit,
    /// Enemy took damage
    EnemyHit,
    /// Enemy destroyed
    EnemyDied,
    /// Player destroyed
    PlayerDied,
    /// Bullet bounced off a wall
    BulletBounce,
    /// Bullet expired
    BulletDied,
    /// Player reached the exit
    ExitReached,
    /// Last map cleared
    Victory,
    /// Game over
    GameOver,
    /// Pause toggled
    Pause,
    /// Menu/attract confirm
    Click,
}

/// Fire-and-forget audio sink
pub trait AudioSink {
    fn play(&mut self, sound: Sound);
}

/// Sink that discards every event (headless runs, tests by default)
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _sound: Sound) {}
}

/// Sink that records events in order (tests)
#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub events: Vec<Sound>,
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, sound: Sound) {
        self.events.push(sound);
    }
}
