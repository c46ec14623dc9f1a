//! Mole Rush - a timed grid arcade session engine
//!
//! Core modules:
//! - `sim`: Deterministic session core (grid, spawner, clock, scoring, controller)
//! - `scheduler`: Virtual-time repeating timers with cancel handles
//! - `persistence`: Profile and progress storage port
//! - `highscores`: High score submission contract
//! - `settings`: Data-driven session configuration
//! - `platform`: Browser bindings (wasm32 only)

pub mod error;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod scheduler;
pub mod settings;
pub mod sim;

pub use error::{Result, ServiceError, SessionError};
pub use highscores::{LocalScoreService, ScoreAccepted, ScoreService, ScoreSubmission};
pub use persistence::{MemoryStore, SessionStore};
pub use scheduler::{ManualScheduler, Scheduler, TimerHandle};
pub use settings::Settings;
pub use sim::{GameEvent, Level, SessionController, SessionStatus, StrikeOutcome};

/// Game configuration constants
pub mod consts {
    use std::time::Duration;

    /// Cells on the play grid (3x3)
    pub const GRID_CELLS: usize = 9;
    /// Length of one session in seconds
    pub const SESSION_SECONDS: u32 = 30;
    /// Period of the countdown clock
    pub const CLOCK_PERIOD: Duration = Duration::from_secs(1);

    /// Points for striking the target
    pub const HIT_POINTS: u32 = 20;
    /// Points lost for striking the hazard (score floors at zero)
    pub const HAZARD_PENALTY: u32 = 50;

    /// Minimum score for levels 2, 3 and 4
    pub const LEVEL_BREAKPOINTS: [u32; 3] = [200, 300, 400];
    /// Spawn interval per level (index 0 = level 1)
    pub const SPAWN_INTERVALS_MS: [u64; 4] = [1000, 800, 600, 400];
}
