//! Deterministic session simulation
//!
//! All gameplay logic lives here. This module must stay deterministic:
//! - Virtual time only (see `scheduler`)
//! - Injected cell source only
//! - No rendering, storage or network dependencies

pub mod clock;
pub mod controller;
pub mod difficulty;
pub mod grid;
pub mod score;
pub mod spawner;
pub mod state;

pub use clock::{ClockOutcome, SessionClock};
pub use controller::SessionController;
pub use difficulty::{HAZARD_LEVEL, Level, interval_for};
pub use grid::{Cell, GridState};
pub use score::{apply_hazard_hit, apply_hit, derive_level};
pub use spawner::{CellSource, Spawner, SpawnerState};
pub use state::{
    GameEvent, PlayerProfile, Session, SessionSnapshot, SessionStatus, StrikeOutcome,
};
