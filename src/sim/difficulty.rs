//! Difficulty levels and their spawn intervals

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::SPAWN_INTERVALS_MS;

/// Difficulty tier, always within `Level::MIN..=Level::MAX`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct Level(u8);

/// First level at which a hazard is placed alongside the target
pub const HAZARD_LEVEL: Level = Level(3);

impl Level {
    pub const MIN: Level = Level(1);
    pub const MAX: Level = Level(4);
    /// Level a fresh game starts on
    pub const BASE: Level = Level::MIN;

    /// Clamp any raw level number onto the table
    pub fn clamped(raw: i64) -> Self {
        Level(raw.clamp(Self::MIN.0 as i64, Self::MAX.0 as i64) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Spawn interval for this level
    pub fn interval(self) -> Duration {
        Duration::from_millis(SPAWN_INTERVALS_MS[(self.0 - 1) as usize])
    }

    pub fn has_hazard(self) -> bool {
        self >= HAZARD_LEVEL
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::BASE
    }
}

impl From<i64> for Level {
    fn from(raw: i64) -> Self {
        Self::clamped(raw)
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Spawn interval for a raw level number. Levels off the table use the
/// nearest defined level.
pub fn interval_for(level: i64) -> Duration {
    Level::clamped(level).interval()
}
