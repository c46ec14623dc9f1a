//! Session state and core value types
//!
//! Everything here is plain data; only the controller mutates a `Session`.

use serde::{Deserialize, Serialize};

use super::difficulty::Level;
use super::grid::GridState;

/// Whether the countdown is still running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Running,
    /// Countdown expired (terminal until restart)
    Over,
}

/// One timed play-through
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub seconds_remaining: u32,
    pub score: u32,
    pub level: Level,
    pub status: SessionStatus,
}

impl Session {
    pub fn new(seconds: u32, score: u32, level: Level) -> Self {
        Self {
            seconds_remaining: seconds,
            score,
            level,
            status: SessionStatus::Running,
        }
    }

    pub fn is_over(&self) -> bool {
        self.status == SessionStatus::Over
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            score: self.score,
            level: self.level,
        }
    }
}

/// Progress mirrored to storage so a reload can resume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub score: u32,
    pub level: Level,
}

/// Authenticated player, owned by the account service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub id: String,
    pub name: String,
    #[serde(rename = "highscore", default)]
    pub high_score: u32,
}

/// Result of striking a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeOutcome {
    /// Target struck, points awarded
    Hit,
    /// Hazard struck, points deducted
    HazardHit,
    /// Empty or stale cell, or the session is over
    Ignored,
}

/// Notifications for whoever presents the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    GridChanged(GridState),
    ScoreChanged { score: u32 },
    LevelChanged { level: Level },
    ClockTicked { seconds_remaining: u32 },
    SessionOver { final_score: u32 },
    /// Score service confirmed a new high score
    HighScoreConfirmed { high_score: u32 },
    Restarted { level: Level, score: u32 },
}
