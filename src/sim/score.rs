//! Score arithmetic and score-derived levels

use super::difficulty::Level;
use super::state::Session;
use crate::consts::{HAZARD_PENALTY, HIT_POINTS, LEVEL_BREAKPOINTS};

/// Award a target hit
pub fn apply_hit(session: &mut Session) {
    session.score = session.score.saturating_add(HIT_POINTS);
}

/// Deduct a hazard hit, never dropping below zero
pub fn apply_hazard_hit(session: &mut Session) {
    session.score = session.score.saturating_sub(HAZARD_PENALTY);
}

/// Level earned by a cumulative score
pub fn derive_level(score: u32) -> Level {
    let passed = LEVEL_BREAKPOINTS.iter().filter(|&&min| score >= min).count();
    Level::clamped(1 + passed as i64)
}
