//! High score submission
//!
//! The scoring service owns the authoritative high score. A submission
//! sends the session's final score; the value in the reply (not the one
//! sent) becomes the player's high score.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// Request to raise a player's high score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreSubmission {
    pub player_id: String,
    pub score: u32,
}

impl ScoreSubmission {
    /// JSON body of the update request
    pub fn body(&self) -> SubmitBody {
        SubmitBody {
            highscore: self.score,
        }
    }
}

/// Wire body for `PUT /api/update-score/{playerId}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitBody {
    pub highscore: u32,
}

/// Server-confirmed high score. Extra reply fields are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreAccepted {
    pub highscore: u32,
}

impl ScoreAccepted {
    /// Parse a reply body
    pub fn from_json(json: &str) -> Result<Self, ServiceError> {
        serde_json::from_str(json).map_err(|e| ServiceError::Decode(e.to_string()))
    }
}

/// Blocking submission contract
pub trait ScoreService {
    fn submit(&mut self, submission: &ScoreSubmission) -> Result<ScoreAccepted, ServiceError>;
}

/// In-process scoring service. Keeps the larger of the stored and
/// submitted score, like the hosted service does.
#[derive(Debug, Clone, Default)]
pub struct LocalScoreService {
    scores: HashMap<String, u32>,
    /// Submissions received, in order
    pub received: Vec<ScoreSubmission>,
}

impl LocalScoreService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a stored high score for a player
    pub fn with_score(mut self, player_id: &str, score: u32) -> Self {
        self.scores.insert(player_id.to_string(), score);
        self
    }

    pub fn high_score(&self, player_id: &str) -> Option<u32> {
        self.scores.get(player_id).copied()
    }
}

impl ScoreService for LocalScoreService {
    fn submit(&mut self, submission: &ScoreSubmission) -> Result<ScoreAccepted, ServiceError> {
        self.received.push(submission.clone());
        let stored = self.scores.entry(submission.player_id.clone()).or_insert(0);
        *stored = (*stored).max(submission.score);
        log::info!(
            "High score for {} is now {}",
            submission.player_id,
            *stored
        );
        Ok(ScoreAccepted { highscore: *stored })
    }
}
