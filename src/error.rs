use thiserror::Error;

/// Conditions that stop a session from starting
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("No authenticated player profile, log in to play")]
    Unauthenticated,
}

/// Failures while submitting a high score to the scoring service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Score service rejected the submission with status {status}")]
    Rejected { status: u16 },
    #[error("Malformed score service response: {0}")]
    Decode(String),
}

pub type Result<T> = core::result::Result<T, SessionError>;
