//! Session-scoped storage port
//!
//! Holds the authenticated profile and the in-progress score/level so a
//! reload within the same browser session resumes instead of restarting.
//! `MemoryStore` serves tests and the native demo; the browser uses
//! `platform::web::SessionStorageStore`.

use crate::sim::{PlayerProfile, SessionSnapshot};

pub trait SessionStore {
    /// Profile left behind by the login flow, if any
    fn load_profile(&self) -> Option<PlayerProfile>;

    fn store_profile(&mut self, profile: &PlayerProfile);

    /// Progress saved by an earlier page in this session
    fn load_progress(&self) -> Option<SessionSnapshot>;

    fn save_progress(&mut self, snapshot: &SessionSnapshot);
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub profile: Option<PlayerProfile>,
    pub progress: Option<SessionSnapshot>,
    /// Number of progress writes, for observing mirroring
    pub progress_writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store already holding a logged-in player
    pub fn with_profile(profile: PlayerProfile) -> Self {
        Self {
            profile: Some(profile),
            ..Self::default()
        }
    }
}

impl SessionStore for MemoryStore {
    fn load_profile(&self) -> Option<PlayerProfile> {
        self.profile.clone()
    }

    fn store_profile(&mut self, profile: &PlayerProfile) {
        self.profile = Some(profile.clone());
    }

    fn load_progress(&self) -> Option<SessionSnapshot> {
        self.progress
    }

    fn save_progress(&mut self, snapshot: &SessionSnapshot) {
        self.progress = Some(*snapshot);
        self.progress_writes += 1;
    }
}
