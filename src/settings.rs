//! Session settings
//!
//! Persisted in LocalStorage on the web; read from a JSON file named by
//! `MOLE_RUSH_SETTINGS` natively.

use serde::{Deserialize, Serialize};

use crate::consts::{GRID_CELLS, SESSION_SECONDS};

/// Smallest grid that still leaves room for a hazard next to the target
pub const MIN_GRID_CELLS: usize = 2;
pub const MAX_GRID_CELLS: usize = 64;

/// Session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Number of cells on the grid
    pub grid_cells: usize,
    /// Countdown length
    pub session_seconds: u32,
    /// Scoring service origin, without trailing slash
    pub api_base_url: String,
    /// Fixed RNG seed (None = seeded from the clock)
    pub seed: Option<u64>,
    /// Chance the native autoplayer strikes the target (0.0 - 1.0)
    pub autoplay_accuracy: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_cells: GRID_CELLS,
            session_seconds: SESSION_SECONDS,
            api_base_url: "http://127.0.0.1:5000".to_string(),
            seed: None,
            autoplay_accuracy: 0.8,
        }
    }
}

impl Settings {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "mole_rush_settings";

    /// Environment variable naming a settings file (native only)
    pub const PATH_ENV: &'static str = "MOLE_RUSH_SETTINGS";

    /// Parse settings JSON, missing fields take defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<Settings>(json).map(Settings::validated)
    }

    /// Clamp every field into its usable range
    pub fn validated(mut self) -> Self {
        self.grid_cells = self.grid_cells.clamp(MIN_GRID_CELLS, MAX_GRID_CELLS);
        self.session_seconds = self.session_seconds.max(1);
        self.autoplay_accuracy = if self.autoplay_accuracy.is_finite() {
            self.autoplay_accuracy.clamp(0.0, 1.0)
        } else {
            Settings::default().autoplay_accuracy
        };
        let trimmed = self.api_base_url.trim_end_matches('/').len();
        self.api_base_url.truncate(trimmed);
        self
    }

    /// Endpoint that updates `player_id`'s high score
    pub fn submit_url(&self, player_id: &str) -> String {
        format!("{}/api/update-score/{}", self.api_base_url, player_id)
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        use gloo::storage::{LocalStorage, Storage};

        match LocalStorage::get::<Settings>(Self::STORAGE_KEY) {
            Ok(settings) => {
                log::info!("Loaded settings from LocalStorage");
                settings.validated()
            }
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        use gloo::storage::{LocalStorage, Storage};

        match LocalStorage::set(Self::STORAGE_KEY, self) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Failed to save settings: {e}"),
        }
    }

    /// Load settings from the file named by `MOLE_RUSH_SETTINGS`
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(Self::PATH_ENV) else {
            log::info!("Using default settings");
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {path}");
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring malformed settings in {path}: {e}");
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Cannot read settings file {path}: {e}");
                Self::default()
            }
        }
    }
}
