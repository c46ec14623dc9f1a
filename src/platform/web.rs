//! Browser bindings (wasm32 only)

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use gloo::net::http::Request;
use gloo::storage::{SessionStorage, Storage};
use gloo::timers::callback::Interval;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use wasm_bindgen::prelude::*;

use crate::error::ServiceError;
use crate::highscores::{ScoreAccepted, ScoreSubmission};
use crate::persistence::SessionStore;
use crate::scheduler::ManualScheduler;
use crate::settings::Settings;
use crate::sim::{Level, PlayerProfile, SessionController, SessionSnapshot, StrikeOutcome};

/// How often the driver advances the virtual clock
const FRAME_MS: u32 = 50;

/// Profile and progress in `sessionStorage`, under the keys the login
/// screen already writes
#[derive(Debug, Default)]
pub struct SessionStorageStore;

impl SessionStorageStore {
    const PROFILE_KEY: &'static str = "loggedInUser";
    const SCORE_KEY: &'static str = "currentScore";
    const LEVEL_KEY: &'static str = "currentLevel";
}

impl SessionStore for SessionStorageStore {
    fn load_profile(&self) -> Option<PlayerProfile> {
        SessionStorage::get(Self::PROFILE_KEY).ok()
    }

    fn store_profile(&mut self, profile: &PlayerProfile) {
        if let Err(e) = SessionStorage::set(Self::PROFILE_KEY, profile) {
            log::warn!("Failed to store profile: {e}");
        }
    }

    fn load_progress(&self) -> Option<SessionSnapshot> {
        let score = SessionStorage::get::<u32>(Self::SCORE_KEY).ok()?;
        let level = SessionStorage::get::<i64>(Self::LEVEL_KEY)
            .map(Level::clamped)
            .unwrap_or_default();
        Some(SessionSnapshot { score, level })
    }

    fn save_progress(&mut self, snapshot: &SessionSnapshot) {
        let saved = SessionStorage::set(Self::SCORE_KEY, snapshot.score)
            .and_then(|()| SessionStorage::set(Self::LEVEL_KEY, snapshot.level.get()));
        if let Err(e) = saved {
            log::warn!("Failed to save progress: {e}");
        }
    }
}

/// `PUT {api}/api/update-score/{playerId}` with `{ "highscore": n }`
pub async fn submit_over_http(
    url: String,
    submission: ScoreSubmission,
) -> Result<ScoreAccepted, ServiceError> {
    let response = Request::put(&url)
        .json(&submission.body())
        .map_err(|e| ServiceError::Network(e.to_string()))?
        .send()
        .await
        .map_err(|e| ServiceError::Network(e.to_string()))?;

    if !response.ok() {
        return Err(ServiceError::Rejected {
            status: response.status(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| ServiceError::Network(e.to_string()))?;
    ScoreAccepted::from_json(&body)
}

type WebController = SessionController<SessionStorageStore, Pcg32>;

/// Session handle for the page script. Rendering stays on the JS side;
/// it polls these getters and forwards clicks to `strike`.
#[wasm_bindgen]
pub struct WebGame {
    controller: Rc<RefCell<WebController>>,
    settings: Settings,
    _frame: Interval,
}

#[wasm_bindgen]
impl WebGame {
    /// Start a session for the logged-in player. Errors when nobody is
    /// logged in; the page should then redirect to its login route.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WebGame, JsValue> {
        let settings = Settings::load();
        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        let controller = SessionController::start(
            &settings,
            SessionStorageStore,
            ManualScheduler::new(),
            Pcg32::seed_from_u64(seed),
        )
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let controller = Rc::new(RefCell::new(controller));

        let frame = {
            let controller = Rc::clone(&controller);
            let settings = settings.clone();
            let mut last = js_sys::Date::now();
            Interval::new(FRAME_MS, move || {
                let now = js_sys::Date::now();
                let dt = Duration::from_secs_f64(((now - last) / 1000.0).max(0.0));
                last = now;

                let submission = {
                    let mut c = controller.borrow_mut();
                    c.advance(dt);
                    c.drain_events();
                    c.take_submission()
                };
                if let Some(submission) = submission {
                    spawn_submission(Rc::clone(&controller), &settings, submission);
                }
            })
        };

        log::info!("Session running with seed {seed}");
        Ok(WebGame {
            controller,
            settings,
            _frame: frame,
        })
    }

    /// 1 = hit, -1 = hazard, 0 = ignored
    pub fn strike(&self, index: usize) -> i32 {
        match self.controller.borrow_mut().strike(index) {
            StrikeOutcome::Hit => 1,
            StrikeOutcome::HazardHit => -1,
            StrikeOutcome::Ignored => 0,
        }
    }

    pub fn restart(&self, level: i32) {
        self.controller.borrow_mut().restart(level as i64);
    }

    pub fn score(&self) -> u32 {
        self.controller.borrow().score()
    }

    pub fn level(&self) -> u8 {
        self.controller.borrow().level().get()
    }

    pub fn high_score(&self) -> u32 {
        self.controller.borrow().profile().high_score
    }

    pub fn player_name(&self) -> String {
        self.controller.borrow().profile().name.clone()
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.controller.borrow().seconds_remaining()
    }

    pub fn is_over(&self) -> bool {
        self.controller.borrow().session().is_over()
    }

    /// Target cell index, or -1
    pub fn target(&self) -> i32 {
        self.controller.borrow().grid().target().map_or(-1, |i| i as i32)
    }

    /// Hazard cell index, or -1
    pub fn hazard(&self) -> i32 {
        self.controller.borrow().grid().hazard().map_or(-1, |i| i as i32)
    }

    pub fn grid_cells(&self) -> usize {
        self.settings.grid_cells
    }

    /// Levels the game-over screen offers to restart from
    pub fn restart_levels(&self) -> Vec<u8> {
        self.controller
            .borrow()
            .restart_levels()
            .into_iter()
            .map(Level::get)
            .collect()
    }
}

impl Drop for WebGame {
    fn drop(&mut self) {
        if let Ok(mut c) = self.controller.try_borrow_mut() {
            c.shutdown();
        }
    }
}

fn spawn_submission(
    controller: Rc<RefCell<WebController>>,
    settings: &Settings,
    submission: ScoreSubmission,
) {
    let url = settings.submit_url(&submission.player_id);
    wasm_bindgen_futures::spawn_local(async move {
        let result = submit_over_http(url, submission).await;
        controller.borrow_mut().apply_submission(result);
    });
}

/// Install the console logger and panic hook
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::warn!("Logger already initialised");
    }
}
