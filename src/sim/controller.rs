//! Session controller
//!
//! Owns the session value and every timer. All mutation happens inside
//! `advance`, `strike` and `restart`; each completes before the next timer
//! is dispatched, so there is never more than one callback in flight.

use std::time::Duration;

use super::clock::{ClockOutcome, SessionClock};
use super::difficulty::Level;
use super::grid::GridState;
use super::score::{apply_hazard_hit, apply_hit, derive_level};
use super::spawner::{CellSource, Spawner, SpawnerState};
use super::state::{GameEvent, PlayerProfile, Session, SessionStatus, StrikeOutcome};
use crate::error::{Result, ServiceError, SessionError};
use crate::highscores::{ScoreAccepted, ScoreService, ScoreSubmission};
use crate::persistence::SessionStore;
use crate::scheduler::{ManualScheduler, Scheduler, TimerHandle};
use crate::settings::Settings;

pub struct SessionController<St, R, S = ManualScheduler> {
    session_seconds: u32,
    store: St,
    scheduler: S,
    spawner: Spawner<R>,
    clock: SessionClock,
    session: Session,
    profile: PlayerProfile,
    pending_submission: Option<ScoreSubmission>,
    events: Vec<GameEvent>,
}

impl<St, R, S> SessionController<St, R, S>
where
    St: SessionStore,
    R: CellSource,
    S: Scheduler,
{
    /// Start a session for the stored player, resuming saved progress if
    /// there is any. Fails when nobody is logged in.
    pub fn start(settings: &Settings, store: St, scheduler: S, cells: R) -> Result<Self> {
        let Some(profile) = store.load_profile() else {
            log::warn!("No logged-in player, refusing to start a session");
            return Err(SessionError::Unauthenticated);
        };

        let (score, level) = match store.load_progress() {
            Some(saved) => {
                log::info!("Resuming at score {} (level {})", saved.score, saved.level);
                (saved.score, saved.level)
            }
            None => (0, Level::BASE),
        };

        let mut controller = Self {
            session_seconds: settings.session_seconds,
            store,
            scheduler,
            spawner: Spawner::new(settings.grid_cells, cells),
            clock: SessionClock::new(),
            session: Session::new(settings.session_seconds, score, level),
            profile,
            pending_submission: None,
            events: Vec::new(),
        };
        controller.arm_timers();

        log::info!(
            "Session started for {} (high score {})",
            controller.profile.name,
            controller.profile.high_score
        );
        Ok(controller)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn score(&self) -> u32 {
        self.session.score
    }

    pub fn level(&self) -> Level {
        self.session.level
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.session.seconds_remaining
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status
    }

    pub fn grid(&self) -> &GridState {
        self.spawner.grid()
    }

    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    pub fn spawner_state(&self) -> SpawnerState {
        self.spawner.state()
    }

    pub fn store(&self) -> &St {
        &self.store
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Take every event queued since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Run virtual time forward by `dt`, dispatching due timers in order
    pub fn advance(&mut self, dt: Duration) {
        let until = self.scheduler.now() + dt;
        while let Some(timer) = self.scheduler.fire_next(until) {
            self.dispatch(timer);
        }
        self.scheduler.advance_to(until);
    }

    /// Strike cell `index`. Stale, empty or late strikes are ignored.
    pub fn strike(&mut self, index: usize) -> StrikeOutcome {
        if self.session.is_over() {
            return StrikeOutcome::Ignored;
        }
        let Some(cell) = self.spawner.grid().cell(index) else {
            return StrikeOutcome::Ignored;
        };

        let outcome = if cell.has_target {
            apply_hit(&mut self.session);
            StrikeOutcome::Hit
        } else if cell.has_hazard {
            apply_hazard_hit(&mut self.session);
            StrikeOutcome::HazardHit
        } else {
            return StrikeOutcome::Ignored;
        };

        self.spawner.clear_cell(index);
        self.events
            .push(GameEvent::GridChanged(self.spawner.grid().clone()));
        self.on_score_changed();
        outcome
    }

    /// Start over at `at_level` (clamped). The base level starts from zero;
    /// any other level keeps the current score.
    pub fn restart(&mut self, at_level: i64) {
        let level = Level::clamped(at_level);
        self.stop_timers();

        let score = if level == Level::BASE {
            0
        } else {
            self.session.score
        };
        self.session = Session::new(self.session_seconds, score, level);
        self.spawner.reset();
        self.arm_timers();
        self.store.save_progress(&self.session.snapshot());

        log::info!("Restarted at level {level} with score {score}");
        self.events.push(GameEvent::Restarted { level, score });
        self.events
            .push(GameEvent::GridChanged(self.spawner.grid().clone()));
    }

    /// Restart choices offered once a session is over
    pub fn restart_levels(&self) -> Vec<Level> {
        let mut levels = vec![Level::BASE];
        if self.session.level > Level::BASE {
            levels.push(self.session.level);
        }
        levels
    }

    /// Cancel all timers (teardown). The session value is left as is.
    pub fn shutdown(&mut self) {
        self.stop_timers();
    }

    /// Submission queued by the end of the session, if the final score
    /// beat the player's high score
    pub fn take_submission(&mut self) -> Option<ScoreSubmission> {
        self.pending_submission.take()
    }

    /// Record the scoring service's answer. Failures are logged and leave
    /// the high score untouched.
    pub fn apply_submission(&mut self, result: core::result::Result<ScoreAccepted, ServiceError>) {
        match result {
            Ok(accepted) => {
                log::info!("High score confirmed: {}", accepted.highscore);
                self.profile.high_score = accepted.highscore;
                self.store.store_profile(&self.profile);
                self.events.push(GameEvent::HighScoreConfirmed {
                    high_score: accepted.highscore,
                });
            }
            Err(e) => log::warn!("High score submission failed: {e}"),
        }
    }

    /// Send any queued submission through `service` and apply the reply.
    /// Returns whether a submission was sent.
    pub fn submit_with(&mut self, service: &mut impl ScoreService) -> bool {
        let Some(submission) = self.take_submission() else {
            return false;
        };
        let result = service.submit(&submission);
        self.apply_submission(result);
        true
    }

    fn arm_timers(&mut self) {
        // Clock first: on a shared deadline it fires before the spawner
        self.clock.start(&mut self.scheduler);
        self.spawner.start(&mut self.scheduler, self.session.level);
    }

    fn stop_timers(&mut self) {
        self.clock.stop(&mut self.scheduler);
        self.spawner.stop(&mut self.scheduler);
    }

    fn dispatch(&mut self, timer: TimerHandle) {
        if self.clock.timer() == Some(timer) {
            self.on_clock_tick();
        } else if self.spawner.timer() == Some(timer) {
            self.on_spawn_tick();
        } else {
            log::trace!("Dropping orphaned timer {timer:?}");
            self.scheduler.cancel(timer);
        }
    }

    fn on_clock_tick(&mut self) {
        match self.clock.fire(&mut self.session, &mut self.scheduler) {
            ClockOutcome::Ticked { seconds_remaining } => {
                self.events.push(GameEvent::ClockTicked { seconds_remaining });
            }
            ClockOutcome::Expired => {
                self.events.push(GameEvent::ClockTicked {
                    seconds_remaining: 0,
                });
                self.finish();
            }
            ClockOutcome::Idle => {}
        }
    }

    fn on_spawn_tick(&mut self) {
        if self.session.is_over() {
            self.spawner.stop(&mut self.scheduler);
            return;
        }
        let grid = self.spawner.spawn(self.session.level).clone();
        self.events.push(GameEvent::GridChanged(grid));
    }

    fn on_score_changed(&mut self) {
        let score = self.session.score;
        self.events.push(GameEvent::ScoreChanged { score });

        let level = derive_level(score);
        if level != self.session.level {
            log::debug!("Level {} -> {}", self.session.level, level);
            self.session.level = level;
            self.spawner.retime(&mut self.scheduler, level);
            self.events.push(GameEvent::LevelChanged { level });
        }

        self.store.save_progress(&self.session.snapshot());
    }

    fn finish(&mut self) {
        self.stop_timers();
        let final_score = self.session.score;
        log::info!("Session over, final score {final_score}");
        self.events.push(GameEvent::SessionOver { final_score });

        if final_score > self.profile.high_score {
            self.pending_submission = Some(ScoreSubmission {
                player_id: self.profile.id.clone(),
                score: final_score,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highscores::LocalScoreService;
    use crate::persistence::MemoryStore;
    use crate::sim::spawner::tests::ScriptedCells;
    use crate::sim::state::SessionSnapshot;

    type TestController = SessionController<MemoryStore, ScriptedCells>;

    fn profile(high_score: u32) -> PlayerProfile {
        PlayerProfile {
            id: "p-1".to_string(),
            name: "Ada".to_string(),
            high_score,
        }
    }

    fn store_with(high_score: u32, progress: Option<(u32, i64)>) -> MemoryStore {
        let mut store = MemoryStore::with_profile(profile(high_score));
        store.progress = progress.map(|(score, level)| SessionSnapshot {
            score,
            level: Level::clamped(level),
        });
        store
    }

    fn start(store: MemoryStore, cells: &[usize]) -> TestController {
        SessionController::start(
            &Settings::default(),
            store,
            ManualScheduler::new(),
            ScriptedCells::new(cells),
        )
        .unwrap()
    }

    fn grids(events: &[GameEvent]) -> Vec<&GridState> {
        events
            .iter()
            .filter_map(|e| match e {
                GameEvent::GridChanged(g) => Some(g),
                _ => None,
            })
            .collect()
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    struct OfflineService {
        calls: usize,
    }

    impl ScoreService for OfflineService {
        fn submit(&mut self, _: &ScoreSubmission) -> core::result::Result<ScoreAccepted, ServiceError> {
            self.calls += 1;
            Err(ServiceError::Network("connection refused".to_string()))
        }
    }

    #[test]
    fn test_start_without_profile_is_unauthenticated() {
        let result = TestController::start(
            &Settings::default(),
            MemoryStore::new(),
            ManualScheduler::new(),
            ScriptedCells::new(&[]),
        );
        assert_eq!(result.err(), Some(SessionError::Unauthenticated));
    }

    #[test]
    fn test_fresh_start() {
        let game = start(store_with(0, None), &[]);
        assert_eq!(game.score(), 0);
        assert_eq!(game.level(), Level::BASE);
        assert_eq!(game.seconds_remaining(), 30);
        assert_eq!(game.status(), SessionStatus::Running);
        assert!(game.grid().is_clear());
        assert_eq!(game.scheduler().active_count(), 2);
    }

    #[test]
    fn test_start_resumes_saved_progress() {
        let game = start(store_with(0, Some((260, 2))), &[]);
        assert_eq!(game.score(), 260);
        assert_eq!(game.level().get(), 2);
        assert!(matches!(
            game.spawner_state(),
            SpawnerState::Active { interval, .. } if interval == ms(800)
        ));
    }

    #[test]
    fn test_first_second_spawns_and_ticks() {
        let mut game = start(store_with(0, None), &[3]);
        game.advance(ms(999));
        assert!(game.drain_events().is_empty());

        game.advance(ms(1));
        let events = game.drain_events();
        assert_eq!(events[0], GameEvent::ClockTicked { seconds_remaining: 29 });
        assert_eq!(grids(&events)[0].target(), Some(3));
        assert_eq!(game.grid().target(), Some(3));
    }

    #[test]
    fn test_strike_target_scores_once() {
        let mut game = start(store_with(0, None), &[4]);
        game.advance(ms(1000));
        game.drain_events();

        assert_eq!(game.strike(4), StrikeOutcome::Hit);
        assert_eq!(game.score(), 20);
        assert_eq!(game.grid().target(), None);
        assert_eq!(
            game.store().progress,
            Some(SessionSnapshot {
                score: 20,
                level: Level::BASE
            })
        );

        // Second click on the now-empty cell
        assert_eq!(game.strike(4), StrikeOutcome::Ignored);
        assert_eq!(game.score(), 20);
    }

    #[test]
    fn test_strike_empty_or_out_of_range_is_ignored() {
        let mut game = start(store_with(0, None), &[4]);
        game.advance(ms(1000));
        assert_eq!(game.strike(0), StrikeOutcome::Ignored);
        assert_eq!(game.strike(99), StrikeOutcome::Ignored);
        assert_eq!(game.score(), 0);
        assert_eq!(game.store().progress_writes, 0);
    }

    #[test]
    fn test_stale_strike_after_next_tick() {
        let mut game = start(store_with(0, None), &[4, 6]);
        game.advance(ms(2000));
        // Target moved from 4 to 6
        assert_eq!(game.strike(4), StrikeOutcome::Ignored);
        assert_eq!(game.strike(6), StrikeOutcome::Hit);
    }

    #[test]
    fn test_full_session_expires_and_stops_timers() {
        let mut game = start(store_with(0, None), &[]);
        game.advance(Duration::from_secs(30));
        let events = game.drain_events();

        assert_eq!(game.seconds_remaining(), 0);
        assert_eq!(game.status(), SessionStatus::Over);
        assert_eq!(game.spawner_state(), SpawnerState::Idle);
        assert_eq!(game.scheduler().active_count(), 0);
        // Clock wins the shared 30s deadline, so the spawner ticks 29 times
        assert_eq!(grids(&events).len(), 29);
        assert_eq!(events.last(), Some(&GameEvent::SessionOver { final_score: 0 }));

        game.advance(Duration::from_secs(60));
        assert!(game.drain_events().is_empty());
        assert_eq!(game.seconds_remaining(), 0);
    }

    #[test]
    fn test_strike_after_over_is_ignored() {
        let mut game = start(store_with(0, None), &[]);
        game.advance(Duration::from_secs(29));
        let target = game.grid().target().unwrap();
        game.advance(Duration::from_secs(1));

        assert_eq!(game.strike(target), StrikeOutcome::Ignored);
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn test_level_up_retimes_spawner_immediately() {
        let mut game = start(store_with(0, Some((180, 1))), &[4, 1]);
        game.advance(ms(1000));
        game.drain_events();

        assert_eq!(game.strike(4), StrikeOutcome::Hit);
        assert_eq!(game.level().get(), 2);
        let events = game.drain_events();
        assert!(events.contains(&GameEvent::LevelChanged {
            level: Level::clamped(2)
        }));
        assert_eq!(game.scheduler().active_count(), 2);

        // Next spawn lands 800ms after the level change, not at the old 2000ms
        game.advance(ms(799));
        assert!(grids(&game.drain_events()).is_empty());
        game.advance(ms(1));
        assert_eq!(grids(&game.drain_events())[0].target(), Some(1));
    }

    #[test]
    fn test_hazard_hit_at_level_three() {
        let mut game = start(store_with(0, Some((300, 3))), &[2, 2, 7]);
        game.advance(ms(600));
        assert_eq!(game.grid().target(), Some(2));
        assert_eq!(game.grid().hazard(), Some(7));

        assert_eq!(game.strike(7), StrikeOutcome::HazardHit);
        assert_eq!(game.score(), 250);
        assert_eq!(game.level().get(), 2);
        assert_eq!(game.grid().hazard(), None);
        assert_eq!(game.grid().target(), Some(2));
    }

    #[test]
    fn test_hazard_penalty_clamps_to_zero() {
        let mut game = start(store_with(0, Some((30, 3))), &[0, 5]);
        game.advance(ms(600));
        assert_eq!(game.strike(5), StrikeOutcome::HazardHit);
        assert_eq!(game.score(), 0);
        assert_eq!(game.level(), Level::BASE);
    }

    #[test]
    fn test_new_high_score_submits_once() {
        let mut game = start(store_with(100, Some((150, 1))), &[]);
        game.advance(Duration::from_secs(30));

        let mut service = LocalScoreService::new();
        assert!(game.submit_with(&mut service));
        assert!(!game.submit_with(&mut service));
        assert_eq!(
            service.received,
            vec![ScoreSubmission {
                player_id: "p-1".to_string(),
                score: 150
            }]
        );
        assert_eq!(game.profile().high_score, 150);
        assert_eq!(game.store().profile.as_ref().map(|p| p.high_score), Some(150));
    }

    #[test]
    fn test_lower_score_submits_nothing() {
        let mut game = start(store_with(100, Some((80, 1))), &[]);
        game.advance(Duration::from_secs(30));

        let mut service = LocalScoreService::new();
        assert!(!game.submit_with(&mut service));
        assert!(service.received.is_empty());
        assert_eq!(game.profile().high_score, 100);
    }

    #[test]
    fn test_no_submission_while_running() {
        let mut game = start(store_with(0, Some((150, 1))), &[]);
        game.advance(Duration::from_secs(10));
        assert_eq!(game.take_submission(), None);
    }

    #[test]
    fn test_server_value_wins() {
        let mut game = start(store_with(100, Some((150, 1))), &[]);
        game.advance(Duration::from_secs(30));

        // Stored profile was stale, the service already knows a better score
        let mut service = LocalScoreService::new().with_score("p-1", 500);
        game.submit_with(&mut service);
        assert_eq!(game.profile().high_score, 500);
        assert!(game
            .drain_events()
            .contains(&GameEvent::HighScoreConfirmed { high_score: 500 }));
    }

    #[test]
    fn test_failed_submission_is_swallowed() {
        let mut game = start(store_with(100, Some((150, 1))), &[]);
        game.advance(Duration::from_secs(30));

        let mut service = OfflineService { calls: 0 };
        assert!(game.submit_with(&mut service));
        assert_eq!(service.calls, 1);
        assert_eq!(game.profile().high_score, 100);
        assert_eq!(game.status(), SessionStatus::Over);
        assert_eq!(game.score(), 150);
    }

    #[test]
    fn test_restart_base_level_resets_score() {
        let mut game = start(store_with(0, Some((250, 2))), &[]);
        game.advance(Duration::from_secs(30));
        game.restart(1);

        assert_eq!(game.score(), 0);
        assert_eq!(game.level(), Level::BASE);
        assert_eq!(game.seconds_remaining(), 30);
        assert_eq!(game.status(), SessionStatus::Running);
        assert!(game.grid().is_clear());
        assert_eq!(game.scheduler().active_count(), 2);
        assert_eq!(
            game.store().progress,
            Some(SessionSnapshot {
                score: 0,
                level: Level::BASE
            })
        );
    }

    #[test]
    fn test_restart_at_level_keeps_score_and_forces_level() {
        let mut game = start(store_with(0, Some((250, 2))), &[]);
        game.advance(Duration::from_secs(30));
        game.restart(3);

        assert_eq!(game.score(), 250);
        assert_eq!(game.level().get(), 3);
        assert!(matches!(
            game.spawner_state(),
            SpawnerState::Active { interval, .. } if interval == ms(600)
        ));
    }

    #[test]
    fn test_restart_mid_session_cancels_old_timers() {
        let mut game = start(store_with(0, None), &[]);
        game.advance(ms(1500));
        game.restart(1);
        game.drain_events();

        assert_eq!(game.scheduler().active_count(), 2);
        // Old clock would have fired at 2000ms; the fresh one fires at 2500ms
        game.advance(ms(999));
        assert!(game.drain_events().is_empty());
        assert_eq!(game.seconds_remaining(), 30);
        game.advance(ms(1));
        assert_eq!(game.seconds_remaining(), 29);
    }

    #[test]
    fn test_restart_level_is_clamped() {
        let mut game = start(store_with(0, Some((120, 1))), &[]);
        game.restart(9);
        assert_eq!(game.level(), Level::MAX);
        assert_eq!(game.score(), 120);
    }

    #[test]
    fn test_restart_levels_offer() {
        let game = start(store_with(0, None), &[]);
        assert_eq!(game.restart_levels(), vec![Level::BASE]);

        let game = start(store_with(0, Some((320, 3))), &[]);
        assert_eq!(game.restart_levels(), vec![Level::BASE, Level::clamped(3)]);
    }

    #[test]
    fn test_shutdown_cancels_everything() {
        let mut game = start(store_with(0, None), &[]);
        game.shutdown();
        assert_eq!(game.scheduler().active_count(), 0);
        game.advance(Duration::from_secs(5));
        assert!(game.drain_events().is_empty());
        assert_eq!(game.seconds_remaining(), 30);
    }
}
