//! Mole Rush entry point
//!
//! Natively this plays one headless session with an autoplayer on the
//! virtual clock and submits the result to an in-process score service.
//! In the browser the library's `WebGame` is the entry point instead.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::process::ExitCode;
    use std::time::Duration;

    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use mole_rush::sim::{GameEvent, PlayerProfile};
    use mole_rush::{
        LocalScoreService, ManualScheduler, MemoryStore, SessionController, Settings,
        StrikeOutcome,
    };

    /// Virtual time per loop step
    const STEP: Duration = Duration::from_millis(50);
    /// Chance the autoplayer lunges at a showing hazard
    const HAZARD_MISTAKE_RATE: f32 = 0.1;

    pub fn run() -> ExitCode {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

        let settings = Settings::load();
        let seed = settings.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or_default()
        });
        log::info!("Mole Rush headless run, seed {seed}");

        let profile = PlayerProfile {
            id: "local-player".to_string(),
            name: "Autoplayer".to_string(),
            high_score: 0,
        };
        let mut service = LocalScoreService::new();

        let mut game = match SessionController::start(
            &settings,
            MemoryStore::with_profile(profile),
            ManualScheduler::new(),
            Pcg32::seed_from_u64(seed),
        ) {
            Ok(game) => game,
            Err(e) => {
                log::error!("{e}");
                return ExitCode::FAILURE;
            }
        };

        // Separate stream so the player's choices don't shift the grid draws
        let mut hand = Pcg32::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15);
        let (mut hits, mut hazards) = (0u32, 0u32);

        while !game.session().is_over() {
            game.advance(STEP);
            for event in game.drain_events() {
                match event {
                    GameEvent::LevelChanged { level } => log::info!("Level {level}"),
                    GameEvent::ClockTicked { seconds_remaining } if seconds_remaining % 10 == 0 => {
                        log::info!("{seconds_remaining}s left, score {}", game.score());
                    }
                    _ => {}
                }
            }

            if let Some(hazard) = game.grid().hazard() {
                if hand.random::<f32>() < HAZARD_MISTAKE_RATE * STEP.as_secs_f32() {
                    if game.strike(hazard) == StrikeOutcome::HazardHit {
                        hazards += 1;
                    }
                }
            }
            if let Some(target) = game.grid().target() {
                // Spread one accuracy roll over roughly a second of reaction time
                if hand.random::<f32>() < settings.autoplay_accuracy * STEP.as_secs_f32() * 2.0 {
                    if game.strike(target) == StrikeOutcome::Hit {
                        hits += 1;
                    }
                }
            }
        }

        game.submit_with(&mut service);

        println!("Final score: {}", game.score());
        println!("Level reached: {}", game.level());
        println!("Targets hit: {hits}, hazards hit: {hazards}");
        println!("High score: {}", game.profile().high_score);
        ExitCode::SUCCESS
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    headless::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
