//! Lane Dash entry point
//!
//! Headless native runner: the autopilot plays one round against a synthetic
//! 60 Hz clock, events are logged, and the score goes to the leaderboard file.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use clap::Parser;

    use lane_dash::content::sportsdb::SportsDbBundle;
    use lane_dash::content::{ContentCache, ContentProvider, group_by_category};
    use lane_dash::highscores::HighScores;
    use lane_dash::session::Session;
    use lane_dash::sim::{GameEvent, suggest_lane_change};
    use lane_dash::tuning::Tuning;

    /// Host frame interval for the synthetic clock (ms)
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Play area of a typical phone in portrait
    const PLAY_AREA: (f32, f32) = (390.0, 844.0);
    /// Stop the demo here if the autopilot never crashes
    const DEFAULT_MAX_SECONDS: f64 = 300.0;

    #[derive(Debug, Parser)]
    #[command(name = "lane-dash")]
    #[command(about = "Headless Lane Dash round played by the autopilot")]
    struct Options {
        /// Tuning JSON; missing keys keep their defaults
        #[arg(long)]
        tuning: Option<PathBuf>,
        /// Sports-database bundle to draw item facts from
        #[arg(long)]
        facts: Option<PathBuf>,
        /// High score file, loaded before and saved after the round
        #[arg(long)]
        scores: Option<PathBuf>,
        /// Spawn seed (defaults to the clock)
        #[arg(long)]
        seed: Option<u64>,
        /// Stop the round after this many simulated seconds
        #[arg(long, default_value_t = DEFAULT_MAX_SECONDS)]
        max_seconds: f64,
    }

    fn clock_seed() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64
    }

    pub fn run() {
        env_logger::init();
        let opts = Options::parse();
        log::info!("Lane Dash (headless) starting...");

        let tuning = opts
            .tuning
            .as_deref()
            .map(Tuning::load_or_default)
            .unwrap_or_default();

        let mut content = ContentCache::new();
        if let Some(path) = &opts.facts {
            content.load_with(|| {
                let json = std::fs::read_to_string(path)?;
                Ok(SportsDbBundle::from_json(&json)?.into_facts())
            });
        }
        log::info!("{}", content.hint());
        for (category, facts) in group_by_category(&content.facts()) {
            log::info!("  {} facts: {}", category.as_str(), facts.len());
        }

        let scores = match &opts.scores {
            Some(path) => HighScores::load(path).unwrap_or_else(|e| {
                log::warn!("Starting a fresh leaderboard: {}", e);
                HighScores::new()
            }),
            None => HighScores::new(),
        };

        let seed = opts.seed.unwrap_or_else(clock_seed);
        let mut session = Session::new(tuning, content, scores, seed);
        session.set_playfield(PLAY_AREA.0, PLAY_AREA.1);
        session.start();

        let max_seconds = opts.max_seconds;
        let mut frame = 0u64;
        loop {
            let now = frame as f64 * FRAME_MS;
            frame += 1;

            if let Some(dir) = suggest_lane_change(session.state(), session.playfield()) {
                session.request_lane_change(dir);
            }

            let report = session.frame(now);
            for event in &report.events {
                match event {
                    GameEvent::ItemCollected { kind, .. } => {
                        if let Some(toast) = &session.state().toast {
                            log::info!("{:?}: {} {}", kind, toast.title, toast.subtitle);
                        }
                    }
                    GameEvent::ShieldConsumed { obstacle_id } => {
                        log::info!("Shield absorbed obstacle {}", obstacle_id)
                    }
                    GameEvent::Crashed { .. } => {}
                }
            }
            if let Some(score) = report.game_over {
                println!("Game over! Score: {}", score);
                break;
            }
            if now / 1000.0 >= max_seconds {
                println!(
                    "Time limit reached at {} points",
                    session.state().display_score()
                );
                session.exit();
                break;
            }
        }

        let scores = session.into_sink();
        println!("Best: {}", scores.best());
        if let Some(path) = &opts.scores {
            if let Err(e) = scores.save(path) {
                log::error!("Could not save high scores: {}", e);
            }
        }
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The web host drives `Session` directly; nothing to run here
}
