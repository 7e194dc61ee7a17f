//! Neon Dodger headless demo
//!
//! Runs a seeded autopilot session of the simulation core and prints HUD
//! snapshots as it goes. Useful for balance tuning and soak-testing the
//! step loop without a renderer attached.
//!
//! Usage: neon-dodger [easy|normal|hard] [seed] [max-frames]

use std::env;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use neon_dodger::sim::{Capabilities, GamePhase, GameState, TickInput, step};
use neon_dodger::{Difficulty, HighScoreStore, resolve_config};

const FRAME_DT: f32 = 1.0 / 60.0;
const DEFAULT_FRAMES: u64 = 60 * 120;
const SCORE_FILE: &str = "neon_dodger_highscore.json";

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();

    let difficulty = match args.first() {
        Some(s) => match Difficulty::from_str(s.as_str()) {
            Some(d) => d,
            None => {
                eprintln!("unknown difficulty {:?} (easy|normal|hard)", s);
                return ExitCode::FAILURE;
            }
        },
        None => Difficulty::Normal,
    };
    let seed = match args.get(1).map(|s| s.parse::<u64>()) {
        Some(Ok(seed)) => seed,
        Some(Err(_)) => {
            eprintln!("seed must be an unsigned integer");
            return ExitCode::FAILURE;
        }
        None => SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0),
    };
    let max_frames = match args.get(2).map(|s| s.parse::<u64>()) {
        Some(Ok(n)) => n,
        Some(Err(_)) => {
            eprintln!("max-frames must be an unsigned integer");
            return ExitCode::FAILURE;
        }
        None => DEFAULT_FRAMES,
    };

    let cfg = resolve_config(difficulty);
    let mut scores = HighScoreStore::open(SCORE_FILE);

    log::info!(
        "starting demo run: difficulty={} seed={} frames={}",
        difficulty.as_str(),
        seed,
        max_frames
    );

    let mut state = GameState::new(&cfg, seed, scores.high_score());
    state.capabilities = Capabilities {
        brainstem_model: true,
    };

    let input = TickInput {
        idle_mode: true,
        ..TickInput::default()
    };
    let mut frames = 0u64;
    while frames < max_frames && state.phase != GamePhase::GameOver {
        step(&mut state, &cfg, &input, FRAME_DT);
        frames += 1;

        for event in state.drain_events() {
            log::debug!("event at frame {}: {:?}", frames, event);
        }
        if frames % 300 == 0 {
            let hud = state.hud();
            log::info!(
                "t={:.1}s score={} lives={} level={} enemies={}",
                state.time,
                hud.score,
                hud.lives,
                hud.level,
                state.enemies.len()
            );
        }
    }

    let hud = state.hud();
    println!(
        "run finished after {} frames: score {} level {} ({})",
        frames,
        hud.score,
        hud.level,
        if state.phase == GamePhase::GameOver {
            "game over"
        } else {
            "frame budget"
        }
    );

    match scores.submit(hud.score, difficulty.as_str()) {
        Ok(true) => println!("new high score: {}", hud.score),
        Ok(false) => println!("best remains {}", scores.high_score()),
        Err(e) => {
            log::error!("failed to save high score: {}", e);
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
