//! Space Runner demo binary.
//!
//! Plays a scripted run against the simulation core, logs notable events,
//! then replays the same seed and inputs to verify the run is fully
//! deterministic.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use space_runner::game::events::RunEventData;
use space_runner::{Game, GameStatus, InputIntent, MemoryStore, TickResult};

const SEED: u64 = 0x5EED_2026;
const DT: f32 = 1.0 / 60.0;
const DEMO_SECONDS: f32 = 60.0;

fn main() -> Result<()> {
    // RUST_LOG overrides the default (e.g. RUST_LOG=space_runner=debug)
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("space-runner core v{}", space_runner::VERSION);

    let first = play_demo_run(SEED)?;
    let second = play_demo_run(SEED)?;
    anyhow::ensure!(
        first == second,
        "replay with the same seed and inputs diverged"
    );
    info!("determinism check passed: identical replay for seed {SEED:#x}");

    Ok(())
}

/// Run the scripted demo and return the final snapshot as JSON.
fn play_demo_run(seed: u64) -> Result<String> {
    let mut game = Game::new(seed, Box::new(MemoryStore::new()));
    game.set_player_name("DEMO");
    game.start_game();

    let steps = (DEMO_SECONDS / DT) as usize;
    for step in 0..steps {
        let result = game.tick(DT, scripted_intent(step, &game));
        log_events(&result);

        match game.session().status {
            // The demo just leaves the shop immediately
            GameStatus::Shop => game.close_shop(),
            GameStatus::GameOver => {
                if !game.revive_with_ad() {
                    break;
                }
            }
            GameStatus::Victory => break,
            _ => {}
        }

        if step % (5.0 / DT) as usize == 0 {
            let hud = game.snapshot().hud;
            info!(
                score = hud.score,
                lives = hud.lives,
                level = hud.level,
                distance = format!("{:.1}", hud.distance),
                word = hud.current_word,
                "progress"
            );
        }
    }

    let snapshot = game.snapshot();
    info!(
        final_score = snapshot.hud.score,
        final_level = snapshot.hud.level,
        status = ?snapshot.hud.status,
        high_score = game.stats().high_score,
        "run finished"
    );
    Ok(serde_json::to_string(&snapshot)?)
}

/// A simple deterministic input script: weave across the lanes and jump
/// periodically.
fn scripted_intent(step: usize, game: &Game) -> InputIntent {
    let mut intent = InputIntent::new();
    match step % 240 {
        30 => intent = InputIntent::with_flags(InputIntent::FLAG_MOVE_LEFT),
        90 => intent = InputIntent::with_flags(InputIntent::FLAG_MOVE_RIGHT),
        150 => intent = InputIntent::with_flags(InputIntent::FLAG_MOVE_RIGHT),
        210 => intent = InputIntent::with_flags(InputIntent::FLAG_MOVE_LEFT),
        _ => {}
    }
    if step % 45 == 0 {
        intent.set_jump();
    }
    if game.session().has_immortality && step % 600 == 0 {
        intent.flags |= InputIntent::FLAG_ABILITY;
    }
    intent
}

fn log_events(result: &TickResult) {
    for event in &result.events {
        match &event.data {
            RunEventData::Damaged { lives_left } => {
                info!(lives_left, at = format!("{:.1}", event.distance), "hit a hazard");
            }
            RunEventData::LevelAdvanced { level, word } => {
                info!(level, word, "level up");
            }
            RunEventData::GameOver { score } => info!(score, "game over"),
            RunEventData::Victory { score } => info!(score, "victory!"),
            RunEventData::AchievementUnlocked { achievement } => {
                info!(?achievement, "achievement unlocked");
            }
            RunEventData::Revived { via_ad } => info!(via_ad, "revived"),
            _ => {}
        }
    }
}
