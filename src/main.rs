//! Headless demo: run one scripted episode against the default bot
//! line-up and log per-step rewards. An optional JSON config path can
//! override the arena setup.

use agar_env::{Act, EngineConfig, Environment};

fn load_config() -> EngineConfig {
    let Some(path) = std::env::args().nth(1) else {
        return EngineConfig {
            max_steps: Some(250),
            seed: Some(42),
            ..Default::default()
        };
    };
    let json = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read {path}: {e}"));
    EngineConfig::from_json(&json).unwrap_or_else(|e| panic!("bad config {path}: {e}"))
}

fn main() {
    tracing_subscriber::fmt::init();

    let config = load_config();
    let mut env = Environment::new(config).expect("valid configuration");
    env.reset().expect("reset");

    // Scripted policy: sweep the arena corner to corner, splitting
    // every 50 steps.
    let corners = [(100.0, 100.0), (900.0, 100.0), (900.0, 900.0), (100.0, 900.0)];
    let mut episode_reward = 0.0;
    let mut steps = 0u32;

    while !env.done() && steps < 10_000 {
        let (tx, ty) = corners[(steps / 25) as usize % corners.len()];
        let act = if steps % 50 == 49 { Act::Split } else { Act::None };
        if env.take_action(tx, ty, act).is_err() {
            break;
        }
        match env.step() {
            Ok(reward) => {
                episode_reward += reward;
                steps += 1;
                if steps % 25 == 0 {
                    tracing::info!(steps, episode_reward, "episode progress");
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "step failed");
                break;
            }
        }
    }

    tracing::info!(steps, episode_reward, "episode finished");
}
