//! End-to-end batched RL loop with a random policy.
//!
//! Demonstrates: build config → BatchedEngine → reset → step with flat
//! buffers → drain episode statistics → shutdown.
//!
//! Set `RUST_LOG=depot_sim=debug` to see per-tick resolution logs.

use depot_bench::{reference_profile, ActionStream};
use depot_engine::{BatchedEngine, OwnedBuffers};
use tracing::info;
use tracing_subscriber::EnvFilter;

const NUM_ENVS: usize = 16;
const TICKS: usize = 2_000;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = reference_profile(42);
    let mut engine = BatchedEngine::new(config, NUM_ENVS, Some(4)).unwrap();
    let mut buffers = OwnedBuffers::for_engine(&engine);
    let mut policy = ActionStream::new(0, buffers.actions.len());
    engine.reset(&mut buffers.view()).unwrap();

    info!(
        envs = NUM_ENVS,
        agents = engine.num_agents(),
        obs_size = engine.obs_size(),
        "starting random rollout"
    );

    let mut total_us = 0u64;
    let mut finished = 0usize;
    for tick in 1..=TICKS {
        buffers.actions.copy_from_slice(policy.next_batch());
        let result = engine.step(&mut buffers.view()).unwrap();
        finished += result.episodes_finished;
        total_us += result.metrics.iter().map(|m| m.total_us).max().unwrap_or(0);

        if tick % 500 == 0 {
            let summary = engine.aggregate_and_clear();
            info!(
                tick,
                episodes = summary.n,
                mean_return = summary.episode_return,
                mean_length = summary.episode_length,
                mean_score = summary.score,
                "log drained"
            );
        }
    }

    let summary = engine.shutdown();
    info!(
        finished,
        leftover_episodes = summary.n,
        mean_step_us = total_us as f64 / TICKS as f64,
        "done"
    );
}
