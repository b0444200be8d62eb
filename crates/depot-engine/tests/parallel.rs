//! Sequential and pooled stepping must agree bit for bit.

use depot_engine::{BatchedEngine, OwnedBuffers};
use depot_sim::WarehouseConfig;
use depot_test_utils::random_actions;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn run(
    num_threads: Option<usize>,
    seed: u64,
    envs: usize,
    ticks: usize,
) -> (OwnedBuffers, Vec<u8>) {
    let config = WarehouseConfig {
        num_agents: 4,
        max_episode_length: 25,
        seed,
        ..Default::default()
    };
    let mut engine = BatchedEngine::new(config, envs, num_threads).unwrap();
    let mut buffers = OwnedBuffers::for_engine(&engine);
    engine.reset(&mut buffers.view()).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut done_trace = Vec::new();
    for _ in 0..ticks {
        buffers.actions = random_actions(&mut rng, envs * 4);
        engine.step(&mut buffers.view()).unwrap();
        done_trace.extend_from_slice(&buffers.dones);
    }
    (buffers, done_trace)
}

#[test]
fn pooled_matches_sequential() {
    let sequential = run(None, 3, 8, 60);
    let pooled = run(Some(4), 3, 8, 60);
    assert_eq!(sequential, pooled);
}

#[test]
fn reset_is_idempotent() {
    let config = WarehouseConfig::default();
    let mut engine = BatchedEngine::new(config, 3, Some(2)).unwrap();
    let mut a = OwnedBuffers::for_engine(&engine);
    engine.reset(&mut a.view()).unwrap();
    a.actions.fill(1);
    engine.step(&mut a.view()).unwrap();

    let mut b = OwnedBuffers::for_engine(&engine);
    let mut c = OwnedBuffers::for_engine(&engine);
    engine.reset(&mut b.view()).unwrap();
    engine.reset(&mut c.view()).unwrap();
    assert_eq!(b, c);
}

#[test]
fn shutdown_reports_remaining_episodes() {
    let config = WarehouseConfig {
        max_episode_length: 3,
        ..Default::default()
    };
    let mut engine = BatchedEngine::new(config, 2, None).unwrap();
    let mut buffers = OwnedBuffers::for_engine(&engine);
    engine.reset(&mut buffers.view()).unwrap();
    for _ in 0..6 {
        engine.step(&mut buffers.view()).unwrap();
    }
    let summary = engine.shutdown();
    assert_eq!(summary.n, 4);
    assert_eq!(summary.episode_length, 3.0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn thread_count_never_changes_results(seed in any::<u64>(), threads in 1usize..5) {
        prop_assert_eq!(run(None, seed, 5, 30), run(Some(threads), seed, 5, 30));
    }
}
