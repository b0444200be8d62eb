//! Benchmark profiles and utilities for the Depot warehouse simulation.
//!
//! Provides pre-built [`WarehouseConfig`] profiles for benchmarks and
//! examples:
//!
//! - [`reference_profile`]: medium preset, 10 agents
//! - [`stress_profile`]: 10x5-block generated warehouse, 64 agents
//! - [`ActionStream`]: deterministic random action codes

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use depot_core::Action;
use depot_grid::MapId;
use depot_sim::WarehouseConfig;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Medium preset (16x20, 160 shelves) with 10 agents and 4 requests.
pub fn reference_profile(seed: u64) -> WarehouseConfig {
    WarehouseConfig {
        map: MapId::Medium,
        num_agents: 10,
        num_requested: 4,
        seed,
        ..Default::default()
    }
}

/// A crowded generated warehouse with 64 agents.
///
/// Dense traffic exercises the movement resolver's chain and cycle
/// handling far more than the presets.
pub fn stress_profile(seed: u64) -> WarehouseConfig {
    WarehouseConfig {
        map: MapId::Generated {
            shelf_columns: 10,
            shelf_rows: 5,
            column_height: 8,
        },
        num_agents: 64,
        num_requested: 16,
        max_episode_length: 1000,
        seed,
        ..Default::default()
    }
}

/// Deterministic uniform random actions, biased towards moving.
#[derive(Clone, Debug)]
pub struct ActionStream {
    rng: ChaCha8Rng,
    codes: Vec<i32>,
}

impl ActionStream {
    /// A stream filling `slots` action codes per call.
    pub fn new(seed: u64, slots: usize) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            codes: vec![0; slots],
        }
    }

    /// Draw the next batch of action codes.
    ///
    /// Half of all draws are [`Action::Forward`]; the rest are uniform.
    pub fn next_batch(&mut self) -> &[i32] {
        for code in &mut self.codes {
            *code = if self.rng.random_bool(0.5) {
                Action::Forward.code()
            } else {
                self.rng.random_range(0..Action::COUNT as i32)
            };
        }
        &self.codes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot_sim::Warehouse;

    #[test]
    fn profiles_build() {
        let w = Warehouse::new(reference_profile(1)).unwrap();
        assert_eq!(w.num_agents(), 10);
        let w = Warehouse::new(stress_profile(1)).unwrap();
        assert_eq!(w.num_agents(), 64);
    }

    #[test]
    fn action_stream_is_deterministic_and_in_range() {
        let mut a = ActionStream::new(9, 32);
        let mut b = ActionStream::new(9, 32);
        for _ in 0..10 {
            let batch = a.next_batch().to_vec();
            assert_eq!(batch, b.next_batch());
            assert!(batch.iter().all(|c| Action::try_from(*c).is_ok()));
        }
    }
}
