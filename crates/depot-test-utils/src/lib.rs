//! Test utilities for Depot development.
//!
//! Provides hand-written maps, a [`Scenario`] builder that pins agents and
//! requests to exact cells, a [`Harness`] that owns step buffers, and a
//! [`RecordingClient`] for exercising the client seam.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::VecDeque;

use depot_core::{Action, Direction, ShelfId, WarehouseError};
use depot_grid::AsciiMap;
use depot_sim::{
    AgentPlacement, Client, StartState, StepOutcome, Warehouse, WarehouseConfig, WarehouseView,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub use fixtures::{CORRIDOR, OPEN_FLOOR, STORE_ROOM};

/// Builder for a warehouse with an exact start state.
#[derive(Clone, Debug)]
pub struct Scenario {
    map: String,
    config: WarehouseConfig,
    agents: Vec<AgentPlacement>,
    requested: Vec<ShelfId>,
}

impl Scenario {
    pub fn new(map: &str) -> Self {
        Self {
            map: map.to_owned(),
            config: WarehouseConfig {
                num_requested: 1,
                ..Default::default()
            },
            agents: Vec::new(),
            requested: Vec::new(),
        }
    }

    pub fn agent(mut self, x: i32, y: i32, facing: Direction) -> Self {
        self.agents.push(AgentPlacement::new(x, y, facing));
        self
    }

    pub fn request(mut self, shelf: u32) -> Self {
        self.requested.push(ShelfId(shelf));
        self
    }

    pub fn config(mut self, f: impl FnOnce(&mut WarehouseConfig)) -> Self {
        f(&mut self.config);
        self
    }

    /// Build the warehouse and reset it to the described start.
    ///
    /// Panics on invalid scenarios; this is test scaffolding.
    pub fn build(self) -> Warehouse {
        let mut config = self.config;
        config.num_agents = self.agents.len();
        config.num_requested = config.num_requested.max(self.requested.len()).max(1);
        let mut w = Warehouse::with_map(config, &AsciiMap::new(self.map))
            .unwrap_or_else(|e| panic!("scenario config rejected: {e}"));
        let start = StartState {
            agents: self.agents,
            requested: self.requested,
        };
        w.reset_to(&start)
            .unwrap_or_else(|e| panic!("scenario start rejected: {e}"));
        w
    }

    pub fn harness(self) -> Harness {
        Harness::new(self.build())
    }
}

/// A warehouse plus correctly sized step buffers.
#[derive(Debug)]
pub struct Harness {
    pub warehouse: Warehouse,
    pub observations: Vec<f32>,
    pub rewards: Vec<f32>,
}

impl Harness {
    pub fn new(warehouse: Warehouse) -> Self {
        let observations = vec![0.0; warehouse.num_agents() * warehouse.obs_size()];
        let rewards = vec![0.0; warehouse.num_agents()];
        Self {
            warehouse,
            observations,
            rewards,
        }
    }

    pub fn try_step(&mut self, actions: &[Action]) -> Result<StepOutcome, WarehouseError> {
        let codes: Vec<i32> = actions.iter().map(|a| a.code()).collect();
        self.warehouse
            .step(&codes, &mut self.observations, &mut self.rewards)
    }

    /// Step, panicking on error.
    pub fn step(&mut self, actions: &[Action]) -> StepOutcome {
        self.try_step(actions)
            .unwrap_or_else(|e| panic!("step failed: {e}"))
    }

    /// Observation slice of one agent.
    pub fn obs(&self, agent: usize) -> &[f32] {
        let size = self.warehouse.obs_size();
        &self.observations[agent * size..(agent + 1) * size]
    }
}

/// The RNG the warehouse itself uses, seeded for a test.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Uniform random action codes for `n` agents.
pub fn random_actions<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Vec<i32> {
    (0..n)
        .map(|_| rng.random_range(0..Action::COUNT as i32))
        .collect()
}

/// A [`Client`] that records every frame and replays scripted human input.
#[derive(Debug, Default)]
pub struct RecordingClient {
    pub frames: Vec<String>,
    pub script: VecDeque<Action>,
}

impl RecordingClient {
    pub fn with_script(actions: impl IntoIterator<Item = Action>) -> Self {
        Self {
            frames: Vec::new(),
            script: actions.into_iter().collect(),
        }
    }
}

impl Client for RecordingClient {
    fn render(&mut self, view: &WarehouseView<'_>) {
        self.frames.push(view.to_ascii());
    }

    fn human_action(&mut self) -> Option<Action> {
        self.script.pop_front()
    }
}
