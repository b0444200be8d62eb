//! The single-instance tick orchestrator.
//!
//! [`Warehouse`] owns one grid, its shelves and agents, and advances them
//! one tick per [`step`](Warehouse::step):
//!
//! 1. Validate buffer lengths and decode every action. Nothing is
//!    mutated if this fails.
//! 2. Per agent: wake idle agents, apply turns, and attempt load/unload.
//!    Refused loads are recovered as no-ops.
//! 3. Resolve all forward moves simultaneously and commit them.
//! 4. Complete deliveries, refill the request queue, and score.
//! 5. On episode end, record a [`LogRecord`] and auto-reset.
//! 6. Write observations.
//!
//! A fatal error aborts the instance: every later step returns
//! [`WarehouseError::Aborted`] until [`reset`](Warehouse::reset) is called.

use std::time::Instant;

use depot_core::{Action, AgentId, Coord, PickupFailure, ShelfId, TickId, WarehouseError};
use depot_grid::{CellKind, MapSource};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace, warn};

use crate::agent::Agent;
use crate::config::{ConfigError, WarehouseConfig};
use crate::grid::Grid;
use crate::log::{EpisodeLog, LogRecord};
use crate::metrics::StepMetrics;
use crate::movement::{Intent, MoveOutcome, MovementResolver};
use crate::obs::{nearest, ObsLayout};
use crate::shelf::ShelfRegistry;
use crate::start::StartState;
use crate::view::WarehouseView;

/// Result of one [`Warehouse::step`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// The episode ended this tick (the instance has already auto-reset).
    pub done: bool,
    /// Counters and timings for the tick.
    pub metrics: StepMetrics,
}

/// One warehouse simulation instance.
#[derive(Debug)]
pub struct Warehouse {
    config: WarehouseConfig,
    grid: Grid,
    shelves: ShelfRegistry,
    agents: Vec<Agent>,
    obs: ObsLayout,
    resolver: MovementResolver,
    rng: ChaCha8Rng,
    seed: u64,
    tick: TickId,
    episode_return: f32,
    log: EpisodeLog,
    human_action: Option<Action>,
    aborted: bool,
    last_metrics: StepMetrics,
    // Per-tick scratch.
    actions: Vec<Action>,
    intents: Vec<Intent>,
    goal_distance: Vec<Option<u32>>,
}

impl Warehouse {
    /// Build an instance on the configured preset map and reset it with
    /// `config.seed`.
    pub fn new(config: WarehouseConfig) -> Result<Self, ConfigError> {
        let map = config.map;
        Self::with_map(config, &map)
    }

    /// Build an instance on an arbitrary map source.
    pub fn with_map(config: WarehouseConfig, source: &dyn MapSource) -> Result<Self, ConfigError> {
        config.validate()?;
        let layout = source.load()?;
        config.validate_layout(&layout)?;

        let shelves = ShelfRegistry::new(&layout);
        let seed = config.seed;
        let mut warehouse = Self {
            obs: ObsLayout::new(config.view_radius),
            grid: Grid::new(layout),
            shelves,
            agents: Vec::with_capacity(config.num_agents),
            resolver: MovementResolver::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            tick: TickId::default(),
            episode_return: 0.0,
            log: EpisodeLog::default(),
            human_action: None,
            aborted: false,
            last_metrics: StepMetrics::default(),
            actions: Vec::with_capacity(config.num_agents),
            intents: Vec::with_capacity(config.num_agents),
            goal_distance: Vec::with_capacity(config.num_agents),
            config,
        };
        let start = warehouse.draw_start();
        warehouse
            .apply_start(&start)
            .map_err(ConfigError::InitialReset)?;
        Ok(warehouse)
    }

    // ── Accessors ──────────────────────────────────────────────

    /// The configuration this instance was built with.
    pub fn config(&self) -> &WarehouseConfig {
        &self.config
    }

    /// Occupancy grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Shelf registry.
    pub fn shelves(&self) -> &ShelfRegistry {
        &self.shelves
    }

    /// Agents in id order.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Number of agents.
    pub fn num_agents(&self) -> usize {
        self.agents.len()
    }

    /// Observation shape.
    pub fn obs_layout(&self) -> ObsLayout {
        self.obs
    }

    /// Floats per agent observation.
    pub fn obs_size(&self) -> usize {
        self.obs.size()
    }

    /// Ticks played in the current episode.
    pub fn tick(&self) -> TickId {
        self.tick
    }

    /// Seed of the current episode.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Summed reward of the current episode so far.
    pub fn episode_return(&self) -> f32 {
        self.episode_return
    }

    /// Whether a fatal error is waiting for a reset.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Metrics of the most recent successful step.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }

    /// Accumulated statistics of finished episodes.
    pub fn log(&self) -> &EpisodeLog {
        &self.log
    }

    /// Drain the accumulated episode statistics.
    pub fn take_log(&mut self) -> EpisodeLog {
        self.log.take()
    }

    /// Read-only snapshot for rendering clients.
    pub fn view(&self) -> WarehouseView<'_> {
        WarehouseView::new(self)
    }

    // ── Reset ──────────────────────────────────────────────────

    /// Start a new episode from a start state drawn with `seed`.
    ///
    /// Deterministic: equal seeds give identical episodes for identical
    /// action sequences. Clears an abort; keeps the episode log.
    pub fn reset(&mut self, seed: u64) -> Result<(), WarehouseError> {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.seed = seed;
        let start = self.draw_start();
        self.apply_start(&start)
    }

    /// Start a new episode from an explicit start state.
    ///
    /// The request queue is refilled to the configured size after every
    /// delivery, drawing from the instance's current seed.
    pub fn reset_to(&mut self, start: &StartState) -> Result<(), WarehouseError> {
        self.check_start(start)?;
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.apply_start(start)
    }

    fn draw_start(&mut self) -> StartState {
        StartState::random(
            self.grid.layout(),
            self.config.num_agents,
            self.config.num_requested,
            &mut self.rng,
        )
    }

    fn check_start(&self, start: &StartState) -> Result<(), WarehouseError> {
        let invalid = |reason: String| WarehouseError::InvalidStart { reason };
        if start.agents.len() != self.config.num_agents {
            return Err(invalid(format!(
                "{} placements for {} agents",
                start.agents.len(),
                self.config.num_agents
            )));
        }
        let layout = self.grid.layout();
        for (i, p) in start.agents.iter().enumerate() {
            if !layout.is_walkable(p.position) {
                return Err(invalid(format!("agent {i} placed on unwalkable {}", p.position)));
            }
            if start.agents[..i].iter().any(|q| q.position == p.position) {
                return Err(invalid(format!("two agents placed on {}", p.position)));
            }
        }
        for (i, id) in start.requested.iter().enumerate() {
            if self.shelves.get(*id).is_none() {
                return Err(invalid(format!("unknown shelf {id}")));
            }
            if start.requested[..i].contains(id) {
                return Err(invalid(format!("shelf {id} requested twice")));
            }
        }
        Ok(())
    }

    fn apply_start(&mut self, start: &StartState) -> Result<(), WarehouseError> {
        self.grid.clear();
        self.shelves.reset();
        for shelf in self.shelves.iter() {
            self.grid.park_shelf(shelf.id(), shelf.home())?;
        }
        self.agents.clear();
        for (i, p) in start.agents.iter().enumerate() {
            let id = AgentId(i as u16);
            self.grid.place_agent(id, p.position)?;
            let human = self.config.human_agent == Some(i);
            self.agents.push(Agent::new(id, p.position, p.facing, human));
        }
        for &id in &start.requested {
            self.shelves.request(id)?;
        }
        self.tick = TickId::default();
        self.episode_return = 0.0;
        self.human_action = None;
        self.aborted = false;
        debug!(seed = self.seed, agents = self.agents.len(), "episode reset");
        Ok(())
    }

    // ── Stepping ───────────────────────────────────────────────

    /// Queue an action for the human-controlled agent's next tick.
    ///
    /// It overrides that agent's slot in the action buffer once. Returns
    /// `false` when no agent is human-controlled.
    pub fn set_human_action(&mut self, action: Action) -> bool {
        if self.config.human_agent.is_none() {
            return false;
        }
        self.human_action = Some(action);
        true
    }

    /// Write every agent's observation into `out`
    /// (`num_agents * obs_size` floats, agent-major).
    pub fn observe(&self, out: &mut [f32]) -> Result<(), WarehouseError> {
        let size = self.obs.size();
        check_len("observations", out.len(), self.agents.len() * size)?;
        for (agent, chunk) in self.agents.iter().zip(out.chunks_exact_mut(size)) {
            self.obs.write(chunk, agent, &self.agents, &self.grid, &self.shelves);
        }
        Ok(())
    }

    /// Advance one tick.
    ///
    /// `actions` and `rewards` hold one slot per agent; `observations`
    /// holds `num_agents * obs_size` floats. On return `rewards` holds the
    /// tick's per-agent rewards and `observations` the post-tick
    /// observations (of the fresh episode if this tick ended one).
    pub fn step(
        &mut self,
        actions: &[i32],
        observations: &mut [f32],
        rewards: &mut [f32],
    ) -> Result<StepOutcome, WarehouseError> {
        if self.aborted {
            return Err(WarehouseError::Aborted);
        }
        let started = Instant::now();
        let n = self.agents.len();
        check_len("actions", actions.len(), n)?;
        check_len("rewards", rewards.len(), n)?;
        check_len("observations", observations.len(), n * self.obs.size())?;

        self.actions.clear();
        for (i, &code) in actions.iter().enumerate() {
            let action = Action::try_from(code).map_err(|value| WarehouseError::ActionOutOfRange {
                agent: AgentId(i as u16),
                value,
            })?;
            self.actions.push(action);
        }
        if let (Some(h), Some(action)) = (self.config.human_agent, self.human_action.take()) {
            self.actions[h] = action;
        }

        let mut metrics = match self.advance(rewards) {
            Ok(m) => m,
            Err(e) => {
                self.aborted = true;
                warn!(tick = self.tick.0, error = %e, "instance aborted");
                return Err(e);
            }
        };

        let done = self.is_done();
        if done {
            let record = LogRecord {
                episode_return: self.episode_return,
                episode_length: self.tick.0,
                score: self.shelves.delivered_total() as f32,
            };
            info!(
                episode_return = record.episode_return,
                episode_length = record.episode_length,
                score = record.score,
                "episode finished"
            );
            self.log.push(record);
            let next = self.rng.next_u64();
            if let Err(e) = self.reset(next) {
                self.aborted = true;
                warn!(error = %e, "auto-reset failed");
                return Err(e);
            }
        }
        self.observe(observations)?;

        metrics.total_us = started.elapsed().as_micros() as u64;
        self.last_metrics = metrics.clone();
        Ok(StepOutcome { done, metrics })
    }

    fn is_done(&self) -> bool {
        self.tick.0 >= self.config.max_episode_length
            || self
                .config
                .target_deliveries
                .is_some_and(|t| self.shelves.delivered_total() >= t)
    }

    fn advance(&mut self, rewards: &mut [f32]) -> Result<StepMetrics, WarehouseError> {
        let mut metrics = StepMetrics::default();
        rewards.fill(0.0);

        // Pre-move dispatch.
        self.intents.clear();
        self.goal_distance.clear();
        for i in 0..self.agents.len() {
            let action = self.actions[i];
            self.agents[i].begin_tick(action)?;
            if action == Action::ToggleLoad {
                if let Err(e) = self.toggle_load(i) {
                    if e.is_fatal() {
                        return Err(e);
                    }
                    trace!(agent = i, error = %e, "load refused");
                    metrics.invalid_actions += 1;
                }
            }
            let agent = &self.agents[i];
            let intent = Intent {
                agent: agent.id(),
                from: agent.position(),
                to: agent.target_for(action),
                load_home: agent
                    .carrying()
                    .and_then(|s| self.shelves.get(s))
                    .map(|s| s.home()),
            };
            let distance = self.distance_if_delivering(agent, agent.position());
            self.intents.push(intent);
            self.goal_distance.push(distance);
        }

        // Movement.
        let resolve_started = Instant::now();
        let resolution = self.resolver.resolve(&self.grid, &self.intents)?;
        metrics.resolve_us = resolve_started.elapsed().as_micros() as u64;
        metrics.moves = resolution.moved();
        metrics.blocked_moves = resolution.blocked();
        metrics.num_cycles = resolution.graph.num_cycles;

        let moves: Vec<(AgentId, Coord, Coord)> = self
            .intents
            .iter()
            .zip(&resolution.outcomes)
            .filter(|&(_, &o)| o == MoveOutcome::Moved)
            .map(|(intent, _)| (intent.agent, intent.from, intent.to))
            .collect();
        self.grid.move_agents(&moves)?;

        for i in 0..self.agents.len() {
            let outcome = resolution.outcomes[i];
            let to = resolution.final_cells[i];
            if outcome == MoveOutcome::Moved {
                if let Some(shelf) = self.agents[i].carrying() {
                    self.shelves.move_carried(shelf, to)?;
                }
            }
            self.agents[i].commit_move(outcome, to)?;
            match outcome {
                MoveOutcome::Moved => {
                    let after = self.distance_if_delivering(&self.agents[i], to);
                    rewards[i] += self.config.rewards.progress_for(self.goal_distance[i], after);
                }
                MoveOutcome::Blocked => rewards[i] += self.config.rewards.blocked,
                MoveOutcome::Stayed => {}
            }
        }

        // Deliveries.
        for i in 0..self.agents.len() {
            let agent = &self.agents[i];
            let Some(shelf) = agent.carrying() else {
                continue;
            };
            let on_goal = self.grid.layout().kind(agent.position()) == Some(CellKind::Goal);
            if on_goal && self.shelves.is_requested(shelf) {
                self.deliver(i, shelf)?;
                rewards[i] += self.config.rewards.delivery;
                metrics.deliveries += 1;
            }
        }

        self.tick = self.tick.next();
        self.episode_return += rewards.iter().sum::<f32>();
        debug!(
            tick = self.tick.0,
            moves = metrics.moves,
            blocked = metrics.blocked_moves,
            cycles = metrics.num_cycles,
            deliveries = metrics.deliveries,
            "tick resolved"
        );
        Ok(metrics)
    }

    fn toggle_load(&mut self, i: usize) -> Result<(), WarehouseError> {
        let id = self.agents[i].id();
        let at = self.agents[i].position();
        if self.agents[i].carrying().is_some() {
            let shelf = self.shelves.set_down(id, at)?;
            self.grid.park_shelf(shelf, at)?;
            self.agents[i].set_down()?;
        } else {
            let shelf = self
                .grid
                .parked_shelf_at(at)
                .ok_or(WarehouseError::InvalidPickup {
                    agent: id,
                    reason: PickupFailure::NoShelfHere,
                })?;
            self.shelves.pick_up(shelf, id, at)?;
            self.grid.unpark_shelf(at);
            self.agents[i].pick_up(shelf)?;
        }
        Ok(())
    }

    fn deliver(&mut self, i: usize, shelf: ShelfId) -> Result<(), WarehouseError> {
        let home = self.shelves.mark_delivered(shelf)?;
        self.grid.park_shelf(shelf, home)?;
        self.agents[i].deliver(home)?;
        while self.shelves.requested_len() < self.config.num_requested {
            if self.shelves.request_random(&mut self.rng).is_none() {
                break;
            }
        }
        trace!(agent = i, shelf = shelf.0, "delivered");
        Ok(())
    }

    fn distance_if_delivering(&self, agent: &Agent, at: Coord) -> Option<u32> {
        let shelf = agent.carrying()?;
        if !self.shelves.is_requested(shelf) {
            return None;
        }
        nearest(at, self.grid.layout().goals().iter().copied()).map(|g| at.manhattan(g))
    }
}

fn check_len(buffer: &'static str, actual: usize, expected: usize) -> Result<(), WarehouseError> {
    if actual == expected {
        Ok(())
    } else {
        Err(WarehouseError::BufferSize {
            buffer,
            expected,
            actual,
        })
    }
}
