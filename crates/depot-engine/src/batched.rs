//! Batched warehouse engine for vectorized RL training.
//!
//! [`BatchedEngine`] owns N [`Warehouse`] instances and steps them all in
//! a single call against flat host buffers. Each instance sees only its
//! own contiguous slice of every buffer, so instances step independently
//! and, when a thread pool is configured, in parallel.
//!
//! # Determinism
//!
//! Instance `i` is seeded with `config.seed + i` and owns its RNG stream.
//! Results are therefore identical whether the batch steps sequentially
//! or on any number of threads.

use depot_core::WarehouseError;
use depot_sim::{
    ConfigError, EpisodeLog, LogSummary, StepMetrics, StepOutcome, Warehouse, WarehouseConfig,
};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use thiserror::Error;
use tracing::{debug, warn};

use crate::buffers::BatchBuffers;

// ── Error type ──────────────────────────────────────────────────

/// Error from a batched operation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BatchError {
    /// An instance's step failed. Fatal engine errors leave that instance
    /// aborted until reset; malformed actions do not.
    #[error("world {world_index}: step failed: {source}")]
    Step {
        /// Index of the failing instance.
        world_index: usize,
        /// The underlying error.
        #[source]
        source: WarehouseError,
    },
    /// An instance's reset failed.
    #[error("world {world_index}: reset failed: {source}")]
    Reset {
        /// Index of the failing instance.
        world_index: usize,
        /// The underlying error.
        #[source]
        source: WarehouseError,
    },
    /// Instance construction failed.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// Instance index out of bounds.
    #[error("world index {world_index} out of range (num_worlds={num_worlds})")]
    InvalidIndex {
        /// The requested index.
        world_index: usize,
        /// Total number of instances.
        num_worlds: usize,
    },
    /// Batch-level argument validation failed.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What is wrong.
        reason: String,
    },
    /// The worker pool could not be built.
    #[error("thread pool: {reason}")]
    ThreadPool {
        /// Builder error message.
        reason: String,
    },
}

// ── Result type ─────────────────────────────────────────────────

/// Result of stepping a batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// Instances whose episode ended this step.
    pub episodes_finished: usize,
    /// Per-instance step metrics.
    pub metrics: Vec<StepMetrics>,
}

// ── BatchedEngine ───────────────────────────────────────────────

/// Batched engine owning N warehouse instances.
///
/// All instances share one configuration (and so one agent count and
/// observation size). The primary interface is [`step()`](Self::step).
#[derive(Debug)]
pub struct BatchedEngine {
    worlds: Vec<Warehouse>,
    seeds: Vec<u64>,
    pool: Option<ThreadPool>,
    num_agents: usize,
    obs_size: usize,
}

impl BatchedEngine {
    /// Create `num_envs` instances of `config`; instance `i` uses seed
    /// `config.seed + i`.
    ///
    /// `num_threads: Some(n)` steps instances on a dedicated rayon pool of
    /// `n` threads; `None` steps them sequentially on the caller's thread.
    ///
    /// # Errors
    ///
    /// [`BatchError::InvalidArgument`] for zero instances or zero threads,
    /// [`BatchError::Config`] if the configuration is rejected, and
    /// [`BatchError::ThreadPool`] if the pool cannot be built.
    pub fn new(
        config: WarehouseConfig,
        num_envs: usize,
        num_threads: Option<usize>,
    ) -> Result<Self, BatchError> {
        if num_envs == 0 {
            return Err(BatchError::InvalidArgument {
                reason: "BatchedEngine requires at least one instance".into(),
            });
        }
        let seeds: Vec<u64> = (0..num_envs as u64)
            .map(|i| config.seed.wrapping_add(i))
            .collect();
        let worlds = seeds
            .iter()
            .map(|&seed| {
                Warehouse::new(WarehouseConfig {
                    seed,
                    ..config.clone()
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_worlds(worlds, num_threads)
    }

    /// Wrap pre-built instances (for example on custom maps).
    ///
    /// All instances must have the same agent count and observation size.
    /// Their current seeds become the seeds used by [`reset()`](Self::reset).
    pub fn from_worlds(
        worlds: Vec<Warehouse>,
        num_threads: Option<usize>,
    ) -> Result<Self, BatchError> {
        let Some(first) = worlds.first() else {
            return Err(BatchError::InvalidArgument {
                reason: "BatchedEngine requires at least one instance".into(),
            });
        };
        let num_agents = first.num_agents();
        let obs_size = first.obs_size();
        for (i, w) in worlds.iter().enumerate().skip(1) {
            if w.num_agents() != num_agents || w.obs_size() != obs_size {
                return Err(BatchError::InvalidArgument {
                    reason: format!(
                        "world {i} has {} agents x {} obs, world 0 has {num_agents} x {obs_size}",
                        w.num_agents(),
                        w.obs_size()
                    ),
                });
            }
        }
        let pool = match num_threads {
            None => None,
            Some(0) => {
                return Err(BatchError::InvalidArgument {
                    reason: "num_threads must be > 0".into(),
                })
            }
            Some(n) => Some(
                ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| BatchError::ThreadPool {
                        reason: e.to_string(),
                    })?,
            ),
        };
        let seeds = worlds.iter().map(Warehouse::seed).collect();
        debug!(
            num_envs = worlds.len(),
            num_agents,
            obs_size,
            threads = num_threads.unwrap_or(1),
            "batched engine ready"
        );
        Ok(Self {
            worlds,
            seeds,
            pool,
            num_agents,
            obs_size,
        })
    }

    // ── Reset ─────────────────────────────────────────────────

    /// Reset every instance to its base seed and write initial
    /// observations. Rewards and done flags are zeroed.
    ///
    /// Idempotent: two calls produce identical buffers. Episode logs are
    /// kept.
    pub fn reset(&mut self, buffers: &mut BatchBuffers<'_>) -> Result<(), BatchError> {
        buffers.check(self.worlds.len(), self.num_agents, self.obs_size)?;
        let obs_chunk = self.num_agents * self.obs_size;
        for (i, (world, obs)) in self
            .worlds
            .iter_mut()
            .zip(buffers.observations.chunks_exact_mut(obs_chunk))
            .enumerate()
        {
            let reset = world.reset(self.seeds[i]).and_then(|()| world.observe(obs));
            reset.map_err(|source| BatchError::Reset {
                world_index: i,
                source,
            })?;
        }
        buffers.rewards.fill(0.0);
        buffers.dones.fill(0);
        Ok(())
    }

    /// Reset one instance with an explicit seed.
    ///
    /// The seed also becomes that instance's base seed for later
    /// [`reset()`](Self::reset) calls.
    pub fn reset_world(&mut self, idx: usize, seed: u64) -> Result<(), BatchError> {
        let n = self.worlds.len();
        let world = self.worlds.get_mut(idx).ok_or(BatchError::InvalidIndex {
            world_index: idx,
            num_worlds: n,
        })?;
        world.reset(seed).map_err(|source| BatchError::Reset {
            world_index: idx,
            source,
        })?;
        self.seeds[idx] = seed;
        Ok(())
    }

    // ── Step ──────────────────────────────────────────────────

    /// Step every instance once.
    ///
    /// Reads `buffers.actions`; writes observations, rewards, and done
    /// flags. Instances that finish an episode auto-reset, so their
    /// observations already belong to the next episode.
    ///
    /// # Errors
    ///
    /// Buffer shape mismatches fail before any instance steps. If an
    /// instance fails, the others have still stepped; the lowest failing
    /// index is reported.
    pub fn step(&mut self, buffers: &mut BatchBuffers<'_>) -> Result<BatchResult, BatchError> {
        buffers.check(self.worlds.len(), self.num_agents, self.obs_size)?;
        let obs_chunk = self.num_agents * self.obs_size;
        let agents = self.num_agents;
        let worlds = &mut self.worlds;

        let outcomes: Vec<Result<StepOutcome, WarehouseError>> = match &self.pool {
            Some(pool) => pool.install(|| {
                worlds
                    .par_iter_mut()
                    .zip(buffers.observations.par_chunks_exact_mut(obs_chunk))
                    .zip(buffers.actions.par_chunks_exact(agents))
                    .zip(buffers.rewards.par_chunks_exact_mut(agents))
                    .map(|(((world, obs), actions), rewards)| world.step(actions, obs, rewards))
                    .collect()
            }),
            None => worlds
                .iter_mut()
                .zip(buffers.observations.chunks_exact_mut(obs_chunk))
                .zip(buffers.actions.chunks_exact(agents))
                .zip(buffers.rewards.chunks_exact_mut(agents))
                .map(|(((world, obs), actions), rewards)| world.step(actions, obs, rewards))
                .collect(),
        };

        let mut result = BatchResult {
            episodes_finished: 0,
            metrics: Vec::with_capacity(outcomes.len()),
        };
        let mut first_error = None;
        for (i, (outcome, done)) in outcomes.into_iter().zip(buffers.dones.iter_mut()).enumerate() {
            match outcome {
                Ok(StepOutcome { done: finished, metrics }) => {
                    *done = u8::from(finished);
                    result.episodes_finished += usize::from(finished);
                    result.metrics.push(metrics);
                }
                Err(source) => {
                    *done = 0;
                    result.metrics.push(StepMetrics::default());
                    warn!(world_index = i, error = %source, "instance step failed");
                    first_error.get_or_insert(BatchError::Step {
                        world_index: i,
                        source,
                    });
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(result),
        }
    }

    // ── Logging ───────────────────────────────────────────────

    /// Drain every instance's episode log and return the means.
    ///
    /// All zeros (with `n == 0`) when no episode finished since the last
    /// drain.
    pub fn aggregate_and_clear(&mut self) -> LogSummary {
        let mut total = EpisodeLog::default();
        for world in &mut self.worlds {
            total.merge(&world.take_log());
        }
        total.summary()
    }

    /// Drain the logs one last time and release every instance.
    pub fn shutdown(mut self) -> LogSummary {
        let summary = self.aggregate_and_clear();
        debug!(episodes = summary.n, "batched engine shut down");
        summary
    }

    // ── Accessors ─────────────────────────────────────────────

    /// Number of instances.
    pub fn num_envs(&self) -> usize {
        self.worlds.len()
    }

    /// Agents per instance.
    pub fn num_agents(&self) -> usize {
        self.num_agents
    }

    /// Observation floats per agent.
    pub fn obs_size(&self) -> usize {
        self.obs_size
    }

    /// Whether instances step on a thread pool.
    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    /// One instance, for inspection.
    pub fn world(&self, idx: usize) -> Option<&Warehouse> {
        self.worlds.get(idx)
    }

    /// Base seed of one instance.
    pub fn seed(&self, idx: usize) -> Option<u64> {
        self.seeds.get(idx).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffers::OwnedBuffers;
    use depot_core::{Action, TickId};

    fn config() -> WarehouseConfig {
        WarehouseConfig {
            num_agents: 3,
            max_episode_length: 4,
            seed: 100,
            ..Default::default()
        }
    }

    #[test]
    fn instances_get_consecutive_seeds() {
        let engine = BatchedEngine::new(config(), 3, None).unwrap();
        assert_eq!(engine.num_envs(), 3);
        assert_eq!(engine.num_agents(), 3);
        assert_eq!(engine.obs_size(), 69);
        assert_eq!(
            (0..3).map(|i| engine.seed(i).unwrap()).collect::<Vec<_>>(),
            vec![100, 101, 102]
        );
        assert!(!engine.is_parallel());
    }

    #[test]
    fn rejects_empty_batches_and_zero_threads() {
        assert!(matches!(
            BatchedEngine::new(config(), 0, None),
            Err(BatchError::InvalidArgument { .. })
        ));
        assert!(matches!(
            BatchedEngine::new(config(), 2, Some(0)),
            Err(BatchError::InvalidArgument { .. })
        ));
        let bad = WarehouseConfig {
            num_agents: 0,
            ..config()
        };
        assert_eq!(
            BatchedEngine::new(bad, 2, None).unwrap_err(),
            BatchError::Config(ConfigError::NoAgents)
        );
    }

    #[test]
    fn step_checks_buffer_shapes() {
        let mut engine = BatchedEngine::new(config(), 2, None).unwrap();
        let mut buffers = OwnedBuffers::for_engine(&engine);
        buffers.dones.pop();
        let err = engine.step(&mut buffers.view()).unwrap_err();
        assert!(matches!(err, BatchError::InvalidArgument { .. }));
        assert_eq!(engine.world(0).unwrap().tick(), TickId(0));
    }

    #[test]
    fn dones_and_logs_follow_episode_cap() {
        let mut engine = BatchedEngine::new(config(), 2, None).unwrap();
        let mut buffers = OwnedBuffers::for_engine(&engine);
        engine.reset(&mut buffers.view()).unwrap();
        for _ in 0..3 {
            let r = engine.step(&mut buffers.view()).unwrap();
            assert_eq!(r.episodes_finished, 0);
            assert_eq!(buffers.dones, vec![0, 0]);
        }
        let r = engine.step(&mut buffers.view()).unwrap();
        assert_eq!(r.episodes_finished, 2);
        assert_eq!(buffers.dones, vec![1, 1]);

        let summary = engine.aggregate_and_clear();
        assert_eq!(summary.n, 2);
        assert_eq!(summary.episode_length, 4.0);
        assert_eq!(engine.aggregate_and_clear(), LogSummary::default());
    }

    #[test]
    fn bad_action_is_rejected_without_aborting() {
        let mut engine = BatchedEngine::new(config(), 2, None).unwrap();
        let mut buffers = OwnedBuffers::for_engine(&engine);
        buffers.actions[4] = 9;
        let err = engine.step(&mut buffers.view()).unwrap_err();
        assert!(matches!(
            err,
            BatchError::Step {
                world_index: 1,
                source: WarehouseError::ActionOutOfRange { value: 9, .. }
            }
        ));
        // Instance 0 still stepped; instance 1 refused the tick but is intact.
        assert_eq!(engine.world(0).unwrap().tick(), TickId(1));
        assert_eq!(engine.world(1).unwrap().tick(), TickId(0));
        assert!(!engine.world(1).unwrap().is_aborted());

        buffers.actions[4] = Action::NoOp.code();
        engine.step(&mut buffers.view()).unwrap();
        assert_eq!(engine.world(1).unwrap().tick(), TickId(1));

        engine.reset_world(1, 7).unwrap();
        engine.step(&mut buffers.view()).unwrap();
        assert_eq!(engine.seed(1), Some(7));
    }

    #[test]
    fn reset_world_checks_index() {
        let mut engine = BatchedEngine::new(config(), 2, None).unwrap();
        assert_eq!(
            engine.reset_world(2, 0).unwrap_err(),
            BatchError::InvalidIndex {
                world_index: 2,
                num_worlds: 2
            }
        );
    }
}
