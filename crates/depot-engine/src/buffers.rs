//! Flat step buffers shared with the host.
//!
//! All buffers are instance-major then agent-major: instance `i`, agent
//! `a` owns action slot `i * num_agents + a`, and its observation starts
//! at `(i * num_agents + a) * obs_size`.

use crate::batched::{BatchError, BatchedEngine};

/// Borrowed views of the host's step buffers.
#[derive(Debug)]
pub struct BatchBuffers<'a> {
    /// `num_envs * num_agents * obs_size` floats, written by the engine.
    pub observations: &'a mut [f32],
    /// `num_envs * num_agents` action codes, read by the engine.
    pub actions: &'a [i32],
    /// `num_envs * num_agents` rewards, written by the engine.
    pub rewards: &'a mut [f32],
    /// `num_envs` episode-end flags (0 or 1), written by the engine.
    pub dones: &'a mut [u8],
}

impl BatchBuffers<'_> {
    pub(crate) fn check(
        &self,
        num_envs: usize,
        num_agents: usize,
        obs_size: usize,
    ) -> Result<(), BatchError> {
        let slots = num_envs * num_agents;
        for (name, actual, expected) in [
            ("observations", self.observations.len(), slots * obs_size),
            ("actions", self.actions.len(), slots),
            ("rewards", self.rewards.len(), slots),
            ("dones", self.dones.len(), num_envs),
        ] {
            if actual != expected {
                return Err(BatchError::InvalidArgument {
                    reason: format!("{name} buffer has {actual} elements, expected {expected}"),
                });
            }
        }
        Ok(())
    }
}

/// Owned buffers sized for one engine (Rust-side convenience).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OwnedBuffers {
    /// Observation floats.
    pub observations: Vec<f32>,
    /// Action codes.
    pub actions: Vec<i32>,
    /// Rewards.
    pub rewards: Vec<f32>,
    /// Episode-end flags.
    pub dones: Vec<u8>,
}

impl OwnedBuffers {
    /// Zeroed buffers matching `engine`'s shape.
    pub fn for_engine(engine: &BatchedEngine) -> Self {
        let slots = engine.num_envs() * engine.num_agents();
        Self {
            observations: vec![0.0; slots * engine.obs_size()],
            actions: vec![0; slots],
            rewards: vec![0.0; slots],
            dones: vec![0; engine.num_envs()],
        }
    }

    /// Borrow as [`BatchBuffers`].
    pub fn view(&mut self) -> BatchBuffers<'_> {
        BatchBuffers {
            observations: &mut self.observations,
            actions: &self.actions,
            rewards: &mut self.rewards,
            dones: &mut self.dones,
        }
    }
}
