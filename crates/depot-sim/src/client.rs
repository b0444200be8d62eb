//! The rendering / human-input seam.
//!
//! Drawing and keyboard handling are host concerns. A [`Client`] receives
//! a [`WarehouseView`] after every tick and may supply the next action
//! for the human-controlled agent; [`Interactive`] wires one to a
//! [`Warehouse`].

use depot_core::{Action, WarehouseError};

use crate::view::WarehouseView;
use crate::warehouse::{StepOutcome, Warehouse};

/// A renderer and optional human input source.
pub trait Client {
    /// Draw the state after a tick (or after reset).
    fn render(&mut self, view: &WarehouseView<'_>);

    /// The human agent's next action, if one is pending.
    fn human_action(&mut self) -> Option<Action> {
        None
    }
}

/// A warehouse driven alongside a [`Client`].
///
/// Owns the observation and reward buffers so callers only supply
/// actions.
#[derive(Debug)]
pub struct Interactive<C> {
    warehouse: Warehouse,
    client: C,
    observations: Vec<f32>,
    rewards: Vec<f32>,
}

impl<C: Client> Interactive<C> {
    /// Pair `warehouse` with `client` and render the initial state.
    pub fn new(warehouse: Warehouse, mut client: C) -> Self {
        client.render(&warehouse.view());
        let observations = vec![0.0; warehouse.num_agents() * warehouse.obs_size()];
        let rewards = vec![0.0; warehouse.num_agents()];
        Self {
            warehouse,
            client,
            observations,
            rewards,
        }
    }

    /// Poll the client for human input, step, and render.
    pub fn tick(&mut self, actions: &[i32]) -> Result<StepOutcome, WarehouseError> {
        if let Some(action) = self.client.human_action() {
            self.warehouse.set_human_action(action);
        }
        let outcome = self
            .warehouse
            .step(actions, &mut self.observations, &mut self.rewards)?;
        self.client.render(&self.warehouse.view());
        Ok(outcome)
    }

    /// The driven instance.
    pub fn warehouse(&self) -> &Warehouse {
        &self.warehouse
    }

    /// The client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Observations written by the last tick.
    pub fn observations(&self) -> &[f32] {
        &self.observations
    }

    /// Rewards written by the last tick.
    pub fn rewards(&self) -> &[f32] {
        &self.rewards
    }

    /// Split back into the instance and the client.
    pub fn into_parts(self) -> (Warehouse, C) {
        (self.warehouse, self.client)
    }
}
