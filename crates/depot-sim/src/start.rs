//! Episode start states.
//!
//! A [`StartState`] fixes where every agent begins, which way it faces,
//! and which shelves are requested. Resets draw one at random from the
//! instance's RNG; tests and scripted scenarios pass one explicitly to
//! [`Warehouse::reset_to`](crate::Warehouse::reset_to).

use depot_core::{Coord, Direction, ShelfId};
use depot_grid::{CellKind, Layout};
use rand::seq::index::sample;
use rand::Rng;

/// Initial pose of one agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentPlacement {
    /// Starting cell.
    pub position: Coord,
    /// Starting facing.
    pub facing: Direction,
}

impl AgentPlacement {
    /// Place an agent at `(x, y)` facing `facing`.
    pub fn new(x: i32, y: i32, facing: Direction) -> Self {
        Self {
            position: Coord::new(x, y),
            facing,
        }
    }
}

/// Full description of an episode's first tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StartState {
    /// One placement per agent, in agent-id order.
    pub agents: Vec<AgentPlacement>,
    /// Shelves requested at the start, oldest first.
    pub requested: Vec<ShelfId>,
}

impl StartState {
    /// Draw a start state: distinct agent cells from the walkable
    /// non-goal cells, random facings, and distinct requested shelves.
    ///
    /// The caller guarantees the counts fit (see
    /// [`WarehouseConfig::validate_layout`](crate::WarehouseConfig::validate_layout));
    /// excess counts are clamped.
    pub fn random<R: Rng + ?Sized>(
        layout: &Layout,
        num_agents: usize,
        num_requested: usize,
        rng: &mut R,
    ) -> Self {
        let cells: Vec<Coord> = start_cells(layout).collect();
        let agents = sample(rng, cells.len(), num_agents.min(cells.len()))
            .into_iter()
            .map(|i| AgentPlacement {
                position: cells[i],
                facing: Direction::from_index(rng.random_range(0..4)),
            })
            .collect();
        let shelves = layout.storage().len();
        let requested = sample(rng, shelves, num_requested.min(shelves))
            .into_iter()
            .map(|i| ShelfId(i as u32))
            .collect();
        Self { agents, requested }
    }
}

/// Cells an agent may start on: walkable and not a goal.
pub(crate) fn start_cells(layout: &Layout) -> impl Iterator<Item = Coord> + '_ {
    layout
        .cells()
        .iter()
        .enumerate()
        .filter(|(_, k)| k.is_walkable() && **k != CellKind::Goal)
        .map(|(i, _)| layout.coord_of(i))
}
