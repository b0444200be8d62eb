//! Flat per-agent observation encoding.
//!
//! Each agent's observation is a fixed-length `f32` vector made of three
//! blocks:
//!
//! | block  | floats                 | contents                                   |
//! |--------|------------------------|--------------------------------------------|
//! | self   | [`SELF_FEATURES`]      | position, facing, load and state flags     |
//! | view   | `(2r+1)^2` x [`CELL_FEATURES`] | egocentric window around the agent |
//! | target | [`TARGET_FEATURES`]    | offsets to the nearest goal and request    |
//!
//! Cells outside the layout read as walls. Values are roughly in
//! `[-1, 1]`.

use depot_core::Coord;
use depot_grid::CellKind;

use crate::agent::{Agent, AgentState};
use crate::grid::Grid;
use crate::movement::MoveOutcome;
use crate::shelf::ShelfRegistry;

/// Floats in the self block.
pub const SELF_FEATURES: usize = 11;
/// Floats per cell of the view window.
pub const CELL_FEATURES: usize = 6;
/// Floats in the target block.
pub const TARGET_FEATURES: usize = 4;

/// Shape of one agent's observation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObsLayout {
    view_radius: u32,
}

impl ObsLayout {
    /// Layout for a square view window of the given radius.
    pub fn new(view_radius: u32) -> Self {
        Self { view_radius }
    }

    /// View radius in cells.
    pub fn view_radius(&self) -> u32 {
        self.view_radius
    }

    /// Side length of the view window.
    pub fn view_side(&self) -> usize {
        2 * self.view_radius as usize + 1
    }

    /// Offset of the view block.
    pub fn view_offset(&self) -> usize {
        SELF_FEATURES
    }

    /// Offset of the target block.
    pub fn target_offset(&self) -> usize {
        SELF_FEATURES + self.view_side() * self.view_side() * CELL_FEATURES
    }

    /// Floats per agent.
    pub fn size(&self) -> usize {
        self.target_offset() + TARGET_FEATURES
    }

    /// Encode `agent`'s observation into `out` (`out.len() == self.size()`).
    pub(crate) fn write(
        &self,
        out: &mut [f32],
        agent: &Agent,
        agents: &[Agent],
        grid: &Grid,
        shelves: &ShelfRegistry,
    ) {
        debug_assert_eq!(out.len(), self.size());
        out.fill(0.0);
        let layout = grid.layout();
        let w = layout.width() as f32;
        let h = layout.height() as f32;
        let pos = agent.position();
        let carrying_requested = agent
            .carrying()
            .is_some_and(|s| shelves.is_requested(s));

        // Self block.
        out[0] = pos.x as f32 / w;
        out[1] = pos.y as f32 / h;
        out[2 + agent.facing().index()] = 1.0;
        out[6] = flag(agent.carrying().is_some());
        out[7] = flag(carrying_requested);
        out[8] = flag(agent.last_move() == MoveOutcome::Blocked);
        out[9] = agent.state().index() as f32 / AgentState::Returning.index() as f32;
        out[10] = flag(agent.is_human_controlled());

        // View block, row-major from the north-west corner.
        let r = self.view_radius as i32;
        let view = &mut out[self.view_offset()..self.target_offset()];
        for (slot, cell) in view.chunks_exact_mut(CELL_FEATURES).enumerate() {
            let dx = (slot % self.view_side()) as i32 - r;
            let dy = (slot / self.view_side()) as i32 - r;
            let c = Coord::new(pos.x + dx, pos.y + dy);
            let Some(kind) = layout.kind(c) else {
                cell[5] = 1.0;
                continue;
            };
            if let Some(other) = grid.occupant_at(c) {
                cell[0] = 1.0;
                cell[1] = agents[other.index()].facing().index() as f32 / 3.0;
                if let Some(s) = agents[other.index()].carrying() {
                    cell[2] = 1.0;
                    cell[3] = flag(shelves.is_requested(s));
                }
            }
            if let Some(s) = grid.parked_shelf_at(c) {
                cell[2] = 1.0;
                cell[3] = flag(shelves.is_requested(s));
            }
            cell[4] = flag(kind == CellKind::Goal);
            cell[5] = flag(kind == CellKind::Wall);
        }

        // Target block.
        let target = &mut out[self.target_offset()..];
        if let Some(goal) = nearest(pos, layout.goals().iter().copied()) {
            target[0] = (goal.x - pos.x) as f32 / w;
            target[1] = (goal.y - pos.y) as f32 / h;
        }
        let requested_parked = shelves
            .requested_ids()
            .filter_map(|id| shelves.get(id))
            .filter(|s| s.is_parked())
            .map(|s| s.location());
        if let Some(shelf) = nearest(pos, requested_parked) {
            target[2] = (shelf.x - pos.x) as f32 / w;
            target[3] = (shelf.y - pos.y) as f32 / h;
        }
    }
}

fn flag(b: bool) -> f32 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Closest cell to `from` by Manhattan distance; the first wins ties.
pub(crate) fn nearest(from: Coord, cells: impl Iterator<Item = Coord>) -> Option<Coord> {
    cells.min_by_key(|c| from.manhattan(*c))
}
