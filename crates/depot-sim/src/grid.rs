//! Dynamic occupancy over a static [`Layout`].
//!
//! The grid owns the layout plus two occupancy planes: which agent
//! stands on each cell and which shelf is parked on it. Carried shelves
//! are not parked; they live in the [`ShelfRegistry`](crate::ShelfRegistry)
//! and travel with their agent.
//!
//! Public queries take raw `(x, y)` pairs and report
//! [`WarehouseError::OutOfBounds`] for cells outside the layout. Mutation
//! is crate-private: only the tick orchestrator commits occupancy
//! changes.

use depot_core::{AgentId, Coord, ShelfId, WarehouseError};
use depot_grid::{CellKind, Layout};

/// Occupancy state of one warehouse floor.
#[derive(Clone, Debug)]
pub struct Grid {
    layout: Layout,
    agents: Vec<Option<AgentId>>,
    shelves: Vec<Option<ShelfId>>,
    agent_count: usize,
}

impl Grid {
    /// An empty grid over `layout`.
    pub fn new(layout: Layout) -> Self {
        let n = layout.cell_count();
        Self {
            layout,
            agents: vec![None; n],
            shelves: vec![None; n],
            agent_count: 0,
        }
    }

    /// The static layout.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Number of columns.
    pub fn width(&self) -> u32 {
        self.layout.width()
    }

    /// Number of rows.
    pub fn height(&self) -> u32 {
        self.layout.height()
    }

    /// Number of agents currently placed.
    pub fn agent_count(&self) -> usize {
        self.agent_count
    }

    fn checked_index(&self, x: i32, y: i32) -> Result<usize, WarehouseError> {
        let coord = Coord::new(x, y);
        self.layout
            .index(coord)
            .ok_or(WarehouseError::OutOfBounds {
                coord,
                width: self.layout.width(),
                height: self.layout.height(),
            })
    }

    /// Kind of the cell at `(x, y)`.
    pub fn cell_kind(&self, x: i32, y: i32) -> Result<CellKind, WarehouseError> {
        let i = self.checked_index(x, y)?;
        Ok(self.layout.cells()[i])
    }

    /// Whether an agent stands at `(x, y)`.
    pub fn is_occupied(&self, x: i32, y: i32) -> Result<bool, WarehouseError> {
        Ok(self.occupant(x, y)?.is_some())
    }

    /// The agent standing at `(x, y)`, if any.
    pub fn occupant(&self, x: i32, y: i32) -> Result<Option<AgentId>, WarehouseError> {
        let i = self.checked_index(x, y)?;
        Ok(self.agents[i])
    }

    /// The shelf parked at `(x, y)`, if any. Carried shelves are not reported.
    pub fn shelf_at(&self, x: i32, y: i32) -> Result<Option<ShelfId>, WarehouseError> {
        let i = self.checked_index(x, y)?;
        Ok(self.shelves[i])
    }

    /// Agent at `coord`; `None` for empty or out-of-bounds cells.
    pub fn occupant_at(&self, coord: Coord) -> Option<AgentId> {
        self.layout.index(coord).and_then(|i| self.agents[i])
    }

    /// Parked shelf at `coord`; `None` for bare or out-of-bounds cells.
    pub fn parked_shelf_at(&self, coord: Coord) -> Option<ShelfId> {
        self.layout.index(coord).and_then(|i| self.shelves[i])
    }

    // ── Crate-private mutation ──────────────────────────────────

    pub(crate) fn clear(&mut self) {
        self.agents.fill(None);
        self.shelves.fill(None);
        self.agent_count = 0;
    }

    fn walkable_index(&self, coord: Coord) -> Result<usize, WarehouseError> {
        match self.layout.index(coord) {
            Some(i) if self.layout.cells()[i].is_walkable() => Ok(i),
            Some(_) => Err(WarehouseError::invariant(format!(
                "cell {coord} is a wall"
            ))),
            None => Err(WarehouseError::OutOfBounds {
                coord,
                width: self.layout.width(),
                height: self.layout.height(),
            }),
        }
    }

    pub(crate) fn place_agent(&mut self, agent: AgentId, at: Coord) -> Result<(), WarehouseError> {
        let i = self.walkable_index(at)?;
        if let Some(other) = self.agents[i] {
            return Err(WarehouseError::invariant(format!(
                "agent {agent} placed on {at}, already held by agent {other}"
            )));
        }
        self.agents[i] = Some(agent);
        self.agent_count += 1;
        Ok(())
    }

    /// Apply a batch of simultaneous moves `(agent, from, to)`.
    ///
    /// All sources are vacated before any destination is claimed, so
    /// rotations and swaps commit in one pass. Fails without partial
    /// effects if a source does not hold its agent or a destination is
    /// taken by an agent that is not moving away.
    pub(crate) fn move_agents(
        &mut self,
        moves: &[(AgentId, Coord, Coord)],
    ) -> Result<(), WarehouseError> {
        for &(agent, from, _) in moves {
            if self.occupant_at(from) != Some(agent) {
                return Err(WarehouseError::invariant(format!(
                    "agent {agent} is not at {from}"
                )));
            }
        }
        for &(_, from, _) in moves {
            let i = self.walkable_index(from)?;
            self.agents[i] = None;
        }
        for (n, &(agent, _, to)) in moves.iter().enumerate() {
            let claimed = self
                .walkable_index(to)
                .and_then(|i| match self.agents[i] {
                    Some(other) => Err(WarehouseError::invariant(format!(
                        "agent {agent} moved onto {to}, held by agent {other}"
                    ))),
                    None => Ok(i),
                });
            match claimed {
                Ok(i) => self.agents[i] = Some(agent),
                Err(e) => {
                    // Roll back so the grid stays consistent for diagnostics.
                    for &(a, _, t) in &moves[..n] {
                        if let Some(i) = self.layout.index(t) {
                            if self.agents[i] == Some(a) {
                                self.agents[i] = None;
                            }
                        }
                    }
                    for &(a, f, _) in moves {
                        if let Some(i) = self.layout.index(f) {
                            self.agents[i] = Some(a);
                        }
                    }
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    pub(crate) fn park_shelf(&mut self, shelf: ShelfId, at: Coord) -> Result<(), WarehouseError> {
        let i = self.walkable_index(at)?;
        if let Some(other) = self.shelves[i] {
            return Err(WarehouseError::invariant(format!(
                "shelf {shelf} parked on {at}, already holding shelf {other}"
            )));
        }
        self.shelves[i] = Some(shelf);
        Ok(())
    }

    pub(crate) fn unpark_shelf(&mut self, at: Coord) -> Option<ShelfId> {
        let i = self.layout.index(at)?;
        self.shelves[i].take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(text: &str) -> Grid {
        Grid::new(Layout::parse(text).unwrap())
    }

    #[test]
    fn queries_report_out_of_bounds() {
        let g = grid("x..\n..g");
        assert_eq!(g.cell_kind(0, 0).unwrap(), CellKind::ShelfStorage);
        assert_eq!(g.cell_kind(2, 1).unwrap(), CellKind::Goal);
        for (x, y) in [(-1, 0), (3, 0), (0, 2), (0, -5)] {
            assert!(matches!(
                g.cell_kind(x, y),
                Err(WarehouseError::OutOfBounds { width: 3, height: 2, .. })
            ));
            assert!(g.occupant(x, y).is_err());
            assert!(g.shelf_at(x, y).is_err());
            assert!(g.is_occupied(x, y).is_err());
        }
    }

    #[test]
    fn place_and_query_agents() {
        let mut g = grid("x..\n..g");
        g.place_agent(AgentId(0), Coord::new(1, 0)).unwrap();
        assert!(g.is_occupied(1, 0).unwrap());
        assert_eq!(g.occupant(1, 0).unwrap(), Some(AgentId(0)));
        assert_eq!(g.agent_count(), 1);
        let err = g.place_agent(AgentId(1), Coord::new(1, 0)).unwrap_err();
        assert!(matches!(err, WarehouseError::InvariantViolation { .. }));
    }

    #[test]
    fn walls_reject_agents() {
        let mut g = grid("x#g");
        assert!(g.place_agent(AgentId(0), Coord::new(1, 0)).is_err());
        assert_eq!(g.agent_count(), 0);
    }

    #[test]
    fn move_agents_supports_swaps() {
        let mut g = grid("x..\n..g");
        let a = Coord::new(0, 1);
        let b = Coord::new(1, 1);
        g.place_agent(AgentId(0), a).unwrap();
        g.place_agent(AgentId(1), b).unwrap();
        g.move_agents(&[(AgentId(0), a, b), (AgentId(1), b, a)]).unwrap();
        assert_eq!(g.occupant_at(a), Some(AgentId(1)));
        assert_eq!(g.occupant_at(b), Some(AgentId(0)));
        assert_eq!(g.agent_count(), 2);
    }

    #[test]
    fn move_onto_stationary_agent_rolls_back() {
        let mut g = grid("x..\n..g");
        let a = Coord::new(0, 1);
        let b = Coord::new(1, 1);
        g.place_agent(AgentId(0), a).unwrap();
        g.place_agent(AgentId(1), b).unwrap();
        assert!(g.move_agents(&[(AgentId(0), a, b)]).is_err());
        assert_eq!(g.occupant_at(a), Some(AgentId(0)));
        assert_eq!(g.occupant_at(b), Some(AgentId(1)));
    }

    #[test]
    fn shelves_park_and_unpark() {
        let mut g = grid("x..\n..g");
        let home = Coord::new(0, 0);
        g.park_shelf(ShelfId(0), home).unwrap();
        assert_eq!(g.shelf_at(0, 0).unwrap(), Some(ShelfId(0)));
        assert!(g.park_shelf(ShelfId(1), home).is_err());
        assert_eq!(g.unpark_shelf(home), Some(ShelfId(0)));
        assert_eq!(g.parked_shelf_at(home), None);
        assert_eq!(g.unpark_shelf(Coord::new(9, 9)), None);
    }

    #[test]
    fn clear_empties_both_planes() {
        let mut g = grid("x..\n..g");
        g.place_agent(AgentId(0), Coord::new(1, 0)).unwrap();
        g.park_shelf(ShelfId(0), Coord::new(0, 0)).unwrap();
        g.clear();
        assert_eq!(g.agent_count(), 0);
        assert!(!g.is_occupied(1, 0).unwrap());
        assert_eq!(g.shelf_at(0, 0).unwrap(), None);
    }
}
