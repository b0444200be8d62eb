//! Simultaneous movement resolution.
//!
//! Every agent declares an [`Intent`] (its current cell and the cell it
//! wants to enter). The resolver decides which moves commit so that no
//! two agents end a tick on the same cell, and agents rotating in a
//! closed loop all move together.
//!
//! # Algorithm
//!
//! 1. **Static checks.** A target outside the layout or on a wall is
//!    unreachable. A loaded agent additionally cannot enter a parked
//!    shelf or any storage cell other than its own shelf's home, so a
//!    delivered shelf can always return home. The agent is blocked and
//!    its target collapses to its own cell.
//! 2. **Successor graph.** An agent whose target is occupied by another
//!    agent gets an edge to that agent. Every node has out-degree at most
//!    one, so components are in-trees hanging off either a stationary
//!    root or a single cycle.
//! 3. **Weights and cycles.** Kahn's algorithm peels the in-trees and
//!    accumulates each agent's weight (the size of its upstream tree,
//!    itself included). Nodes never peeled are exactly the cycle members;
//!    walking successors labels each cycle.
//! 4. **Contention.** Movers are grouped by target cell. If the cell's
//!    occupant sits on a cycle, the cycle predecessor wins. Otherwise the
//!    heaviest contender wins, ties going to the lower agent id.
//! 5. **Chains.** Winners are settled in reverse topological order: a
//!    winner moves iff its target is vacant or its successor moves.
//!    Cycle members always move.
//!
//! The resolver keeps its scratch buffers between ticks; after the first
//! tick at a given agent count it does not allocate on the hot path
//! apart from the returned [`Resolution`].

use std::cmp::Reverse;
use std::collections::VecDeque;

use depot_core::{AgentId, Coord, WarehouseError};
use depot_grid::CellKind;
use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::grid::Grid;

/// One agent's movement request for a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Intent {
    /// The requesting agent.
    pub agent: AgentId,
    /// The agent's current cell.
    pub from: Coord,
    /// The requested cell; equal to `from` for agents staying put.
    pub to: Coord,
    /// Home cell of the carried shelf, if the agent is loaded.
    pub load_home: Option<Coord>,
}

impl Intent {
    /// An intent to stay on `at`.
    pub fn stay(agent: AgentId, at: Coord, load_home: Option<Coord>) -> Self {
        Self {
            agent,
            from: at,
            to: at,
            load_home,
        }
    }

    /// Whether the intent requests a move.
    pub fn is_move(&self) -> bool {
        self.from != self.to
    }
}

/// Result of one agent's movement for a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveOutcome {
    /// No move was requested.
    #[default]
    Stayed,
    /// The requested move committed.
    Moved,
    /// A move was requested and refused.
    Blocked,
}

/// The dependency graph built during resolution, kept for diagnostics.
///
/// All vectors are indexed by agent id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MovementGraph {
    /// Requested target per agent.
    pub targets: Vec<Coord>,
    /// Cycle label per agent; `None` outside cycles.
    pub cycle_ids: Vec<Option<u32>>,
    /// Size of each agent's upstream in-tree, itself included.
    pub weights: Vec<u32>,
    /// Number of distinct cycles found.
    pub num_cycles: u32,
}

/// Outcome of resolving one tick of intents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Cell each agent ends the tick on, indexed by agent id.
    pub final_cells: Vec<Coord>,
    /// Per-agent outcome, indexed by agent id.
    pub outcomes: Vec<MoveOutcome>,
    /// The dependency graph.
    pub graph: MovementGraph,
}

impl Resolution {
    /// Number of agents that moved.
    pub fn moved(&self) -> u32 {
        self.count(MoveOutcome::Moved)
    }

    /// Number of agents whose move was refused.
    pub fn blocked(&self) -> u32 {
        self.count(MoveOutcome::Blocked)
    }

    fn count(&self, outcome: MoveOutcome) -> u32 {
        self.outcomes.iter().filter(|&&o| o == outcome).count() as u32
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Status {
    Stay,
    Pending,
    Blocked,
    Moves,
}

/// Reusable movement resolver.
#[derive(Debug, Default)]
pub struct MovementResolver {
    succ: Vec<Option<usize>>,
    indegree: Vec<u32>,
    order: Vec<usize>,
    queue: VecDeque<usize>,
    status: Vec<Status>,
    contenders: IndexMap<usize, SmallVec<[usize; 4]>>,
    claimed: Vec<bool>,
}

impl MovementResolver {
    /// A resolver with empty scratch space.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve one tick of intents against the current occupancy.
    ///
    /// `intents` must hold exactly one entry per agent on the grid,
    /// ordered by agent id, each starting on the cell the grid records for
    /// that agent and targeting that cell or a 4-neighbour. Anything else
    /// is an [`InvariantViolation`](WarehouseError::InvariantViolation).
    pub fn resolve(
        &mut self,
        grid: &Grid,
        intents: &[Intent],
    ) -> Result<Resolution, WarehouseError> {
        validate(grid, intents)?;
        let n = intents.len();
        let layout = grid.layout();

        self.succ.clear();
        self.succ.resize(n, None);
        self.indegree.clear();
        self.indegree.resize(n, 0);
        self.status.clear();
        self.order.clear();
        self.queue.clear();
        self.contenders.clear();

        let mut graph = MovementGraph {
            targets: intents.iter().map(|i| i.to).collect(),
            cycle_ids: vec![None; n],
            weights: vec![1; n],
            num_cycles: 0,
        };

        // 1-2. Static checks and successor edges.
        for (i, intent) in intents.iter().enumerate() {
            let status = if !intent.is_move() {
                Status::Stay
            } else if !layout.is_walkable(intent.to) || load_blocks(grid, intent) {
                Status::Blocked
            } else {
                if let Some(next) = grid.occupant_at(intent.to) {
                    self.succ[i] = Some(next.index());
                    self.indegree[next.index()] += 1;
                }
                Status::Pending
            };
            self.status.push(status);
        }

        // 3. Kahn's peel: weights flow downstream, leftovers are cycles.
        self.queue.extend((0..n).filter(|&i| self.indegree[i] == 0));
        while let Some(i) = self.queue.pop_front() {
            self.order.push(i);
            if let Some(j) = self.succ[i] {
                graph.weights[j] += graph.weights[i];
                self.indegree[j] -= 1;
                if self.indegree[j] == 0 {
                    self.queue.push_back(j);
                }
            }
        }
        for start in 0..n {
            if self.indegree[start] == 0 || graph.cycle_ids[start].is_some() {
                continue;
            }
            let label = graph.num_cycles;
            graph.num_cycles += 1;
            let mut at = start;
            loop {
                graph.cycle_ids[at] = Some(label);
                self.status[at] = Status::Moves;
                at = self.succ[at].ok_or_else(|| {
                    WarehouseError::invariant(format!("cycle member {at} has no successor"))
                })?;
                if at == start {
                    break;
                }
            }
        }

        // 4. Contention per target cell, in agent-id order.
        for (i, intent) in intents.iter().enumerate() {
            if matches!(self.status[i], Status::Pending | Status::Moves) {
                if let Some(cell) = layout.index(intent.to) {
                    self.contenders.entry(cell).or_default().push(i);
                }
            }
        }
        for (&cell, group) in &self.contenders {
            if group.len() < 2 {
                continue;
            }
            let occupant_cycle = grid
                .occupant_at(layout.coord_of(cell))
                .and_then(|o| graph.cycle_ids[o.index()]);
            let winner = match occupant_cycle {
                Some(label) => group
                    .iter()
                    .copied()
                    .find(|&c| graph.cycle_ids[c] == Some(label)),
                None => group
                    .iter()
                    .copied()
                    .max_by_key(|&c| (graph.weights[c], Reverse(c))),
            }
            .ok_or_else(|| {
                WarehouseError::invariant(format!(
                    "no winner for contended cell {}",
                    layout.coord_of(cell)
                ))
            })?;
            for &c in group {
                if c != winner {
                    if self.status[c] == Status::Moves {
                        return Err(WarehouseError::invariant(format!(
                            "cycle member {c} lost contention"
                        )));
                    }
                    self.status[c] = Status::Blocked;
                }
            }
        }

        // 5. Chains settle successor-first.
        for &i in self.order.iter().rev() {
            if self.status[i] != Status::Pending {
                continue;
            }
            self.status[i] = match self.succ[i] {
                None => Status::Moves,
                Some(j) if self.status[j] == Status::Moves => Status::Moves,
                Some(_) => Status::Blocked,
            };
        }

        let mut resolution = Resolution {
            final_cells: Vec::with_capacity(n),
            outcomes: Vec::with_capacity(n),
            graph,
        };
        for (i, intent) in intents.iter().enumerate() {
            let (cell, outcome) = match self.status[i] {
                Status::Moves => (intent.to, MoveOutcome::Moved),
                Status::Blocked => (intent.from, MoveOutcome::Blocked),
                Status::Stay => (intent.from, MoveOutcome::Stayed),
                Status::Pending => {
                    return Err(WarehouseError::invariant(format!(
                        "agent {i} left unresolved"
                    )))
                }
            };
            resolution.final_cells.push(cell);
            resolution.outcomes.push(outcome);
        }
        self.check_exclusive(grid, &resolution.final_cells)?;
        Ok(resolution)
    }

    fn check_exclusive(&mut self, grid: &Grid, cells: &[Coord]) -> Result<(), WarehouseError> {
        let layout = grid.layout();
        self.claimed.clear();
        self.claimed.resize(layout.cell_count(), false);
        for &cell in cells {
            let i = layout.index(cell).ok_or_else(|| {
                WarehouseError::invariant(format!("agent resolved off-grid to {cell}"))
            })?;
            if std::mem::replace(&mut self.claimed[i], true) {
                return Err(WarehouseError::invariant(format!(
                    "two agents resolved onto {cell}"
                )));
            }
        }
        Ok(())
    }
}

/// Whether a loaded mover is barred from its target by shelves.
fn load_blocks(grid: &Grid, intent: &Intent) -> bool {
    let Some(home) = intent.load_home else {
        return false;
    };
    grid.parked_shelf_at(intent.to).is_some()
        || (intent.to != home && grid.layout().kind(intent.to) == Some(CellKind::ShelfStorage))
}

fn validate(grid: &Grid, intents: &[Intent]) -> Result<(), WarehouseError> {
    if grid.agent_count() != intents.len() {
        return Err(WarehouseError::invariant(format!(
            "{} intents for {} agents",
            intents.len(),
            grid.agent_count()
        )));
    }
    for (i, intent) in intents.iter().enumerate() {
        if intent.agent.index() != i {
            return Err(WarehouseError::invariant(format!(
                "intent slot {i} holds agent {}",
                intent.agent
            )));
        }
        if grid.occupant_at(intent.from) != Some(intent.agent) {
            return Err(WarehouseError::invariant(format!(
                "agent {} is not at {}",
                intent.agent, intent.from
            )));
        }
        if intent.from.manhattan(intent.to) > 1 {
            return Err(WarehouseError::invariant(format!(
                "agent {} cannot reach {} from {} in one tick",
                intent.agent, intent.to, intent.from
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot_core::ShelfId;
    use depot_grid::Layout;

    const OPEN: &str = "\
        ......
        ......
        ......
        ......
        x....g";

    fn setup(text: &str, agents: &[(i32, i32)]) -> Grid {
        let mut grid = Grid::new(Layout::parse(text).unwrap());
        for (i, &(x, y)) in agents.iter().enumerate() {
            grid.place_agent(AgentId(i as u16), Coord::new(x, y)).unwrap();
        }
        grid
    }

    fn intent(grid: &Grid, agent: u16, to: (i32, i32)) -> Intent {
        let from = (0..grid.height() as i32)
            .flat_map(|y| (0..grid.width() as i32).map(move |x| Coord::new(x, y)))
            .find(|&c| grid.occupant_at(c) == Some(AgentId(agent)))
            .unwrap();
        Intent {
            agent: AgentId(agent),
            from,
            to: to.into(),
            load_home: None,
        }
    }

    fn resolve(grid: &Grid, intents: &[Intent]) -> Resolution {
        MovementResolver::new().resolve(grid, intents).unwrap()
    }

    use MoveOutcome::{Blocked, Moved, Stayed};

    #[test]
    fn lone_agent_moves() {
        let g = setup(OPEN, &[(1, 1)]);
        let r = resolve(&g, &[intent(&g, 0, (2, 1))]);
        assert_eq!(r.outcomes, vec![Moved]);
        assert_eq!(r.final_cells, vec![Coord::new(2, 1)]);
    }

    #[test]
    fn swap_is_a_two_cycle() {
        let g = setup(OPEN, &[(2, 3), (3, 3)]);
        let r = resolve(&g, &[intent(&g, 0, (3, 3)), intent(&g, 1, (2, 3))]);
        assert_eq!(r.outcomes, vec![Moved, Moved]);
        assert_eq!(r.final_cells, vec![Coord::new(3, 3), Coord::new(2, 3)]);
        assert_eq!(r.graph.num_cycles, 1);
        assert_eq!(r.graph.cycle_ids, vec![Some(0), Some(0)]);
    }

    #[test]
    fn four_cycle_rotates() {
        let g = setup(OPEN, &[(1, 1), (2, 1), (2, 2), (1, 2)]);
        let intents = [
            intent(&g, 0, (2, 1)),
            intent(&g, 1, (2, 2)),
            intent(&g, 2, (1, 2)),
            intent(&g, 3, (1, 1)),
        ];
        let r = resolve(&g, &intents);
        assert!(r.outcomes.iter().all(|&o| o == Moved));
        assert_eq!(r.graph.num_cycles, 1);
    }

    #[test]
    fn disjoint_rotations_get_separate_labels() {
        let g = setup(OPEN, &[(0, 0), (1, 0), (3, 1), (4, 1), (4, 2), (3, 2)]);
        let intents = [
            intent(&g, 0, (1, 0)),
            intent(&g, 1, (0, 0)),
            intent(&g, 2, (4, 1)),
            intent(&g, 3, (4, 2)),
            intent(&g, 4, (3, 2)),
            intent(&g, 5, (3, 1)),
        ];
        let r = resolve(&g, &intents);
        assert!(r.outcomes.iter().all(|&o| o == Moved));
        assert_eq!(r.graph.num_cycles, 2);
        assert_eq!(
            r.graph.cycle_ids,
            vec![Some(0), Some(0), Some(1), Some(1), Some(1), Some(1)]
        );
    }

    #[test]
    fn chain_into_vacated_cell_moves() {
        let g = setup(OPEN, &[(1, 1), (2, 1), (3, 1)]);
        let intents = [
            intent(&g, 0, (2, 1)),
            intent(&g, 1, (3, 1)),
            intent(&g, 2, (4, 1)),
        ];
        let r = resolve(&g, &intents);
        assert_eq!(r.outcomes, vec![Moved, Moved, Moved]);
        assert_eq!(r.graph.weights, vec![1, 2, 3]);
        assert_eq!(r.graph.num_cycles, 0);
    }

    #[test]
    fn chain_behind_stationary_agent_blocks() {
        let g = setup(OPEN, &[(1, 1), (2, 1), (3, 1)]);
        let intents = [
            intent(&g, 0, (2, 1)),
            intent(&g, 1, (3, 1)),
            intent(&g, 2, (3, 1)),
        ];
        let r = resolve(&g, &intents);
        assert_eq!(r.outcomes, vec![Blocked, Blocked, Stayed]);
        assert_eq!(r.final_cells, vec![Coord::new(1, 1), Coord::new(2, 1), Coord::new(3, 1)]);
    }

    #[test]
    fn heavier_queue_wins_empty_cell() {
        // Agents 0 and 1 queue from the west; agent 2 arrives alone from the east.
        let g = setup(OPEN, &[(1, 2), (0, 2), (3, 2)]);
        let intents = [
            intent(&g, 0, (2, 2)),
            intent(&g, 1, (1, 2)),
            intent(&g, 2, (2, 2)),
        ];
        let r = resolve(&g, &intents);
        assert_eq!(r.outcomes, vec![Moved, Moved, Blocked]);
    }

    #[test]
    fn equal_weights_favour_lower_id() {
        let g = setup(OPEN, &[(3, 2), (1, 2)]);
        let r = resolve(&g, &[intent(&g, 0, (2, 2)), intent(&g, 1, (2, 2))]);
        assert_eq!(r.outcomes, vec![Moved, Blocked]);
    }

    #[test]
    fn cycle_beats_tree_feeding_into_it() {
        // 0 <-> 1 swap; 2 tries to enter 1's cell from the south.
        let g = setup(OPEN, &[(1, 1), (2, 1), (2, 2)]);
        let intents = [
            intent(&g, 0, (2, 1)),
            intent(&g, 1, (1, 1)),
            intent(&g, 2, (2, 1)),
        ];
        let r = resolve(&g, &intents);
        assert_eq!(r.outcomes, vec![Moved, Moved, Blocked]);
        assert_eq!(r.graph.cycle_ids[2], None);
    }

    #[test]
    fn walls_and_edges_block() {
        let g = setup("x#.\n..g", &[(0, 1), (2, 0)]);
        let r = resolve(&g, &[intent(&g, 0, (-1, 1)), intent(&g, 1, (1, 0))]);
        assert_eq!(r.outcomes, vec![Blocked, Blocked]);
        assert_eq!(r.graph.targets[0], Coord::new(-1, 1));
    }

    #[test]
    fn loaded_agents_cannot_enter_parked_shelves() {
        let mut g = setup(OPEN, &[(1, 4), (1, 3)]);
        g.park_shelf(ShelfId(0), Coord::new(0, 4)).unwrap();
        let mut loaded = intent(&g, 0, (0, 4));
        loaded.load_home = Some(Coord::new(0, 0));
        let free = intent(&g, 1, (0, 3));
        let r = resolve(&g, &[loaded, free]);
        assert_eq!(r.outcomes, vec![Blocked, Moved]);

        let stay = Intent::stay(AgentId(1), Coord::new(1, 3), None);
        let r = resolve(&g, &[intent(&g, 0, (0, 4)), stay]);
        assert_eq!(r.outcomes, vec![Moved, Stayed]);
    }

    #[test]
    fn loaded_agents_only_enter_their_own_home() {
        let g = setup("xx.\n...\ng..", &[(0, 1), (2, 0)]);
        let mut foreign = intent(&g, 0, (0, 0));
        foreign.load_home = Some(Coord::new(1, 0));
        let mut own = intent(&g, 1, (1, 0));
        own.load_home = Some(Coord::new(1, 0));
        let r = resolve(&g, &[foreign, own]);
        assert_eq!(r.outcomes, vec![Blocked, Moved]);

        // Empty-handed agents walk over storage freely.
        let r = resolve(&g, &[intent(&g, 0, (0, 0)), intent(&g, 1, (1, 0))]);
        assert_eq!(r.outcomes, vec![Moved, Moved]);
    }

    #[test]
    fn blocked_head_blocks_whole_chain() {
        let g = setup("x#...\n....g", &[(2, 0), (3, 0)]);
        let r = resolve(&g, &[intent(&g, 0, (1, 0)), intent(&g, 1, (2, 0))]);
        assert_eq!(r.outcomes, vec![Blocked, Blocked]);
    }

    #[test]
    fn malformed_intents_are_rejected() {
        let g = setup(OPEN, &[(1, 1), (2, 1)]);
        let mut resolver = MovementResolver::new();
        let a = intent(&g, 0, (1, 2));
        let b = intent(&g, 1, (2, 2));

        let missing = resolver.resolve(&g, &[a]).unwrap_err();
        assert!(matches!(missing, WarehouseError::InvariantViolation { .. }));

        let swapped = resolver.resolve(&g, &[b, a]).unwrap_err();
        assert!(matches!(swapped, WarehouseError::InvariantViolation { .. }));

        let mut wrong_cell = b;
        wrong_cell.from = Coord::new(4, 4);
        assert!(resolver.resolve(&g, &[a, wrong_cell]).is_err());

        let mut teleport = b;
        teleport.to = Coord::new(4, 3);
        assert!(resolver.resolve(&g, &[a, teleport]).is_err());

        // The resolver stays usable after rejecting input.
        assert!(resolver.resolve(&g, &[a, b]).is_ok());
    }
}
