//! Agents and their delivery-cycle state machine.

use std::fmt;

use depot_core::{Action, AgentId, Coord, Direction, ShelfId, WarehouseError};

use crate::movement::MoveOutcome;

/// Where an agent is in its delivery cycle.
///
/// Legal transitions:
///
/// | from            | to              | trigger                                  |
/// |-----------------|-----------------|------------------------------------------|
/// | `Idle`          | `MovingToShelf` | any non-noop action                      |
/// | `MovingToShelf` | `Carrying`      | successful load                          |
/// | `Carrying`      | `MovingToGoal`  | forward while loaded                     |
/// | `Carrying`      | `MovingToShelf` | shelf set down at home                   |
/// | `MovingToGoal`  | `Returning`     | delivery                                 |
/// | `MovingToGoal`  | `MovingToShelf` | shelf set down at home                   |
/// | `Returning`     | `Idle`          | reached the delivered shelf's home cell  |
/// | `Returning`     | `MovingToShelf` | toggle-load while returning              |
///
/// Anything else is an [`WarehouseError::InvariantViolation`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentState {
    /// Waiting for instructions.
    #[default]
    Idle,
    /// Heading to a shelf to pick up.
    MovingToShelf,
    /// Just picked up a shelf.
    Carrying,
    /// Carrying a shelf towards a goal.
    MovingToGoal,
    /// Delivered; heading back to the shelf's home cell.
    Returning,
}

impl AgentState {
    /// Ordinal used in observations (`Idle = 0` .. `Returning = 4`).
    pub fn index(self) -> usize {
        match self {
            AgentState::Idle => 0,
            AgentState::MovingToShelf => 1,
            AgentState::Carrying => 2,
            AgentState::MovingToGoal => 3,
            AgentState::Returning => 4,
        }
    }

    /// Whether `self -> to` is a legal transition.
    pub fn can_transition(self, to: AgentState) -> bool {
        use AgentState::*;
        matches!(
            (self, to),
            (Idle, MovingToShelf)
                | (MovingToShelf, Carrying)
                | (Carrying, MovingToGoal)
                | (Carrying, MovingToShelf)
                | (MovingToGoal, Returning)
                | (MovingToGoal, MovingToShelf)
                | (Returning, Idle)
                | (Returning, MovingToShelf)
        )
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AgentState::Idle => "idle",
            AgentState::MovingToShelf => "moving_to_shelf",
            AgentState::Carrying => "carrying",
            AgentState::MovingToGoal => "moving_to_goal",
            AgentState::Returning => "returning",
        };
        f.write_str(name)
    }
}

/// One robot on the warehouse floor.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Agent {
    id: AgentId,
    position: Coord,
    facing: Direction,
    carrying: Option<ShelfId>,
    state: AgentState,
    human_controlled: bool,
    last_move: MoveOutcome,
    blocked_moves: u32,
    return_to: Option<Coord>,
}

impl Agent {
    /// A fresh idle agent.
    pub fn new(id: AgentId, position: Coord, facing: Direction, human_controlled: bool) -> Self {
        Self {
            id,
            position,
            facing,
            carrying: None,
            state: AgentState::Idle,
            human_controlled,
            last_move: MoveOutcome::Stayed,
            blocked_moves: 0,
            return_to: None,
        }
    }

    /// Agent id (also its buffer slot).
    pub fn id(&self) -> AgentId {
        self.id
    }

    /// Current cell.
    pub fn position(&self) -> Coord {
        self.position
    }

    /// Facing direction.
    pub fn facing(&self) -> Direction {
        self.facing
    }

    /// Carried shelf, if any.
    pub fn carrying(&self) -> Option<ShelfId> {
        self.carrying
    }

    /// Delivery-cycle state.
    pub fn state(&self) -> AgentState {
        self.state
    }

    /// Whether actions for this agent come from a human client.
    pub fn is_human_controlled(&self) -> bool {
        self.human_controlled
    }

    /// Outcome of the agent's most recent tick.
    pub fn last_move(&self) -> MoveOutcome {
        self.last_move
    }

    /// Blocked move attempts this episode.
    pub fn blocked_moves(&self) -> u32 {
        self.blocked_moves
    }

    /// Home cell of the last delivered shelf while returning.
    pub fn return_to(&self) -> Option<Coord> {
        self.return_to
    }

    /// The cell `action` would move this agent into.
    pub fn target_for(&self, action: Action) -> Coord {
        match action {
            Action::Forward => self.position.step(self.facing),
            _ => self.position,
        }
    }

    // ── State machine ───────────────────────────────────────────

    fn transition(&mut self, to: AgentState) -> Result<(), WarehouseError> {
        if !self.state.can_transition(to) {
            return Err(WarehouseError::invariant(format!(
                "agent {} cannot go from {} to {}",
                self.id, self.state, to
            )));
        }
        self.state = to;
        Ok(())
    }

    /// Start-of-tick bookkeeping: wake an idle agent and apply turns.
    pub(crate) fn begin_tick(&mut self, action: Action) -> Result<(), WarehouseError> {
        self.last_move = MoveOutcome::Stayed;
        if self.state == AgentState::Idle && action != Action::NoOp {
            self.transition(AgentState::MovingToShelf)?;
        }
        match action {
            Action::TurnLeft => self.facing = self.facing.turn_left(),
            Action::TurnRight => self.facing = self.facing.turn_right(),
            Action::Forward if self.state == AgentState::Carrying => {
                self.transition(AgentState::MovingToGoal)?;
            }
            _ => {}
        }
        Ok(())
    }

    pub(crate) fn pick_up(&mut self, shelf: ShelfId) -> Result<(), WarehouseError> {
        if self.state == AgentState::Returning {
            self.transition(AgentState::MovingToShelf)?;
            self.return_to = None;
        }
        self.transition(AgentState::Carrying)?;
        self.carrying = Some(shelf);
        Ok(())
    }

    pub(crate) fn set_down(&mut self) -> Result<ShelfId, WarehouseError> {
        let shelf = self.carrying.ok_or_else(|| {
            WarehouseError::invariant(format!("agent {} has nothing to set down", self.id))
        })?;
        self.transition(AgentState::MovingToShelf)?;
        self.carrying = None;
        Ok(shelf)
    }

    pub(crate) fn deliver(&mut self, home: Coord) -> Result<ShelfId, WarehouseError> {
        let shelf = self.carrying.ok_or_else(|| {
            WarehouseError::invariant(format!("agent {} has nothing to deliver", self.id))
        })?;
        self.transition(AgentState::Returning)?;
        self.carrying = None;
        self.return_to = Some(home);
        Ok(shelf)
    }

    pub(crate) fn commit_move(
        &mut self,
        outcome: MoveOutcome,
        to: Coord,
    ) -> Result<(), WarehouseError> {
        self.last_move = outcome;
        match outcome {
            MoveOutcome::Moved => self.position = to,
            MoveOutcome::Blocked => self.blocked_moves += 1,
            MoveOutcome::Stayed => {}
        }
        if self.state == AgentState::Returning && self.return_to == Some(self.position) {
            self.transition(AgentState::Idle)?;
            self.return_to = None;
        }
        Ok(())
    }
}
