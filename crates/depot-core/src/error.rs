//! Error taxonomy for the warehouse engine.
//!
//! Three classes of error share one enum:
//!
//! - Recoverable errors ([`InvalidPickup`](WarehouseError::InvalidPickup),
//!   [`InvalidDrop`](WarehouseError::InvalidDrop)) are turned into a no-op
//!   by the tick orchestrator and never end an episode.
//! - Input errors ([`ActionOutOfRange`](WarehouseError::ActionOutOfRange),
//!   [`BufferSize`](WarehouseError::BufferSize)) are rejected before the
//!   tick starts. Nothing changes and the next call may simply retry.
//! - Everything raised inside a tick ([`OutOfBounds`](WarehouseError::OutOfBounds),
//!   [`InvariantViolation`](WarehouseError::InvariantViolation)) indicates
//!   an engine bug. The instance that raised it refuses to step again
//!   until it is reset.
//!
//! Movement collisions are not errors. A blocked move is a designed
//! outcome reported through per-agent move outcomes.

use thiserror::Error;

use crate::geometry::Coord;
use crate::id::AgentId;

/// Why a load attempt was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickupFailure {
    /// The agent already carries a shelf.
    AlreadyCarrying,
    /// No parked shelf on the agent's cell.
    NoShelfHere,
}

/// Why an unload attempt was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropFailure {
    /// The agent is not carrying anything.
    NotCarrying,
    /// Shelves may only be set down on their own home cell (or delivered
    /// at a goal).
    NotHomeCell,
}

/// Errors raised by grid queries, the shelf registry, the movement
/// resolver and the tick orchestrator.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WarehouseError {
    /// A grid query addressed a cell outside the layout.
    #[error("coordinate {coord} out of bounds for {width}x{height} grid")]
    OutOfBounds {
        /// The offending coordinate.
        coord: Coord,
        /// Layout width.
        width: u32,
        /// Layout height.
        height: u32,
    },
    /// A load was attempted without its preconditions.
    #[error("agent {agent} cannot pick up: {reason:?}")]
    InvalidPickup {
        /// The agent that issued the load.
        agent: AgentId,
        /// The unmet precondition.
        reason: PickupFailure,
    },
    /// An unload was attempted without its preconditions.
    #[error("agent {agent} cannot drop: {reason:?}")]
    InvalidDrop {
        /// The agent that issued the unload.
        agent: AgentId,
        /// The unmet precondition.
        reason: DropFailure,
    },
    /// Internal state is inconsistent (engine bug).
    #[error("invariant violated: {reason}")]
    InvariantViolation {
        /// Description of the broken invariant.
        reason: String,
    },
    /// An action buffer slot held an unknown action code.
    #[error("agent {agent}: action code {value} out of range")]
    ActionOutOfRange {
        /// The agent whose slot was malformed.
        agent: AgentId,
        /// The raw value.
        value: i32,
    },
    /// A caller-provided buffer has the wrong length.
    #[error("{buffer} buffer has {actual} elements, expected {expected}")]
    BufferSize {
        /// Which buffer (`"actions"`, `"observations"`, `"rewards"`).
        buffer: &'static str,
        /// Required length.
        expected: usize,
        /// Provided length.
        actual: usize,
    },
    /// An explicit start state does not fit the instance.
    #[error("invalid start state: {reason}")]
    InvalidStart {
        /// What is wrong with the start state.
        reason: String,
    },
    /// The instance hit a fatal error earlier and must be reset.
    #[error("instance aborted after a fatal error; reset required")]
    Aborted,
}

impl WarehouseError {
    /// Whether this error, raised inside a tick, must abort the instance.
    ///
    /// Only invalid load/unload attempts are recoverable. Input errors
    /// never reach this check; they are returned before the tick begins.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            WarehouseError::InvalidPickup { .. } | WarehouseError::InvalidDrop { .. }
        )
    }

    /// Shorthand for an [`InvariantViolation`](Self::InvariantViolation).
    pub fn invariant(reason: impl Into<String>) -> Self {
        WarehouseError::InvariantViolation {
            reason: reason.into(),
        }
    }
}
