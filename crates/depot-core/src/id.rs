//! Strongly-typed identifiers.

use std::fmt;

/// Identifies an agent within one warehouse instance.
///
/// Agents are created at construction and numbered sequentially, so
/// `AgentId(n)` is also the agent's slot in every per-agent buffer.
/// Lower ids win ties during movement resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentId(pub u16);

impl AgentId {
    /// Slot index of this agent in per-agent arrays.
    pub fn index(self) -> usize {
        usize::from(self.0)
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for AgentId {
    fn from(v: u16) -> Self {
        Self(v)
    }
}

/// Identifies a shelf within one warehouse instance.
///
/// Shelves are numbered in row-major order of their home storage cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShelfId(pub u32);

impl ShelfId {
    /// Slot index of this shelf in the registry.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ShelfId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ShelfId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Monotonically increasing tick counter.
///
/// Counts ticks since the last reset of an instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickId(pub u64);

impl TickId {
    /// The tick following this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TickId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_id_index_matches_value() {
        assert_eq!(AgentId(7).index(), 7);
        assert_eq!(AgentId::from(3u16), AgentId(3));
    }

    #[test]
    fn ids_order_by_value() {
        assert!(AgentId(0) < AgentId(1));
        assert!(ShelfId(4) > ShelfId(2));
        assert_eq!(TickId(9).next(), TickId(10));
    }

    #[test]
    fn display_is_bare_number() {
        assert_eq!(format!("{}", AgentId(12)), "12");
        assert_eq!(format!("{}", ShelfId(3)), "3");
        assert_eq!(format!("{}", TickId(100)), "100");
    }
}
