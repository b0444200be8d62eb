//! Grid coordinates and facing directions.
//!
//! `x` grows east and `y` grows south, so `(0, 0)` is the north-west
//! corner of a layout.

use std::fmt;

/// A cell coordinate on the warehouse floor.
///
/// Coordinates are signed so that stepping off the edge of the layout
/// produces a representable (out-of-range) value that callers can
/// bounds-check, instead of wrapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    /// Column, growing east.
    pub x: i32,
    /// Row, growing south.
    pub y: i32,
}

impl Coord {
    /// Construct a coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring coordinate one cell towards `dir`.
    ///
    /// The result may lie outside any layout.
    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy) = dir.offset();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Manhattan (L1) distance to `other`.
    pub fn manhattan(self, other: Coord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Coord {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// Cardinal facing direction of an agent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Direction {
    /// Towards row 0.
    #[default]
    North = 0,
    /// Towards increasing columns.
    East = 1,
    /// Towards increasing rows.
    South = 2,
    /// Towards column 0.
    West = 3,
}

impl Direction {
    /// All four directions in clockwise order starting at north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Returns the `(dx, dy)` offset for one step in this direction.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    /// Direction after a 90 degree counter-clockwise turn.
    pub fn turn_left(self) -> Self {
        Self::ALL[(self.index() + 3) % 4]
    }

    /// Direction after a 90 degree clockwise turn.
    pub fn turn_right(self) -> Self {
        Self::ALL[(self.index() + 1) % 4]
    }

    /// Clockwise index, `North = 0`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`index`](Self::index), wrapping modulo 4.
    pub fn from_index(i: usize) -> Self {
        Self::ALL[i % 4]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn step_follows_offsets() {
        let c = Coord::new(2, 3);
        assert_eq!(c.step(Direction::North), Coord::new(2, 2));
        assert_eq!(c.step(Direction::South), Coord::new(2, 4));
        assert_eq!(c.step(Direction::East), Coord::new(3, 3));
        assert_eq!(c.step(Direction::West), Coord::new(1, 3));
    }

    #[test]
    fn step_off_the_edge_goes_negative() {
        assert_eq!(Coord::new(0, 0).step(Direction::North), Coord::new(0, -1));
    }

    #[test]
    fn turns_cycle_clockwise() {
        assert_eq!(Direction::North.turn_right(), Direction::East);
        assert_eq!(Direction::West.turn_right(), Direction::North);
        assert_eq!(Direction::North.turn_left(), Direction::West);
        assert_eq!(Direction::East.turn_left(), Direction::North);
    }

    #[test]
    fn manhattan_distance() {
        assert_eq!(Coord::new(0, 0).manhattan(Coord::new(3, -4)), 7);
        assert_eq!(Coord::new(5, 5).manhattan(Coord::new(5, 5)), 0);
    }

    proptest! {
        #[test]
        fn left_then_right_is_identity(i in 0usize..4) {
            let d = Direction::from_index(i);
            prop_assert_eq!(d.turn_left().turn_right(), d);
            prop_assert_eq!(d.turn_right().turn_right().turn_right().turn_right(), d);
        }

        #[test]
        fn step_changes_distance_by_one(x in -50i32..50, y in -50i32..50, i in 0usize..4) {
            let c = Coord::new(x, y);
            prop_assert_eq!(c.manhattan(c.step(Direction::from_index(i))), 1);
        }
    }
}
