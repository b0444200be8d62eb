//! Static cell kinds.

/// What a cell of the warehouse floor is built for.
///
/// Shelf storage cells are where shelves live when parked; agents may
/// walk under a parked shelf only when they are not carrying one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellKind {
    /// Open floor (aisles and highways).
    #[default]
    Empty,
    /// A shelf's home slot.
    ShelfStorage,
    /// A delivery point for requested shelves.
    Goal,
    /// Impassable.
    Wall,
}

impl CellKind {
    /// Whether an agent may ever stand on this cell.
    pub fn is_walkable(self) -> bool {
        !matches!(self, CellKind::Wall)
    }

    /// ASCII glyph used by [`Layout::parse`](crate::Layout::parse).
    pub fn glyph(self) -> char {
        match self {
            CellKind::Empty => '.',
            CellKind::ShelfStorage => 'x',
            CellKind::Goal => 'g',
            CellKind::Wall => '#',
        }
    }

    /// Inverse of [`glyph`](Self::glyph).
    pub fn from_glyph(c: char) -> Option<Self> {
        match c {
            '.' => Some(CellKind::Empty),
            'x' | 'X' => Some(CellKind::ShelfStorage),
            'g' | 'G' => Some(CellKind::Goal),
            '#' => Some(CellKind::Wall),
            _ => None,
        }
    }
}
