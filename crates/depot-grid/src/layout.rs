//! Immutable warehouse floor plan.

use depot_core::Coord;

use crate::cell::CellKind;
use crate::error::GridError;

/// The static layout of one warehouse: dimensions and cell kinds.
///
/// Cells are stored row-major, so the flat index of `(x, y)` is
/// `y * width + x`. Goal and storage coordinates are cached at
/// construction in row-major order; shelf ids are assigned in the same
/// order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    width: u32,
    height: u32,
    cells: Vec<CellKind>,
    goals: Vec<Coord>,
    storage: Vec<Coord>,
}

impl Layout {
    /// Maximum size of either axis.
    pub const MAX_DIM: u32 = 4096;

    /// Build a layout from row-major cell kinds.
    ///
    /// Fails if either dimension is zero or above [`MAX_DIM`](Self::MAX_DIM),
    /// if `cells.len() != width * height`, or if the layout lacks goal or
    /// storage cells.
    ///
    /// # Examples
    ///
    /// ```
    /// use depot_grid::{CellKind, Layout};
    ///
    /// let cells = vec![CellKind::ShelfStorage, CellKind::Empty, CellKind::Goal];
    /// let layout = Layout::new(3, 1, cells).unwrap();
    /// assert_eq!(layout.cell_count(), 3);
    /// assert_eq!(layout.goals().len(), 1);
    /// ```
    pub fn new(width: u32, height: u32, cells: Vec<CellKind>) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::Empty);
        }
        if width > Self::MAX_DIM {
            return Err(GridError::DimensionTooLarge {
                name: "width",
                value: width,
                max: Self::MAX_DIM,
            });
        }
        if height > Self::MAX_DIM {
            return Err(GridError::DimensionTooLarge {
                name: "height",
                value: height,
                max: Self::MAX_DIM,
            });
        }
        let expected = (width as usize) * (height as usize);
        if cells.len() != expected {
            return Err(GridError::CellCountMismatch {
                expected,
                actual: cells.len(),
            });
        }

        let mut goals = Vec::new();
        let mut storage = Vec::new();
        for (i, kind) in cells.iter().enumerate() {
            let coord = Coord::new((i % width as usize) as i32, (i / width as usize) as i32);
            match kind {
                CellKind::Goal => goals.push(coord),
                CellKind::ShelfStorage => storage.push(coord),
                CellKind::Empty | CellKind::Wall => {}
            }
        }
        if goals.is_empty() {
            return Err(GridError::NoGoals);
        }
        if storage.is_empty() {
            return Err(GridError::NoStorage);
        }

        Ok(Self {
            width,
            height,
            cells,
            goals,
            storage,
        })
    }

    /// Number of columns.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Whether `coord` lies inside the layout.
    pub fn contains(&self, coord: Coord) -> bool {
        coord.x >= 0
            && coord.y >= 0
            && (coord.x as u32) < self.width
            && (coord.y as u32) < self.height
    }

    /// Row-major flat index of `coord`, or `None` outside the layout.
    pub fn index(&self, coord: Coord) -> Option<usize> {
        if self.contains(coord) {
            Some(coord.y as usize * self.width as usize + coord.x as usize)
        } else {
            None
        }
    }

    /// Coordinate of a row-major flat index.
    ///
    /// The index is not checked against the cell count.
    pub fn coord_of(&self, index: usize) -> Coord {
        let w = self.width as usize;
        Coord::new((index % w) as i32, (index / w) as i32)
    }

    /// Kind of the cell at `coord`, or `None` outside the layout.
    pub fn kind(&self, coord: Coord) -> Option<CellKind> {
        self.index(coord).map(|i| self.cells[i])
    }

    /// Whether an agent may stand at `coord` (inside and not a wall).
    pub fn is_walkable(&self, coord: Coord) -> bool {
        self.kind(coord).is_some_and(CellKind::is_walkable)
    }

    /// Goal cells in row-major order.
    pub fn goals(&self) -> &[Coord] {
        &self.goals
    }

    /// Shelf storage cells in row-major order. One shelf is created per entry.
    pub fn storage(&self) -> &[Coord] {
        &self.storage
    }

    /// Row-major cell kinds.
    pub fn cells(&self) -> &[CellKind] {
        &self.cells
    }

    /// Number of cells an agent can stand on.
    pub fn walkable_count(&self) -> usize {
        self.cells.iter().filter(|k| k.is_walkable()).count()
    }

    /// Render the layout in the format accepted by [`Layout::parse`].
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.height as usize);
        for row in self.cells.chunks(self.width as usize) {
            out.extend(row.iter().map(|k| k.glyph()));
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip() -> Layout {
        // x . g
        // . # .
        let cells = vec![
            CellKind::ShelfStorage,
            CellKind::Empty,
            CellKind::Goal,
            CellKind::Empty,
            CellKind::Wall,
            CellKind::Empty,
        ];
        Layout::new(3, 2, cells).unwrap()
    }

    #[test]
    fn index_is_row_major() {
        let l = strip();
        assert_eq!(l.index(Coord::new(0, 0)), Some(0));
        assert_eq!(l.index(Coord::new(2, 0)), Some(2));
        assert_eq!(l.index(Coord::new(0, 1)), Some(3));
        assert_eq!(l.coord_of(5), Coord::new(2, 1));
    }

    #[test]
    fn out_of_range_has_no_kind() {
        let l = strip();
        assert_eq!(l.kind(Coord::new(-1, 0)), None);
        assert_eq!(l.kind(Coord::new(3, 0)), None);
        assert_eq!(l.kind(Coord::new(0, 2)), None);
        assert_eq!(l.kind(Coord::new(1, 1)), Some(CellKind::Wall));
    }

    #[test]
    fn walls_are_not_walkable() {
        let l = strip();
        assert!(!l.is_walkable(Coord::new(1, 1)));
        assert!(l.is_walkable(Coord::new(0, 0)));
        assert!(!l.is_walkable(Coord::new(9, 9)));
        assert_eq!(l.walkable_count(), 5);
    }

    #[test]
    fn caches_goals_and_storage() {
        let l = strip();
        assert_eq!(l.goals(), &[Coord::new(2, 0)]);
        assert_eq!(l.storage(), &[Coord::new(0, 0)]);
    }

    #[test]
    fn rejects_bad_dimensions() {
        assert_eq!(Layout::new(0, 3, vec![]), Err(GridError::Empty));
        assert!(matches!(
            Layout::new(2, 2, vec![CellKind::Goal]),
            Err(GridError::CellCountMismatch { expected: 4, actual: 1 })
        ));
        assert!(matches!(
            Layout::new(Layout::MAX_DIM + 1, 1, vec![]),
            Err(GridError::DimensionTooLarge { name: "width", .. })
        ));
    }

    #[test]
    fn rejects_missing_goals_or_storage() {
        let no_goal = vec![CellKind::ShelfStorage, CellKind::Empty];
        assert_eq!(Layout::new(2, 1, no_goal), Err(GridError::NoGoals));
        let no_storage = vec![CellKind::Goal, CellKind::Empty];
        assert_eq!(Layout::new(2, 1, no_storage), Err(GridError::NoStorage));
    }

    #[test]
    fn ascii_rendering() {
        assert_eq!(strip().to_ascii(), "x.g\n.#.\n");
    }
}
