//! Procedurally generated robotic-warehouse layouts.
//!
//! Shelves are stored in blocks two columns wide and `column_height`
//! rows tall. Blocks are separated by one-cell aisles in both axes, and
//! the bottom row is an aisle holding two goal cells in the middle:
//!
//! ```text
//! ..........
//! .xx.xx.xx.
//!    ...       (column_height rows of shelves)
//! .xx.xx.xx.
//! ..........
//! ....gg....
//! ```
//!
//! For `c` shelf columns, `r` shelf rows and column height `h` the grid is
//! `3c + 1` wide and `(h + 1) r + 2` tall.

use crate::cell::CellKind;
use crate::error::GridError;
use crate::layout::Layout;

/// Column height used by the named presets.
pub const DEFAULT_COLUMN_HEIGHT: u32 = 8;

/// Selects a generated warehouse layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MapId {
    /// 3 shelf columns, 1 shelf row (10 x 11).
    #[default]
    Tiny,
    /// 3 shelf columns, 2 shelf rows (10 x 20).
    Small,
    /// 5 shelf columns, 2 shelf rows (16 x 20).
    Medium,
    /// 5 shelf columns, 3 shelf rows (16 x 29).
    Large,
    /// Explicit block counts.
    Generated {
        /// Number of two-wide shelf column groups.
        shelf_columns: u32,
        /// Number of shelf block rows.
        shelf_rows: u32,
        /// Shelves per column within a block.
        column_height: u32,
    },
}

impl MapId {
    /// Decode a numeric map selection id (1 = tiny ... 4 = large).
    pub fn from_selection(id: u32) -> Option<Self> {
        match id {
            1 => Some(MapId::Tiny),
            2 => Some(MapId::Small),
            3 => Some(MapId::Medium),
            4 => Some(MapId::Large),
            _ => None,
        }
    }

    /// `(shelf_columns, shelf_rows, column_height)` for this map.
    pub fn blocks(self) -> (u32, u32, u32) {
        match self {
            MapId::Tiny => (3, 1, DEFAULT_COLUMN_HEIGHT),
            MapId::Small => (3, 2, DEFAULT_COLUMN_HEIGHT),
            MapId::Medium => (5, 2, DEFAULT_COLUMN_HEIGHT),
            MapId::Large => (5, 3, DEFAULT_COLUMN_HEIGHT),
            MapId::Generated {
                shelf_columns,
                shelf_rows,
                column_height,
            } => (shelf_columns, shelf_rows, column_height),
        }
    }

    /// `(width, height)` of the generated grid, saturating on overflow.
    pub fn dimensions(self) -> (u32, u32) {
        let (cols, rows, h) = self.blocks();
        let width = cols.saturating_mul(3).saturating_add(1);
        let height = h
            .saturating_add(1)
            .saturating_mul(rows)
            .saturating_add(2);
        (width, height)
    }

    /// Generate the layout.
    pub fn build(self) -> Result<Layout, GridError> {
        let (cols, rows, column_height) = self.blocks();
        if cols == 0 || rows == 0 || column_height == 0 {
            return Err(GridError::InvalidPreset {
                reason: format!(
                    "shelf_columns={cols}, shelf_rows={rows}, column_height={column_height}; \
                     all must be at least 1"
                ),
            });
        }
        let (width, height) = self.dimensions();
        if width > Layout::MAX_DIM {
            return Err(GridError::DimensionTooLarge {
                name: "width",
                value: width,
                max: Layout::MAX_DIM,
            });
        }
        if height > Layout::MAX_DIM {
            return Err(GridError::DimensionTooLarge {
                name: "height",
                value: height,
                max: Layout::MAX_DIM,
            });
        }

        let block = column_height + 1;
        let goal_left = width / 2 - 1;
        let goal_right = width / 2;
        let mut cells = Vec::with_capacity((width as usize) * (height as usize));
        for y in 0..height {
            for x in 0..width {
                let kind = if y == height - 1 {
                    if x == goal_left || x == goal_right {
                        CellKind::Goal
                    } else {
                        CellKind::Empty
                    }
                } else if y < height - 2 && x % 3 != 0 && y % block != 0 {
                    CellKind::ShelfStorage
                } else {
                    CellKind::Empty
                };
                cells.push(kind);
            }
        }
        Layout::new(width, height, cells)
    }
}
