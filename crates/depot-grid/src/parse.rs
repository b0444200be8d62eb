//! ASCII map parsing.
//!
//! One character per cell, one line per row:
//!
//! | Glyph | Cell |
//! |-------|------|
//! | `.` | empty floor |
//! | `x` | shelf storage |
//! | `g` | goal |
//! | `#` | wall |
//!
//! Leading and trailing whitespace on each line is ignored, as are blank
//! lines, so maps can be written as indented string literals.

use crate::cell::CellKind;
use crate::error::GridError;
use crate::layout::Layout;

impl Layout {
    /// Parse an ASCII map.
    ///
    /// # Examples
    ///
    /// ```
    /// use depot_grid::{CellKind, Layout};
    /// use depot_core::Coord;
    ///
    /// let layout = Layout::parse("
    ///     x.x
    ///     ...
    ///     .g.
    /// ").unwrap();
    /// assert_eq!(layout.width(), 3);
    /// assert_eq!(layout.kind(Coord::new(1, 2)), Some(CellKind::Goal));
    /// ```
    pub fn parse(text: &str) -> Result<Self, GridError> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let Some(first) = rows.first() else {
            return Err(GridError::Empty);
        };
        let width = first.chars().count();

        let mut cells = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let actual = row.chars().count();
            if actual != width {
                return Err(GridError::RaggedRow {
                    row: y,
                    expected: width,
                    actual,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let kind =
                    CellKind::from_glyph(glyph).ok_or(GridError::UnknownCell { glyph, x, y })?;
                cells.push(kind);
            }
        }

        let too_large = |name: &'static str, value: usize| GridError::DimensionTooLarge {
            name,
            value: u32::try_from(value).unwrap_or(u32::MAX),
            max: Layout::MAX_DIM,
        };
        let w = u32::try_from(width).map_err(|_| too_large("width", width))?;
        let h = u32::try_from(rows.len()).map_err(|_| too_large("height", rows.len()))?;
        Layout::new(w, h, cells)
    }
}
