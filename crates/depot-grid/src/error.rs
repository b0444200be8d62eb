//! Error types for layout construction and map loading.

use thiserror::Error;

/// Errors arising from building or parsing a [`Layout`](crate::Layout).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// The map has no cells.
    #[error("layout must have at least one cell")]
    Empty,
    /// An ASCII row differs in width from the first row.
    #[error("row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        /// Zero-based row index.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of this row.
        actual: usize,
    },
    /// An ASCII map contains a character with no cell meaning.
    #[error("unknown cell glyph {glyph:?} at ({x}, {y})")]
    UnknownCell {
        /// The character.
        glyph: char,
        /// Column.
        x: usize,
        /// Row.
        y: usize,
    },
    /// The layout has no goal cell, so nothing can ever be delivered.
    #[error("layout has no goal cells")]
    NoGoals,
    /// The layout has no shelf storage cell.
    #[error("layout has no shelf storage cells")]
    NoStorage,
    /// A dimension exceeds the supported maximum.
    #[error("{name} = {value} exceeds maximum {max}")]
    DimensionTooLarge {
        /// Which dimension.
        name: &'static str,
        /// The requested value.
        value: u32,
        /// The maximum.
        max: u32,
    },
    /// The cell vector does not match `width * height`.
    #[error("cell vector has {actual} entries, expected {expected}")]
    CellCountMismatch {
        /// `width * height`.
        expected: usize,
        /// Provided length.
        actual: usize,
    },
    /// A generated preset was requested with a zero block count.
    #[error("invalid preset: {reason}")]
    InvalidPreset {
        /// What is wrong with the parameters.
        reason: String,
    },
}
