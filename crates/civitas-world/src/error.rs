//! Error types for the `civitas-world` crate.
//!
//! Pathfinding itself never errors: a failed search is `None`. [`WorldError`]
//! covers building and editing grids and layouts.

use civitas_types::GridPos;

/// Errors that can occur while constructing or editing world data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// A grid must have at least one row and one column.
    #[error("grid has no cells")]
    EmptyGrid,

    /// A grid dimension does not fit the coordinate type.
    #[error("grid dimension {0} exceeds the supported maximum")]
    DimensionTooLarge(usize),

    /// Row strings of a grid literal differ in length.
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        /// Zero-based row index.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of this row.
        found: usize,
    },

    /// A grid literal contains a character other than `.` or `#`.
    #[error("unexpected cell character {ch:?} at {pos}")]
    InvalidCell {
        /// The offending character.
        ch: char,
        /// Where it appeared.
        pos: GridPos,
    },

    /// A cell lies outside the grid.
    #[error("cell {0} is out of bounds")]
    OutOfBounds(GridPos),

    /// A cell that must be walkable is blocked.
    #[error("cell {0} is not walkable")]
    Unwalkable(GridPos),

    /// Two buildings in one layout share an id.
    #[error("duplicate building id: {0}")]
    DuplicateBuilding(u32),
}
