//! The walkable grid agents move across.
//!
//! The world generator owns the city geometry; the simulation only needs to
//! know which integer cells can be stood on. [`Walkability`] is that seam.
//! [`WalkableGrid`] is the in-memory implementation used by the engine and
//! tests.

use civitas_types::GridPos;

use crate::error::WorldError;

/// Read-only walkability query over a rectangular grid.
pub trait Walkability {
    /// Number of columns.
    fn width(&self) -> i32;

    /// Number of rows.
    fn height(&self) -> i32;

    /// Whether `pos` is inside the grid and can be stood on.
    fn is_walkable(&self, pos: GridPos) -> bool;

    /// Whether `pos` lies inside the grid.
    fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width() && pos.y < self.height()
    }
}

/// Dense boolean grid, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkableGrid {
    width: i32,
    height: i32,
    cells: Vec<bool>,
}

impl WalkableGrid {
    /// Create a grid where every cell is walkable.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::EmptyGrid`] for a zero dimension and
    /// [`WorldError::DimensionTooLarge`] if a dimension does not fit `i32`.
    pub fn open(width: usize, height: usize) -> Result<Self, WorldError> {
        Self::filled(width, height, true)
    }

    /// Create a grid where every cell has the given walkability.
    ///
    /// # Errors
    ///
    /// Same as [`WalkableGrid::open`].
    pub fn filled(width: usize, height: usize, walkable: bool) -> Result<Self, WorldError> {
        if width == 0 || height == 0 {
            return Err(WorldError::EmptyGrid);
        }
        let w = i32::try_from(width).map_err(|_e| WorldError::DimensionTooLarge(width))?;
        let h = i32::try_from(height).map_err(|_e| WorldError::DimensionTooLarge(height))?;
        let count = width
            .checked_mul(height)
            .ok_or(WorldError::DimensionTooLarge(width.max(height)))?;
        Ok(Self {
            width: w,
            height: h,
            cells: vec![walkable; count],
        })
    }

    /// Parse a grid from text rows: `.` is walkable, `#` is blocked.
    ///
    /// Row 0 is `y = 0`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::EmptyGrid`], [`WorldError::RaggedRow`], or
    /// [`WorldError::InvalidCell`] for malformed input.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, WorldError> {
        let expected = rows.first().map_or(0, |r| r.as_ref().chars().count());
        let mut grid = Self::open(expected, rows.len())?;
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != expected {
                return Err(WorldError::RaggedRow {
                    row: y,
                    expected,
                    found,
                });
            }
            for (x, ch) in row.chars().enumerate() {
                let pos = GridPos::new(
                    i32::try_from(x).map_err(|_e| WorldError::DimensionTooLarge(x))?,
                    i32::try_from(y).map_err(|_e| WorldError::DimensionTooLarge(y))?,
                );
                match ch {
                    '.' => {}
                    '#' => grid.set_walkable(pos, false)?,
                    other => return Err(WorldError::InvalidCell { ch: other, pos }),
                }
            }
        }
        Ok(grid)
    }

    /// Set the walkability of one cell.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if `pos` is outside the grid.
    pub fn set_walkable(&mut self, pos: GridPos, walkable: bool) -> Result<(), WorldError> {
        let index = cell_index(self, pos).ok_or(WorldError::OutOfBounds(pos))?;
        let cell = self
            .cells
            .get_mut(index)
            .ok_or(WorldError::OutOfBounds(pos))?;
        *cell = walkable;
        Ok(())
    }

    /// Set the walkability of every cell in the inclusive rectangle
    /// spanned by `a` and `b`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if any corner is outside the grid.
    pub fn fill_rect(&mut self, a: GridPos, b: GridPos, walkable: bool) -> Result<(), WorldError> {
        for corner in [a, b] {
            if !self.in_bounds(corner) {
                return Err(WorldError::OutOfBounds(corner));
            }
        }
        for y in a.y.min(b.y)..=a.y.max(b.y) {
            for x in a.x.min(b.x)..=a.x.max(b.x) {
                self.set_walkable(GridPos::new(x, y), walkable)?;
            }
        }
        Ok(())
    }

    /// Number of walkable cells.
    pub fn walkable_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }
}

impl Walkability for WalkableGrid {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn is_walkable(&self, pos: GridPos) -> bool {
        cell_index(self, pos)
            .and_then(|i| self.cells.get(i))
            .copied()
            .unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// Dense indexing helpers shared by the search algorithms
// ---------------------------------------------------------------------------

/// Total number of cells in `grid`.
pub(crate) fn cell_count<G: Walkability + ?Sized>(grid: &G) -> usize {
    let w = usize::try_from(grid.width()).unwrap_or(0);
    let h = usize::try_from(grid.height()).unwrap_or(0);
    w.saturating_mul(h)
}

/// Row-major index of `pos`, or `None` when out of bounds.
pub(crate) fn cell_index<G: Walkability + ?Sized>(grid: &G, pos: GridPos) -> Option<usize> {
    if !grid.in_bounds(pos) {
        return None;
    }
    let x = usize::try_from(pos.x).ok()?;
    let y = usize::try_from(pos.y).ok()?;
    let w = usize::try_from(grid.width()).ok()?;
    y.checked_mul(w)?.checked_add(x)
}

/// Inverse of [`cell_index`].
pub(crate) fn cell_at<G: Walkability + ?Sized>(grid: &G, index: usize) -> Option<GridPos> {
    let w = usize::try_from(grid.width()).ok()?;
    let x = i32::try_from(index.checked_rem(w)?).ok()?;
    let y = i32::try_from(index.checked_div(w)?).ok()?;
    let pos = GridPos::new(x, y);
    grid.in_bounds(pos).then_some(pos)
}

/// The walkable cell closest to `target` by Euclidean distance.
///
/// `target` itself is a candidate unless `exclude_target` is set. The
/// target may lie outside the grid. Ties resolve to the first cell in
/// row-major order within the nearest ring.
pub fn nearest_walkable<G: Walkability + ?Sized>(
    grid: &G,
    target: GridPos,
    exclude_target: bool,
) -> Option<GridPos> {
    let outside = |v: i32, len: i32| {
        if v < 0 {
            v.saturating_neg()
        } else {
            v.saturating_sub(len).saturating_add(1).max(0)
        }
    };
    let reach = grid.width().max(grid.height()).saturating_add(
        outside(target.x, grid.width()).max(outside(target.y, grid.height())),
    );
    let mut best: Option<(f64, GridPos)> = None;

    for radius in 0..=reach {
        if let Some((d, _)) = best
            && f64::from(radius) > d
        {
            break;
        }
        for dy in radius.saturating_neg()..=radius {
            for dx in radius.saturating_neg()..=radius {
                if dx.abs().max(dy.abs()) != radius {
                    continue;
                }
                let Some(cell) = target.offset(dx, dy) else {
                    continue;
                };
                if (exclude_target && cell == target) || !grid.is_walkable(cell) {
                    continue;
                }
                let d = target.distance(cell);
                if best.is_none_or(|(bd, _)| d < bd) {
                    best = Some((d, cell));
                }
            }
        }
    }
    best.map(|(_, cell)| cell)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn open_grid_is_walkable_in_bounds_only() {
        let grid = WalkableGrid::open(4, 3).unwrap();
        assert!(grid.is_walkable(GridPos::new(0, 0)));
        assert!(grid.is_walkable(GridPos::new(3, 2)));
        assert!(!grid.is_walkable(GridPos::new(4, 0)));
        assert!(!grid.is_walkable(GridPos::new(-1, 0)));
        assert_eq!(grid.walkable_count(), 12);
    }

    #[test]
    fn zero_dimension_is_rejected() {
        assert_eq!(WalkableGrid::open(0, 5), Err(WorldError::EmptyGrid));
    }

    #[test]
    fn parses_rows() {
        let grid = WalkableGrid::from_rows(&["..#", "#.."]).unwrap();
        assert_eq!((grid.width(), grid.height()), (3, 2));
        assert!(!grid.is_walkable(GridPos::new(2, 0)));
        assert!(!grid.is_walkable(GridPos::new(0, 1)));
        assert!(grid.is_walkable(GridPos::new(1, 1)));
    }

    #[test]
    fn rejects_malformed_rows() {
        assert!(matches!(
            WalkableGrid::from_rows(&["...", ".."]),
            Err(WorldError::RaggedRow { row: 1, .. })
        ));
        assert!(matches!(
            WalkableGrid::from_rows(&[".x."]),
            Err(WorldError::InvalidCell { ch: 'x', .. })
        ));
    }

    #[test]
    fn index_round_trips() {
        let grid = WalkableGrid::open(5, 4).unwrap();
        let pos = GridPos::new(3, 2);
        let i = cell_index(&grid, pos).unwrap();
        assert_eq!(i, 13);
        assert_eq!(cell_at(&grid, i), Some(pos));
        assert_eq!(cell_index(&grid, GridPos::new(5, 0)), None);
        assert_eq!(cell_count(&grid), 20);
    }

    #[test]
    fn nearest_walkable_finds_closest_open_cell() {
        let grid = WalkableGrid::from_rows(&["#####", "###.#", "#####"]).unwrap();
        assert_eq!(
            nearest_walkable(&grid, GridPos::new(0, 0), false),
            Some(GridPos::new(3, 1))
        );
        assert_eq!(
            nearest_walkable(&grid, GridPos::new(3, 1), true),
            None
        );
        assert_eq!(
            nearest_walkable(&grid, GridPos::new(3, 1), false),
            Some(GridPos::new(3, 1))
        );
    }

    #[test]
    fn nearest_walkable_prefers_orthogonal_over_diagonal() {
        let mut grid = WalkableGrid::filled(5, 5, false).unwrap();
        grid.set_walkable(GridPos::new(3, 3), true).unwrap();
        grid.set_walkable(GridPos::new(2, 4), true).unwrap();
        assert_eq!(
            nearest_walkable(&grid, GridPos::new(2, 2), false),
            Some(GridPos::new(3, 3))
        );
        grid.set_walkable(GridPos::new(2, 3), true).unwrap();
        assert_eq!(
            nearest_walkable(&grid, GridPos::new(2, 2), false),
            Some(GridPos::new(2, 3))
        );
    }

    #[test]
    fn fill_rect_blocks_region() {
        let mut grid = WalkableGrid::open(4, 4).unwrap();
        grid.fill_rect(GridPos::new(1, 1), GridPos::new(2, 2), false).unwrap();
        assert_eq!(grid.walkable_count(), 12);
        assert_eq!(
            grid.fill_rect(GridPos::new(0, 0), GridPos::new(4, 4), false),
            Err(WorldError::OutOfBounds(GridPos::new(4, 4)))
        );
    }
}
