//! Line-of-sight path smoothing.
//!
//! A* on a grid produces staircase paths. Smoothing drops the middle of any
//! three consecutive waypoints whose ends can see each other, so agents walk
//! straight lines across open plazas.

use civitas_types::GridPos;

use crate::grid::Walkability;

/// Cells on the Bresenham line from `a` to `b`, inclusive of both ends.
pub fn line_cells(a: GridPos, b: GridPos) -> Vec<GridPos> {
    let mut cells = Vec::new();
    bresenham(a, b, |cell, _| {
        cells.push(cell);
        true
    });
    cells
}

/// Whether every cell on the line from `a` to `b` is walkable.
///
/// Diagonal steps along the line must also not slip between two blocked
/// cells, matching the corner rule A* uses.
pub fn has_line_of_sight<G: Walkability + ?Sized>(a: GridPos, b: GridPos, grid: &G) -> bool {
    bresenham(a, b, |cell, prev| {
        if !grid.is_walkable(cell) {
            return false;
        }
        match prev {
            Some(p) if p.x != cell.x && p.y != cell.y => {
                grid.is_walkable(GridPos::new(cell.x, p.y)) && grid.is_walkable(GridPos::new(p.x, cell.y))
            }
            _ => true,
        }
    })
}

/// Remove redundant waypoints from `path`.
///
/// Runs up to `iterations` passes, stopping early once a pass removes
/// nothing. The first and last waypoints are always kept, and the result is
/// never longer than the input.
pub fn smooth_path<G: Walkability + ?Sized>(
    path: &[GridPos],
    grid: &G,
    iterations: usize,
) -> Vec<GridPos> {
    let mut smoothed = path.to_vec();
    for _ in 0..iterations {
        let before = smoothed.len();
        let mut i = 0;
        while let (Some(&from), Some(&to)) = (smoothed.get(i), smoothed.get(i.saturating_add(2))) {
            if has_line_of_sight(from, to, grid) {
                smoothed.remove(i.saturating_add(1));
            } else {
                i = i.saturating_add(1);
            }
        }
        if smoothed.len() == before {
            break;
        }
    }
    smoothed
}

/// Walk the line from `a` to `b`, calling `visit(cell, previous)` for each
/// cell. Stops early and returns `false` when `visit` does.
fn bresenham<F>(a: GridPos, b: GridPos, mut visit: F) -> bool
where
    F: FnMut(GridPos, Option<GridPos>) -> bool,
{
    let (x1, y1) = (i64::from(b.x), i64::from(b.y));
    let (mut x, mut y) = (i64::from(a.x), i64::from(a.y));
    let dx = x1.saturating_sub(x).abs();
    let dy = y1.saturating_sub(y).abs().saturating_neg();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx.saturating_add(dy);
    let mut prev: Option<GridPos> = None;

    loop {
        let (Ok(cx), Ok(cy)) = (i32::try_from(x), i32::try_from(y)) else {
            return false;
        };
        let cell = GridPos::new(cx, cy);
        if !visit(cell, prev) {
            return false;
        }
        if x == x1 && y == y1 {
            return true;
        }
        prev = Some(cell);
        let e2 = err.saturating_mul(2);
        if e2 >= dy {
            err = err.saturating_add(dy);
            x = x.saturating_add(sx);
        }
        if e2 <= dx {
            err = err.saturating_add(dx);
            y = y.saturating_add(sy);
        }
    }
}
