//! A* search over a [`Walkability`] grid.
//!
//! Orthogonal steps cost 1 and diagonal steps cost `sqrt(2)`. A diagonal
//! step is only taken when both orthogonal cells it slips between are
//! walkable, so paths never cut wall corners. The search is bounded by an
//! iteration budget and reports failure as `None`.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use civitas_types::GridPos;

use crate::grid::{Walkability, cell_at, cell_count, cell_index};
use crate::heuristic::{Metric, heuristic};

/// Default node-expansion budget for a single search.
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// Orthogonal neighbor offsets, in tie-break order.
pub(crate) const ORTHOGONAL: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Diagonal neighbor offsets, in tie-break order.
pub(crate) const DIAGONAL: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Knobs for a single search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    /// Allow 8-connected movement.
    pub allow_diagonal: bool,
    /// Maximum number of node expansions before giving up.
    pub max_iterations: usize,
    /// Heuristic metric.
    pub metric: Metric,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            allow_diagonal: true,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            metric: Metric::Euclidean,
        }
    }
}

/// Find a path from `start` to `goal` with the Euclidean heuristic.
///
/// Returns the cells from `start` to `goal` inclusive, or `None` when either
/// endpoint is out of bounds or blocked, when the goal is unreachable, or
/// when more than `max_iterations` nodes would be expanded.
pub fn find_path<G: Walkability + ?Sized>(
    start: GridPos,
    goal: GridPos,
    grid: &G,
    allow_diagonal: bool,
    max_iterations: usize,
) -> Option<Vec<GridPos>> {
    search(
        start,
        goal,
        grid,
        &SearchOptions {
            allow_diagonal,
            max_iterations,
            metric: Metric::Euclidean,
        },
    )
}

/// Find a path with explicit [`SearchOptions`].
pub fn search<G: Walkability + ?Sized>(
    start: GridPos,
    goal: GridPos,
    grid: &G,
    options: &SearchOptions,
) -> Option<Vec<GridPos>> {
    if !grid.is_walkable(start) || !grid.is_walkable(goal) {
        return None;
    }
    if start == goal {
        return Some(vec![start]);
    }

    let start_index = cell_index(grid, start)?;
    let goal_index = cell_index(grid, goal)?;
    let count = cell_count(grid);
    let mut g_score = vec![f64::INFINITY; count];
    let mut came_from: Vec<Option<usize>> = vec![None; count];
    let mut closed = vec![false; count];
    let mut open = BinaryHeap::new();
    let mut seq: u64 = 0;

    *g_score.get_mut(start_index)? = 0.0;
    let h = heuristic(start, goal, options.metric);
    open.push(OpenNode {
        f: h,
        h,
        seq,
        index: start_index,
    });

    let mut iterations: usize = 0;
    while let Some(node) = open.pop() {
        if closed.get(node.index).copied().unwrap_or(true) {
            continue;
        }
        if node.index == goal_index {
            return Some(reconstruct(grid, &came_from, goal_index));
        }
        iterations = iterations.saturating_add(1);
        if iterations > options.max_iterations {
            return None;
        }
        if let Some(flag) = closed.get_mut(node.index) {
            *flag = true;
        }

        let current = cell_at(grid, node.index)?;
        let current_g = g_score.get(node.index).copied().unwrap_or(f64::INFINITY);

        for (next, step_cost) in neighbors(grid, current, options.allow_diagonal) {
            let Some(next_index) = cell_index(grid, next) else {
                continue;
            };
            if closed.get(next_index).copied().unwrap_or(true) {
                continue;
            }
            let tentative = current_g + step_cost;
            let Some(best) = g_score.get_mut(next_index) else {
                continue;
            };
            if tentative < *best {
                *best = tentative;
                if let Some(parent) = came_from.get_mut(next_index) {
                    *parent = Some(node.index);
                }
                seq = seq.saturating_add(1);
                let h = heuristic(next, goal, options.metric);
                open.push(OpenNode {
                    f: tentative + h,
                    h,
                    seq,
                    index: next_index,
                });
            }
        }
    }
    None
}

/// Sum of straight-line distances between consecutive waypoints.
pub fn path_cost(path: &[GridPos]) -> f64 {
    path.windows(2)
        .map(|pair| match pair {
            [a, b] => a.distance(*b),
            _ => 0.0,
        })
        .sum()
}

/// Walkable neighbors of `pos` with their step cost, orthogonals first.
pub(crate) fn neighbors<G: Walkability + ?Sized>(
    grid: &G,
    pos: GridPos,
    allow_diagonal: bool,
) -> impl Iterator<Item = (GridPos, f64)> + '_ {
    let orthogonal = ORTHOGONAL.iter().filter_map(move |&(dx, dy)| {
        let next = pos.offset(dx, dy)?;
        grid.is_walkable(next).then_some((next, 1.0))
    });
    let diagonal = DIAGONAL
        .iter()
        .filter(move |_| allow_diagonal)
        .filter_map(move |&(dx, dy)| {
            let next = pos.offset(dx, dy)?;
            let side_a = pos.offset(dx, 0)?;
            let side_b = pos.offset(0, dy)?;
            (grid.is_walkable(next) && grid.is_walkable(side_a) && grid.is_walkable(side_b))
                .then_some((next, core::f64::consts::SQRT_2))
        });
    orthogonal.chain(diagonal)
}

fn reconstruct<G: Walkability + ?Sized>(
    grid: &G,
    came_from: &[Option<usize>],
    goal_index: usize,
) -> Vec<GridPos> {
    let mut path = Vec::new();
    let mut cursor = Some(goal_index);
    while let Some(index) = cursor {
        if let Some(pos) = cell_at(grid, index) {
            path.push(pos);
        }
        cursor = came_from.get(index).copied().flatten();
    }
    path.reverse();
    path
}

/// Open-set entry. The heap is a max-heap, so ordering is reversed: lowest
/// `f` first, then lowest `h`, then earliest insertion.
#[derive(Debug, Clone, Copy)]
struct OpenNode {
    f: f64,
    h: f64,
    seq: u64,
    index: usize,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.h.total_cmp(&self.h))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}
