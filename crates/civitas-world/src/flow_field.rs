//! Goal-centric flow fields.
//!
//! When many agents head for the same building, one breadth-first sweep from
//! the entrance serves them all: every reachable cell stores its step
//! distance to the goal and a unit vector pointing at its best neighbor.

use std::collections::VecDeque;

use civitas_types::{GridPos, Vec2};

use crate::astar::neighbors;
use crate::grid::{Walkability, cell_at, cell_count, cell_index};

/// Per-cell distance and steering direction toward one goal cell.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowField {
    goal: GridPos,
    width: i32,
    height: i32,
    distances: Vec<Option<u32>>,
    directions: Vec<Vec2>,
}

impl FlowField {
    /// Sweep `grid` outward from `goal` over 8-connected moves.
    ///
    /// Returns `None` if `goal` is out of bounds or blocked.
    pub fn generate<G: Walkability + ?Sized>(goal: GridPos, grid: &G) -> Option<Self> {
        if !grid.is_walkable(goal) {
            return None;
        }
        let count = cell_count(grid);
        let mut distances: Vec<Option<u32>> = vec![None; count];
        let goal_index = cell_index(grid, goal)?;
        *distances.get_mut(goal_index)? = Some(0);

        let mut frontier = VecDeque::from([goal]);
        while let Some(cell) = frontier.pop_front() {
            let Some(here) = cell_index(grid, cell).and_then(|i| distances.get(i).copied().flatten())
            else {
                continue;
            };
            for (next, _) in neighbors(grid, cell, true) {
                let Some(slot) = cell_index(grid, next).and_then(|i| distances.get_mut(i)) else {
                    continue;
                };
                if slot.is_none() {
                    *slot = Some(here.saturating_add(1));
                    frontier.push_back(next);
                }
            }
        }

        let mut directions = vec![Vec2::ZERO; count];
        for (index, direction) in directions.iter_mut().enumerate() {
            let Some(cell) = cell_at(grid, index) else {
                continue;
            };
            let Some(own) = distances.get(index).copied().flatten() else {
                continue;
            };
            let mut best: Option<(u32, GridPos)> = None;
            for (next, _) in neighbors(grid, cell, true) {
                let Some(d) = cell_index(grid, next).and_then(|i| distances.get(i).copied().flatten())
                else {
                    continue;
                };
                if d < own && best.is_none_or(|(bd, _)| d < bd) {
                    best = Some((d, next));
                }
            }
            if let Some((_, target)) = best {
                *direction = (target.center() - cell.center()).normalized();
            }
        }

        Some(Self {
            goal,
            width: grid.width(),
            height: grid.height(),
            distances,
            directions,
        })
    }

    /// The goal cell this field leads to.
    pub const fn goal(&self) -> GridPos {
        self.goal
    }

    /// Unit steering vector at `pos`.
    ///
    /// `Some(Vec2::ZERO)` at the goal; `None` for cells that are out of
    /// bounds or cannot reach the goal.
    pub fn direction_at(&self, pos: GridPos) -> Option<Vec2> {
        let index = self.index(pos)?;
        self.distances.get(index).copied().flatten()?;
        self.directions.get(index).copied()
    }

    /// Step distance from `pos` to the goal, or `None` if unreachable.
    pub fn distance_at(&self, pos: GridPos) -> Option<u32> {
        self.distances.get(self.index(pos)?).copied().flatten()
    }

    /// The neighbor cell `pos` flows into, or `None` at the goal or when
    /// unreachable.
    pub fn next_cell(&self, pos: GridPos) -> Option<GridPos> {
        let dir = self.direction_at(pos)?;
        let dx = step_component(dir.x);
        let dy = step_component(dir.y);
        if dx == 0 && dy == 0 {
            return None;
        }
        pos.offset(dx, dy)
    }

    /// Number of cells that can reach the goal.
    pub fn reachable_count(&self) -> usize {
        self.distances.iter().filter(|d| d.is_some()).count()
    }

    fn index(&self, pos: GridPos) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.width || pos.y >= self.height {
            return None;
        }
        let w = usize::try_from(self.width).ok()?;
        usize::try_from(pos.y)
            .ok()?
            .checked_mul(w)?
            .checked_add(usize::try_from(pos.x).ok()?)
    }
}

/// Round one unit-vector component to a grid step of -1, 0, or 1.
fn step_component(v: f64) -> i32 {
    if v > 0.25 {
        1
    } else if v < -0.25 {
        -1
    } else {
        0
    }
}
