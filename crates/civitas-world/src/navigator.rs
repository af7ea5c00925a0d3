//! Route planning with the no-path recovery policy and a shared flow-field
//! cache.
//!
//! Ad-hoc destinations (a wander target, another agent) are planned with A*
//! and smoothed. If the exact goal cannot be reached, the goal is moved once
//! to the nearest other walkable cell and the search is retried; if that
//! also fails the caller gets `None` and falls back to wandering.
//!
//! Building entrances are shared destinations, so they are served by flow
//! fields cached per goal cell, under the same retarget-once rule. The cache
//! is bounded; the least recently used field is evicted first.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use civitas_types::GridPos;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::astar::{DEFAULT_MAX_ITERATIONS, SearchOptions, search};
use crate::flow_field::FlowField;
use crate::grid::{Walkability, nearest_walkable};
use crate::heuristic::Metric;
use crate::layout::CityLayout;
use crate::smoothing::smooth_path;

/// Pathfinding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Allow 8-connected movement.
    pub allow_diagonal: bool,
    /// A* node-expansion budget per search.
    pub max_iterations: usize,
    /// A* heuristic.
    pub metric: Metric,
    /// Smoothing passes applied to every A* path.
    pub smoothing_passes: usize,
    /// Maximum number of cached flow fields.
    pub flow_field_cache: usize,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            allow_diagonal: true,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            metric: Metric::Euclidean,
            smoothing_passes: 4,
            flow_field_cache: 32,
        }
    }
}

/// A planned A* route.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedPath {
    /// Smoothed waypoints, start first.
    pub waypoints: Vec<GridPos>,
    /// The cell the route actually ends at.
    pub goal: GridPos,
    /// Whether the goal was moved because the requested one was unreachable.
    pub retargeted: bool,
}

/// One step along a flow field toward a shared destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowStep {
    /// The cell to head for now. Equals `goal` once the agent is there.
    pub next: GridPos,
    /// The cell the field actually leads to.
    pub goal: GridPos,
    /// Whether the goal was moved because the requested one was unreachable.
    pub retargeted: bool,
}

#[derive(Debug, Default)]
struct FieldCache {
    fields: BTreeMap<GridPos, (Arc<FlowField>, u64)>,
    clock: u64,
}

/// Shared route planner over one [`CityLayout`].
#[derive(Debug)]
pub struct Navigator {
    layout: Arc<CityLayout>,
    config: NavigatorConfig,
    cache: Mutex<FieldCache>,
}

impl Navigator {
    /// Create a navigator over `layout`.
    pub fn new(layout: Arc<CityLayout>, config: NavigatorConfig) -> Self {
        Self {
            layout,
            config,
            cache: Mutex::new(FieldCache::default()),
        }
    }

    /// The layout being navigated.
    pub fn layout(&self) -> &CityLayout {
        &self.layout
    }

    /// The active settings.
    pub const fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// Plan a smoothed route from `from` to `to`.
    ///
    /// A blocked start is snapped to the nearest walkable cell first. On
    /// failure the goal is retargeted once to the nearest other walkable
    /// cell. Returns `None` when both attempts fail.
    pub fn plan_path(&self, from: GridPos, to: GridPos) -> Option<PlannedPath> {
        let grid = self.layout.grid();
        let start = if grid.is_walkable(from) {
            from
        } else {
            nearest_walkable(grid, from, false)?
        };
        let options = SearchOptions {
            allow_diagonal: self.config.allow_diagonal,
            max_iterations: self.config.max_iterations,
            metric: self.config.metric,
        };

        let (raw, goal, retargeted) = if let Some(path) = search(start, to, grid, &options) {
            (path, to, false)
        } else {
            let fallback = nearest_walkable(grid, to, true)?;
            debug!(from = %start, goal = %to, retarget = %fallback, "no path, retargeting");
            let path = search(start, fallback, grid, &options)?;
            (path, fallback, true)
        };

        Some(PlannedPath {
            waypoints: smooth_path(&raw, grid, self.config.smoothing_passes),
            goal,
            retargeted,
        })
    }

    /// The next cell on the way from `from` to `goal` by flow field.
    ///
    /// When `from` cannot reach `goal` (or `goal` is blocked), the goal is
    /// retargeted once to the nearest other walkable cell. Returns `None`
    /// when neither can be reached.
    pub fn flow_step(&self, from: GridPos, goal: GridPos) -> Option<FlowStep> {
        let reaches = |field: &Arc<FlowField>| field.distance_at(from).is_some();
        let (field, retargeted) = if let Some(field) = self.flow_field(goal).filter(reaches) {
            (field, false)
        } else {
            let fallback = nearest_walkable(self.layout.grid(), goal, true)?;
            debug!(from = %from, goal = %goal, retarget = %fallback, "no flow, retargeting");
            (self.flow_field(fallback).filter(reaches)?, true)
        };
        Some(FlowStep {
            next: field.next_cell(from).unwrap_or_else(|| field.goal()),
            goal: field.goal(),
            retargeted,
        })
    }

    /// The flow field leading to `goal`, generated on first use.
    ///
    /// Returns `None` if `goal` is not walkable.
    pub fn flow_field(&self, goal: GridPos) -> Option<Arc<FlowField>> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.clock = cache.clock.saturating_add(1);
        let now = cache.clock;

        if let Some((field, used)) = cache.fields.get_mut(&goal) {
            *used = now;
            return Some(Arc::clone(field));
        }

        let field = Arc::new(FlowField::generate(goal, self.layout.grid())?);
        trace!(goal = %goal, reachable = field.reachable_count(), "flow field generated");
        cache.fields.insert(goal, (Arc::clone(&field), now));

        while cache.fields.len() > self.config.flow_field_cache.max(1) {
            let oldest = cache
                .fields
                .iter()
                .min_by_key(|(_, (_, used))| *used)
                .map(|(pos, _)| *pos);
            let Some(oldest) = oldest else { break };
            cache.fields.remove(&oldest);
        }
        Some(field)
    }

    /// Number of flow fields currently cached.
    pub fn cached_fields(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .fields
            .len()
    }
}
