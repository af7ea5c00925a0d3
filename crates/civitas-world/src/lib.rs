//! The walkable city and how agents find their way through it.
//!
//! Everything here is read-only with respect to agents: the grid and layout
//! are produced by the world generator and shared behind an `Arc`, and the
//! search algorithms are pure functions over a [`Walkability`] grid.
//!
//! # Modules
//!
//! - [`grid`] -- The [`Walkability`] seam and the dense [`WalkableGrid`]
//! - [`heuristic`] -- Manhattan, Euclidean, and Chebyshev distance estimates
//! - [`astar`] -- Bounded A* with a corner-cutting guard
//! - [`smoothing`] -- Bresenham line of sight and waypoint pruning
//! - [`flow_field`] -- Breadth-first [`FlowField`]s toward a goal cell
//! - [`layout`] -- [`CityLayout`]: buildings by zone and road cells
//! - [`navigator`] -- [`Navigator`]: retarget-once planning and the flow-field cache
//! - [`error`] -- [`WorldError`] for malformed grids and layouts

pub mod astar;
pub mod error;
pub mod flow_field;
pub mod grid;
pub mod heuristic;
pub mod layout;
pub mod navigator;
pub mod smoothing;

pub use astar::{DEFAULT_MAX_ITERATIONS, SearchOptions, find_path, path_cost, search};
pub use error::WorldError;
pub use flow_field::FlowField;
pub use grid::{Walkability, WalkableGrid, nearest_walkable};
pub use heuristic::{Metric, heuristic};
pub use layout::CityLayout;
pub use navigator::{FlowStep, Navigator, NavigatorConfig, PlannedPath};
pub use smoothing::{has_line_of_sight, line_cells, smooth_path};
