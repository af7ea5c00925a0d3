//! The city as the simulation sees it: a walkable grid, tagged buildings,
//! and road cells.
//!
//! The world generator produces these; [`CityLayout`] validates them once
//! and answers the placement queries agents need (nearest shop, a random
//! road cell to wander to).

use std::collections::{BTreeMap, BTreeSet};

use civitas_types::{Building, GridPos, RoadSegment, ZoneType};
use rand::Rng;
use tracing::debug;

use crate::error::WorldError;
use crate::grid::{Walkability, WalkableGrid};
use crate::smoothing::line_cells;

/// Immutable city description shared by every agent.
#[derive(Debug, Clone)]
pub struct CityLayout {
    grid: WalkableGrid,
    buildings: BTreeMap<u32, Building>,
    roads: Vec<RoadSegment>,
    road_cells: BTreeSet<GridPos>,
}

impl CityLayout {
    /// Wrap a grid with no buildings or roads yet.
    pub const fn new(grid: WalkableGrid) -> Self {
        Self {
            grid,
            buildings: BTreeMap::new(),
            roads: Vec::new(),
            road_cells: BTreeSet::new(),
        }
    }

    // -------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------

    /// Register a building.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateBuilding`] if the id is taken, or
    /// [`WorldError::Unwalkable`] if the entrance cell cannot be stood on.
    pub fn add_building(&mut self, building: Building) -> Result<(), WorldError> {
        if self.buildings.contains_key(&building.id) {
            return Err(WorldError::DuplicateBuilding(building.id));
        }
        if !self.grid.in_bounds(building.entrance) {
            return Err(WorldError::OutOfBounds(building.entrance));
        }
        if !self.grid.is_walkable(building.entrance) {
            return Err(WorldError::Unwalkable(building.entrance));
        }
        self.buildings.insert(building.id, building);
        Ok(())
    }

    /// Register a road segment. Its walkable cells become road cells.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if an endpoint lies outside the
    /// grid.
    pub fn add_road(&mut self, segment: RoadSegment) -> Result<(), WorldError> {
        for end in [segment.start, segment.end] {
            if !self.grid.in_bounds(end) {
                return Err(WorldError::OutOfBounds(end));
            }
        }
        let before = self.road_cells.len();
        self.road_cells.extend(
            line_cells(segment.start, segment.end)
                .into_iter()
                .filter(|&c| self.grid.is_walkable(c)),
        );
        debug!(
            start = %segment.start,
            end = %segment.end,
            added = self.road_cells.len().saturating_sub(before),
            "road segment registered"
        );
        self.roads.push(segment);
        Ok(())
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// The walkable grid.
    pub const fn grid(&self) -> &WalkableGrid {
        &self.grid
    }

    /// Look up a building by id.
    pub fn building(&self, id: u32) -> Option<&Building> {
        self.buildings.get(&id)
    }

    /// Iterate over all buildings in id order.
    pub fn buildings(&self) -> impl Iterator<Item = &Building> {
        self.buildings.values()
    }

    /// Buildings that can serve a request for `zone`.
    pub fn buildings_serving(&self, zone: ZoneType) -> impl Iterator<Item = &Building> {
        self.buildings.values().filter(move |b| b.zone.serves(zone))
    }

    /// The building serving `zone` whose entrance is closest to `from`.
    ///
    /// Ties go to the lowest building id.
    pub fn nearest_building(&self, from: GridPos, zone: ZoneType) -> Option<&Building> {
        self.buildings_serving(zone).fold(None, |best: Option<&Building>, b| match best {
            Some(current) if current.entrance.distance(from) <= b.entrance.distance(from) => {
                Some(current)
            }
            _ => Some(b),
        })
    }

    /// All registered road segments.
    pub fn roads(&self) -> &[RoadSegment] {
        &self.roads
    }

    /// Walkable cells covered by roads, in sorted order.
    pub fn road_cells(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.road_cells.iter().copied()
    }

    /// Number of road cells.
    pub fn road_cell_count(&self) -> usize {
        self.road_cells.len()
    }

    /// Whether `pos` is a road cell.
    pub fn is_road(&self, pos: GridPos) -> bool {
        self.road_cells.contains(&pos)
    }

    /// A uniformly random road cell, or `None` if there are no roads.
    pub fn random_road_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<GridPos> {
        if self.road_cells.is_empty() {
            return None;
        }
        let pick = rng.random_range(0..self.road_cells.len());
        self.road_cells.iter().nth(pick).copied()
    }
}
