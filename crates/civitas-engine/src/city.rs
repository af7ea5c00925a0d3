//! The stand-in city the headless engine runs on.
//!
//! A 35x27 grid cut by five north-south and four east-west roads into
//! twelve blocks. Every block except parks is solid; its entrance is the
//! sidewalk cell at the middle of its north face. Parks stay open so
//! citizens can walk through them.

use civitas_types::{Building, GridPos, RoadSegment, ZoneType};
use civitas_world::{CityLayout, WalkableGrid, WorldError};
use tracing::info;

/// Grid width in cells.
const WIDTH: usize = 35;
/// Grid height in cells.
const HEIGHT: usize = 27;

/// Columns carrying a north-south road.
const ROAD_COLUMNS: [i32; 5] = [1, 9, 17, 25, 33];
/// Rows carrying an east-west road.
const ROAD_ROWS: [i32; 4] = [1, 9, 17, 25];

/// Zone of each block, row-major from the north-west corner.
const ZONES: [ZoneType; 12] = [
    ZoneType::Residential,
    ZoneType::Commercial,
    ZoneType::Residential,
    ZoneType::Industrial,
    ZoneType::Park,
    ZoneType::Mixed,
    ZoneType::Commercial,
    ZoneType::Residential,
    ZoneType::Industrial,
    ZoneType::Residential,
    ZoneType::Park,
    ZoneType::Commercial,
];

/// Build the demo city.
///
/// # Errors
///
/// Returns a [`WorldError`] if the constants above describe an
/// inconsistent layout.
pub fn demo_city() -> Result<CityLayout, WorldError> {
    let mut grid = WalkableGrid::open(WIDTH, HEIGHT)?;
    let mut blocks = Vec::new();
    for rows in ROAD_ROWS.windows(2) {
        for cols in ROAD_COLUMNS.windows(2) {
            if let (Some(&north), Some(&south), Some(&west), Some(&east)) =
                (rows.first(), rows.get(1), cols.first(), cols.get(1))
            {
                blocks.push((north, south, west, east));
            }
        }
    }

    let mut buildings = Vec::new();
    for ((north, south, west, east), (id, zone)) in blocks.into_iter().zip((0_u32..).zip(ZONES)) {
        // Leave a one-cell sidewalk on every side of the block.
        let top_left = GridPos::new(west.saturating_add(2), north.saturating_add(2));
        let bottom_right = GridPos::new(east.saturating_sub(2), south.saturating_sub(2));
        if zone != ZoneType::Park {
            grid.fill_rect(top_left, bottom_right, false)?;
        }
        let middle = west.saturating_add(east) / 2;
        let entrance = if zone == ZoneType::Park {
            GridPos::new(middle, north.saturating_add(south) / 2)
        } else {
            GridPos::new(middle, north.saturating_add(1))
        };
        buildings.push(Building { id, entrance, zone });
    }

    let mut layout = CityLayout::new(grid);
    for building in buildings {
        layout.add_building(building)?;
    }
    let (Some(&first_col), Some(&last_col)) = (ROAD_COLUMNS.first(), ROAD_COLUMNS.last()) else {
        return Ok(layout);
    };
    let (Some(&first_row), Some(&last_row)) = (ROAD_ROWS.first(), ROAD_ROWS.last()) else {
        return Ok(layout);
    };
    for x in ROAD_COLUMNS {
        layout.add_road(RoadSegment {
            start: GridPos::new(x, first_row),
            end: GridPos::new(x, last_row),
        })?;
    }
    for y in ROAD_ROWS {
        layout.add_road(RoadSegment {
            start: GridPos::new(first_col, y),
            end: GridPos::new(last_col, y),
        })?;
    }

    info!(
        width = WIDTH,
        height = HEIGHT,
        buildings = layout.buildings().count(),
        road_cells = layout.road_cell_count(),
        "demo city built"
    );
    Ok(layout)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use civitas_world::{Navigator, NavigatorConfig, Walkability};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn every_zone_is_present() {
        let city = demo_city().unwrap();
        assert_eq!(city.buildings().count(), 12);
        for zone in [
            ZoneType::Commercial,
            ZoneType::Residential,
            ZoneType::Industrial,
            ZoneType::Park,
        ] {
            assert!(city.buildings_serving(zone).next().is_some(), "{zone:?} missing");
        }
    }

    #[test]
    fn roads_are_walkable_and_blocks_are_not() {
        let city = demo_city().unwrap();
        assert!(city.road_cell_count() > 0);
        assert!(city.road_cells().all(|c| city.grid().is_walkable(c)));
        // Middle of the first (residential) block.
        assert!(!city.grid().is_walkable(GridPos::new(5, 5)));
    }

    #[test]
    fn every_entrance_is_reachable_from_the_roads() {
        let city = Arc::new(demo_city().unwrap());
        let navigator = Navigator::new(Arc::clone(&city), NavigatorConfig::default());
        let start = city.road_cells().next().unwrap();
        for building in city.buildings() {
            assert!(
                navigator.plan_path(start, building.entrance).is_some(),
                "building {} unreachable",
                building.id
            );
        }
    }
}
