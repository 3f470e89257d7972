//! Spatial operations: grid locations, the Manhattan metric, and the
//! multi-occupancy cell container.
//!
//! This module provides:
//!
//! - **Location**: integer `(x, y)` coordinates on a bounded grid
//! - **Manhattan distance**: the movement metric (4-neighbour steps)
//! - **Enroute test**: whether a point lies inside the axis-aligned rectangle
//!   spanned by two locations
//! - **MultiGrid**: a resource mapping each cell to the entities standing on it
//!
//! The grid is bounded; there is no wrapping. All locations handed to the
//! grid are expected to be in range; an out-of-range location indicates a
//! core bug.

use std::collections::HashMap;

use bevy_ecs::prelude::{Entity, Resource};
use serde::{Deserialize, Serialize};

/// Integer grid coordinates, `0 <= x < width`, `0 <= y < height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub x: u32,
    pub y: u32,
}

impl Location {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance: `|x1 - x2| + |y1 - y2|`.
    pub fn manhattan(self, other: Location) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Whether `self` lies inside the axis-aligned rectangle with opposite
    /// corners `a` and `b` (inclusive). This is the "enroute" test: visiting
    /// such a point does not lengthen the Manhattan path from `a` to `b`.
    pub fn within_rect(self, a: Location, b: Location) -> bool {
        let (x_lo, x_hi) = (a.x.min(b.x), a.x.max(b.x));
        let (y_lo, y_hi) = (a.y.min(b.y), a.y.max(b.y));
        (x_lo..=x_hi).contains(&self.x) && (y_lo..=y_hi).contains(&self.y)
    }
}

/// Multi-occupancy 2D cell container. Any number of entities can share a
/// cell; no ordering within a cell is guaranteed beyond insertion order.
///
/// Cell lookup is O(1); rectangle scans are O(area).
#[derive(Debug, Resource)]
pub struct MultiGrid {
    width: u32,
    height: u32,
    cells: Vec<Vec<Entity>>,
    positions: HashMap<Entity, Location>,
}

impl MultiGrid {
    pub fn new(width: u32, height: u32) -> Self {
        debug_assert!(width > 0 && height > 0, "grid extents must be positive");
        Self {
            width,
            height,
            cells: vec![Vec::new(); (width as usize) * (height as usize)],
            positions: HashMap::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn in_bounds(&self, loc: Location) -> bool {
        loc.x < self.width && loc.y < self.height
    }

    fn cell_index(&self, loc: Location) -> usize {
        debug_assert!(self.in_bounds(loc), "location out of grid bounds");
        (loc.y as usize) * (self.width as usize) + (loc.x as usize)
    }

    /// Place an entity on a cell. The entity must not already be on the grid.
    pub fn place(&mut self, entity: Entity, loc: Location) {
        debug_assert!(
            !self.positions.contains_key(&entity),
            "entity already placed on the grid"
        );
        let index = self.cell_index(loc);
        self.cells[index].push(entity);
        self.positions.insert(entity, loc);
    }

    /// Move an entity already on the grid to a new cell.
    pub fn move_to(&mut self, entity: Entity, new_loc: Location) {
        let Some(old_loc) = self.positions.get(&entity).copied() else {
            debug_assert!(false, "moving an entity that is not on the grid");
            return;
        };
        if old_loc == new_loc {
            return;
        }
        let old_index = self.cell_index(old_loc);
        self.cells[old_index].retain(|e| *e != entity);
        let new_index = self.cell_index(new_loc);
        self.cells[new_index].push(entity);
        self.positions.insert(entity, new_loc);
    }

    /// Remove an entity from the grid. Removing an absent entity is a no-op.
    pub fn remove(&mut self, entity: Entity) {
        if let Some(loc) = self.positions.remove(&entity) {
            let index = self.cell_index(loc);
            self.cells[index].retain(|e| *e != entity);
        }
    }

    /// Current cell of an entity, if it is on the grid.
    pub fn position_of(&self, entity: Entity) -> Option<Location> {
        self.positions.get(&entity).copied()
    }

    /// Entities standing on a cell.
    pub fn contents(&self, loc: Location) -> &[Entity] {
        &self.cells[self.cell_index(loc)]
    }

    /// Entities standing in the axis-aligned rectangle with opposite corners
    /// `a` and `b` (inclusive). Cells are scanned in row-major order.
    pub fn contents_rect(&self, a: Location, b: Location) -> Vec<Entity> {
        let (x_lo, x_hi) = (a.x.min(b.x), a.x.max(b.x));
        let (y_lo, y_hi) = (a.y.min(b.y), a.y.max(b.y));
        let mut found = Vec::new();
        for y in y_lo..=y_hi {
            for x in x_lo..=x_hi {
                found.extend_from_slice(self.contents(Location::new(x, y)));
            }
        }
        found
    }
}
