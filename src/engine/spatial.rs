//! Grid-based spatial index for proximity queries over all entities.
//!
//! Divides the arena into square buckets and tracks which entities fall
//! in each. This bounds collision and consumption checks to entities in
//! nearby buckets instead of O(n^2) over the whole arena. The grid is
//! rebuilt from scratch once per frame; entities move every frame, so
//! incremental updates would buy nothing for correctness.

use super::config::GRID_BUCKET_SIZE;
use super::player::Pid;

/// What kind of entity a grid entry refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Pellet,
    Virus,
    Food,
    Cell,
}

/// Entry in the spatial index: entity kind, owning player (cells only),
/// index into the owning collection, position and radius.
#[derive(Clone, Copy, Debug)]
pub struct SpatialEntry {
    pub kind: EntityKind,
    pub pid: Pid,
    pub index: usize,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

/// A grid-based spatial index over a square arena.
pub struct SpatialGrid {
    /// Number of buckets along each axis.
    pub cols: usize,
    bucket_size: f32,
    buckets: Vec<Vec<SpatialEntry>>,
}

impl SpatialGrid {
    /// Create a grid covering a square arena of the given side length.
    pub fn new(arena_size: f32) -> Self {
        let cols = ((arena_size / GRID_BUCKET_SIZE).ceil() as usize).max(1);
        SpatialGrid {
            cols,
            bucket_size: GRID_BUCKET_SIZE,
            buckets: vec![Vec::new(); cols * cols],
        }
    }

    /// Drop all entries, keeping bucket allocations for reuse.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    /// Insert an entity at its current position.
    pub fn insert(&mut self, entry: SpatialEntry) {
        let (col, row) = self.bucket_coords(entry.x, entry.y);
        self.buckets[row * self.cols + col].push(entry);
    }

    /// All entries whose bounding circle intersects the circle of
    /// `radius` centered at (x, y). Scans only the buckets the query
    /// circle can touch, padded by one bucket so large neighbors
    /// spilling over bucket edges are still found.
    pub fn query_circle(&self, x: f32, y: f32, radius: f32) -> Vec<SpatialEntry> {
        let r = radius + self.bucket_size;
        let (min_col, min_row) = self.bucket_coords(x - r, y - r);
        let (max_col, max_row) = self.bucket_coords(x + r, y + r);

        let mut results = Vec::new();
        for row in min_row..=max_row {
            for col in min_col..=max_col {
                for entry in &self.buckets[row * self.cols + col] {
                    let dx = entry.x - x;
                    let dy = entry.y - y;
                    let reach = radius + entry.radius;
                    if dx * dx + dy * dy < reach * reach {
                        results.push(*entry);
                    }
                }
            }
        }
        results
    }

    /// Whether any live cell's circle covers the point (x, y). Used to
    /// keep regenerated pellets out of occupied space.
    pub fn point_occupied_by_cell(&self, x: f32, y: f32) -> bool {
        self.query_circle(x, y, 0.0)
            .iter()
            .any(|e| e.kind == EntityKind::Cell)
    }

    /// Convert a position to bucket coordinates, clamped to the grid.
    fn bucket_coords(&self, x: f32, y: f32) -> (usize, usize) {
        let max = self.cols as f32 - 1.0;
        let col = (x / self.bucket_size).clamp(0.0, max) as usize;
        let row = (y / self.bucket_size).clamp(0.0, max) as usize;
        (col, row)
    }
}
