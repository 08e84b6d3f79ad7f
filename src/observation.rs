//! Observation encoders: read-only projections of the world into flat
//! f32 buffers an agent can consume. Encoding never mutates the world,
//! so encoding the same state twice yields identical buffers.

use crate::engine::{Player, WorldState};

/// A set of flat f32 buffers plus their logical 2-D shapes. Buffer
/// `i` holds `shape(i).0 * shape(i).1` values in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    data: Vec<Vec<f32>>,
    shapes: Vec<(usize, usize)>,
}

impl Observation {
    pub fn new() -> Self {
        Observation { data: Vec::new(), shapes: Vec::new() }
    }

    pub fn push(&mut self, buffer: Vec<f32>, shape: (usize, usize)) {
        debug_assert_eq!(buffer.len(), shape.0 * shape.1);
        self.data.push(buffer);
        self.shapes.push(shape);
    }

    pub fn num_buffers(&self) -> usize {
        self.data.len()
    }

    pub fn buffer(&self, index: usize) -> &[f32] {
        &self.data[index]
    }

    pub fn shape(&self, index: usize) -> (usize, usize) {
        self.shapes[index]
    }
}

impl Default for Observation {
    fn default() -> Self {
        Self::new()
    }
}

/// Projects the world into an [`Observation`] from one player's point
/// of view.
pub trait Encoder {
    fn encode(&self, player: &Player, world: &WorldState) -> Observation;
}

/// Encodes the entire world as variable-length entity lists.
///
/// Buffer order: pellets, viruses, foods, the observed player's own
/// cells, then one buffer per other player in ascending identifier
/// order. Non-cell buffers are `(n, 2)` position rows; cell buffers
/// are `(n, 5)` rows of `x, y, dx, dy, mass`.
pub struct FullEncoder;

impl Encoder for FullEncoder {
    fn encode(&self, player: &Player, world: &WorldState) -> Observation {
        let mut obs = Observation::new();
        obs.push(positions(world.pellets.iter().map(|p| (p.x, p.y))), (world.pellets.len(), 2));
        obs.push(positions(world.viruses.iter().map(|v| (v.x, v.y))), (world.viruses.len(), 2));
        obs.push(positions(world.foods.iter().map(|f| (f.x, f.y))), (world.foods.len(), 2));
        obs.push(cell_rows(player), (player.cells.len(), 5));
        for pid in world.sorted_pids() {
            if pid == player.pid {
                continue;
            }
            let other = &world.players[&pid];
            obs.push(cell_rows(other), (other.cells.len(), 5));
        }
        obs
    }
}

fn positions(coords: impl Iterator<Item = (f32, f32)>) -> Vec<f32> {
    let mut buffer = Vec::new();
    for (x, y) in coords {
        buffer.push(x);
        buffer.push(y);
    }
    buffer
}

fn cell_rows(player: &Player) -> Vec<f32> {
    let mut buffer = Vec::with_capacity(player.cells.len() * 5);
    for cell in &player.cells {
        buffer.extend_from_slice(&[
            cell.x,
            cell.y,
            cell.velocity.dx,
            cell.velocity.dy,
            cell.mass(),
        ]);
    }
    buffer
}

/// Which entity categories a [`GridEncoder`] rasterizes, and at what
/// resolution. Each enabled category contributes one
/// `grid_size x grid_size` mass-density buffer.
#[derive(Debug, Clone)]
pub struct GridConfig {
    pub grid_size: usize,
    /// Half-width of the square window centered on the observed
    /// player's centroid.
    pub view_radius: f32,
    pub observe_pellets: bool,
    pub observe_viruses: bool,
    pub observe_foods: bool,
    pub observe_cells: bool,
    pub observe_others: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            grid_size: 128,
            view_radius: 300.0,
            observe_pellets: true,
            observe_viruses: true,
            observe_foods: true,
            observe_cells: true,
            observe_others: true,
        }
    }
}

/// Encodes a fixed-size egocentric window: each enabled category is
/// rasterized into a square grid of summed entity mass, centered on
/// the observed player. A dead player observes all-zero grids.
pub struct GridEncoder {
    config: GridConfig,
}

impl GridEncoder {
    pub fn new(config: GridConfig) -> Self {
        GridEncoder { config }
    }

    fn rasterize(
        &self,
        center: Option<(f32, f32)>,
        entities: impl Iterator<Item = (f32, f32, f32)>,
    ) -> Vec<f32> {
        let size = self.config.grid_size;
        let mut grid = vec![0.0f32; size * size];
        let Some((cx, cy)) = center else {
            return grid;
        };
        let span = 2.0 * self.config.view_radius;
        for (x, y, mass) in entities {
            let fx = (x - cx + self.config.view_radius) / span;
            let fy = (y - cy + self.config.view_radius) / span;
            if !(0.0..1.0).contains(&fx) || !(0.0..1.0).contains(&fy) {
                continue;
            }
            let col = (fx * size as f32) as usize;
            let row = (fy * size as f32) as usize;
            grid[row * size + col] += mass;
        }
        grid
    }
}

impl Encoder for GridEncoder {
    fn encode(&self, player: &Player, world: &WorldState) -> Observation {
        let size = self.config.grid_size;
        let center = if player.dead() {
            None
        } else {
            Some((player.x(), player.y()))
        };

        let mut obs = Observation::new();
        if self.config.observe_pellets {
            let grid = self.rasterize(
                center,
                world.pellets.iter().map(|p| (p.x, p.y, p.mass())),
            );
            obs.push(grid, (size, size));
        }
        if self.config.observe_viruses {
            let grid = self.rasterize(
                center,
                world.viruses.iter().map(|v| (v.x, v.y, v.mass())),
            );
            obs.push(grid, (size, size));
        }
        if self.config.observe_foods {
            let grid = self.rasterize(
                center,
                world.foods.iter().map(|f| (f.x, f.y, f.mass())),
            );
            obs.push(grid, (size, size));
        }
        if self.config.observe_cells {
            let grid = self.rasterize(
                center,
                player.cells.iter().map(|c| (c.x, c.y, c.mass())),
            );
            obs.push(grid, (size, size));
        }
        if self.config.observe_others {
            let mut rows: Vec<(f32, f32, f32)> = Vec::new();
            for pid in world.sorted_pids() {
                if pid == player.pid {
                    continue;
                }
                for cell in &world.players[&pid].cells {
                    rows.push((cell.x, cell.y, cell.mass()));
                }
            }
            obs.push(self.rasterize(center, rows.into_iter()), (size, size));
        }
        obs
    }
}
