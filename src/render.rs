//! Rendering hooks. The simulation itself draws nothing; it exposes a
//! camera that tracks a player and hands read-only world snapshots to
//! whatever [`Renderer`] the embedder plugs in.

use crate::engine::{Player, WorldState};

/// A viewport tracking some point in the arena. Zoom widens as the
/// followed player grows so its cells stay in frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub center_x: f32,
    pub center_y: f32,
    /// World units visible across the viewport.
    pub zoom: f32,
}

impl Camera {
    pub fn new() -> Self {
        Camera { center_x: 0.0, center_y: 0.0, zoom: Camera::BASE_ZOOM }
    }

    const BASE_ZOOM: f32 = 300.0;

    /// Re-center on the player's centroid. A dead player leaves the
    /// camera where it was.
    pub fn follow(&mut self, player: &Player) {
        if player.dead() {
            return;
        }
        self.center_x = player.x();
        self.center_y = player.y();
        self.zoom = Camera::BASE_ZOOM + player.total_mass().sqrt() * 10.0;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

/// Sink for drawing one frame. Implementations own their windowing or
/// encoding concerns; the simulation only calls `render`.
pub trait Renderer {
    fn render(&mut self, camera: &Camera, world: &WorldState);
}

/// Discards every frame. The default for headless training.
pub struct NoopRenderer;

impl Renderer for NoopRenderer {
    fn render(&mut self, _camera: &Camera, _world: &WorldState) {}
}
