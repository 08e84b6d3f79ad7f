//! Entity value types: cells, pellets, viruses and ejected food.
//!
//! These carry only state and invariant-preserving accessors; all
//! behavior (movement, consumption, splitting) lives in the engine.

use super::config::{mass_to_radius, BOOST_DECAY};

/// A 2D velocity in distance units per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Velocity {
    pub dx: f32,
    pub dy: f32,
}

impl Velocity {
    pub fn new(dx: f32, dy: f32) -> Self {
        Velocity { dx, dy }
    }

    pub fn magnitude(&self) -> f32 {
        (self.dx * self.dx + self.dy * self.dy).sqrt()
    }

    /// Shrink toward zero by the per-frame boost decay factor.
    pub fn decay(&mut self) {
        self.dx *= BOOST_DECAY;
        self.dy *= BOOST_DECAY;
        if self.magnitude() < 0.01 {
            self.dx = 0.0;
            self.dy = 0.0;
        }
    }
}

/// A single circular mass-bearing unit belonging to a player.
#[derive(Clone, Debug)]
pub struct Cell {
    pub x: f32,
    pub y: f32,
    mass: f32,
    /// Steering velocity applied last frame (toward the owner's target).
    pub velocity: Velocity,
    /// Impulse from a split or virus pop; decays each frame.
    pub boost: Velocity,
    /// Frames remaining before this cell may merge with a sibling.
    pub merge_cooldown: u32,
}

impl Cell {
    pub fn new(x: f32, y: f32, mass: f32) -> Self {
        debug_assert!(mass > 0.0, "cell constructed with non-positive mass");
        Cell {
            x,
            y,
            mass: mass.max(f32::MIN_POSITIVE),
            velocity: Velocity::default(),
            boost: Velocity::default(),
            merge_cooldown: 0,
        }
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn radius(&self) -> f32 {
        mass_to_radius(self.mass)
    }

    /// Increase mass by the given (positive) amount.
    pub fn add_mass(&mut self, amount: f32) {
        debug_assert!(amount >= 0.0, "negative mass gain");
        self.mass += amount.max(0.0);
    }

    /// Set mass directly. Values at or below zero are a programming
    /// defect: fatal in debug builds, clamped in release so the frame
    /// still reaches a consistent state.
    pub fn set_mass(&mut self, mass: f32) {
        debug_assert!(mass > 0.0, "cell mass driven to {mass}");
        if mass <= 0.0 {
            tracing::warn!(mass, "clamping non-positive cell mass");
        }
        self.mass = mass.max(f32::MIN_POSITIVE);
    }

    /// Center distance to another entity position.
    pub fn distance_to(&self, x: f32, y: f32) -> f32 {
        let dx = self.x - x;
        let dy = self.y - y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Whether this cell's circle overlaps a circle of `radius` at (x, y).
    pub fn overlaps(&self, x: f32, y: f32, radius: f32) -> bool {
        self.distance_to(x, y) < self.radius() + radius
    }
}

/// A small passive always-edible entity scattered across the arena.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pellet {
    pub x: f32,
    pub y: f32,
}

impl Pellet {
    pub fn new(x: f32, y: f32) -> Self {
        Pellet { x, y }
    }

    pub fn mass(&self) -> f32 {
        super::config::PELLET_MASS
    }

    pub fn radius(&self) -> f32 {
        mass_to_radius(self.mass())
    }
}

/// Mass ejected by a player cell. Edible like a pellet, but carries a
/// launch boost for a few frames after ejection.
#[derive(Clone, Copy, Debug)]
pub struct Food {
    pub x: f32,
    pub y: f32,
    pub boost: Velocity,
}

impl Food {
    pub fn new(x: f32, y: f32) -> Self {
        Food {
            x,
            y,
            boost: Velocity::default(),
        }
    }

    pub fn mass(&self) -> f32 {
        super::config::FOOD_MASS
    }

    pub fn radius(&self) -> f32 {
        mass_to_radius(self.mass())
    }
}

/// An entity that fragments a sufficiently large consuming cell
/// instead of being absorbed.
#[derive(Clone, Copy, Debug)]
pub struct Virus {
    pub x: f32,
    pub y: f32,
}

impl Virus {
    pub fn new(x: f32, y: f32) -> Self {
        Virus { x, y }
    }

    pub fn mass(&self) -> f32 {
        super::config::VIRUS_MASS
    }

    pub fn radius(&self) -> f32 {
        mass_to_radius(self.mass())
    }
}
