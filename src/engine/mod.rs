//! The arena simulation: entities, players, world state, the spatial
//! index and the frame-stepped engine.

pub mod config;
pub mod entity;
pub mod game;
pub mod player;
pub mod spatial;
pub mod world;

pub use config::{mass_to_radius, speed_for_mass, EngineConfig};
pub use entity::{Cell, Food, Pellet, Velocity, Virus};
pub use game::Engine;
pub use player::{Act, Action, Pid, Player};
pub use spatial::{EntityKind, SpatialEntry, SpatialGrid};
pub use world::WorldState;
