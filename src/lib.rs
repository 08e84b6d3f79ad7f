//! An agar.io-style multiplayer cell-growth arena packaged as a
//! reinforcement-learning environment.
//!
//! The [`engine`] module owns the simulation: players made of circular
//! cells move, split, eject and eat across a square arena populated
//! with pellets and viruses, advanced one deterministic frame at a
//! time. [`env::Environment`] wraps that engine in an episodic
//! reset/step interface where one player is controlled externally and
//! the rest are driven by the [`bots`] strategies, with rewards equal
//! to the change in the controlled player's mass. Observations come
//! from pluggable [`observation`] encoders and headless rendering
//! hooks live in [`render`].

pub mod bots;
pub mod engine;
pub mod env;
pub mod error;
pub mod observation;
pub mod render;

pub use engine::{Act, Action, Engine, EngineConfig, Pid};
pub use env::{Environment, Status};
pub use error::{EnvError, Result};
pub use observation::{Encoder, FullEncoder, GridConfig, GridEncoder, Observation};
pub use render::{Camera, NoopRenderer, Renderer};
