use thiserror::Error;

use crate::engine::Pid;

/// Errors surfaced at the environment/engine API boundary.
///
/// Simulation internals never error during normal play: a frame always
/// reaches a consistent world state. These variants cover only misuse of
/// the API surface (bad identifiers, bad call ordering, bad construction
/// parameters).
#[derive(Debug, Error, PartialEq)]
pub enum EnvError {
    /// No player with the given identifier exists.
    #[error("no such player: {0}")]
    NotFound(Pid),

    /// An API call was made in a state that forbids it,
    /// e.g. `step()` after the episode terminated.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// Out-of-range construction parameters, e.g. a zero-sized arena.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, EnvError>;
