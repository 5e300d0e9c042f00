//! Engine Errors

use bevy_ecs::entity::Entity;
use thiserror::Error;

use crate::config::ConfigError;

/// Lifecycle and placement failures inside the engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// An agent id is already live; indicates a lifecycle bug
    #[error("agent id {0} is already live")]
    IdCollision(u64),

    #[error("no live agent with id {0}")]
    UnknownAgent(u64),

    #[error("entity {0:?} is not an agent")]
    NotAnAgent(Entity),

    #[error("cell ({x}, {y}) is outside the grid")]
    OutOfBounds { x: u32, y: u32 },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
