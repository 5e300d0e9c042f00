//! Movement
//!
//! Agents step to a random cell of their Moore neighborhood at the start of
//! their turn.

use bevy_ecs::prelude::*;

use crate::components::agent::{AgentId, GridPos};
use crate::error::EngineError;
use crate::random::RandomSource;
use crate::spatial::SpatialIndex;

/// Move `entity` to a random neighboring cell, returning where it ended up
pub fn wander(
    world: &mut World,
    entity: Entity,
    rng: &mut dyn RandomSource,
    grid: &mut dyn SpatialIndex,
) -> Result<GridPos, EngineError> {
    let id = *world
        .get::<AgentId>(entity)
        .ok_or(EngineError::NotAnAgent(entity))?;
    let pos = grid.position_of(id).ok_or(EngineError::UnknownAgent(id.0))?;

    let cells = grid.neighborhood(pos);
    if cells.is_empty() {
        return Ok(pos);
    }
    let next = cells[rng.index(cells.len())];
    grid.move_agent(id, next)?;
    if let Some(mut position) = world.get_mut::<GridPos>(entity) {
        *position = next;
    }
    Ok(next)
}
