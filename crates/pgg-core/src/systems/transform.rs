//! Archetype Transformation
//!
//! A defector that invested more than the fixed loss becomes a cooperator; a
//! cooperator that invested no more than the fixed loss becomes a defector.
//! The change happens in place on the same entity, so the id and wealth carry
//! over and no second representation of the agent ever exists.

use bevy_ecs::prelude::*;
use pgg_events::{Archetype, GameEvent};

use crate::components::agent::{
    AgentId, ArchetypeTag, GridPos, MoralWorth, PunishmentLedger, Wealth,
};
use crate::error::EngineError;
use crate::random::RandomSource;
use crate::spatial::SpatialIndex;

/// Archetype an agent should switch to after investing `investment`
pub fn transformation_target(
    archetype: Archetype,
    investment: f64,
    fixed_loss: f64,
) -> Option<Archetype> {
    let flips = match archetype {
        Archetype::Defector => investment > fixed_loss,
        Archetype::Cooperator => investment <= fixed_loss,
    };
    flips.then(|| archetype.opposite())
}

/// Flip `entity` to `target`.
///
/// Counters are reset and moral worth starts over at 0, as for a freshly
/// created agent of the new archetype. The agent is relocated to a random
/// cell.
pub fn transform_agent(
    world: &mut World,
    entity: Entity,
    target: Archetype,
    tick: u64,
    rng: &mut dyn RandomSource,
    grid: &mut dyn SpatialIndex,
) -> Result<GameEvent, EngineError> {
    let id = *world
        .get::<AgentId>(entity)
        .ok_or(EngineError::NotAnAgent(entity))?;
    let from = world
        .get::<ArchetypeTag>(entity)
        .map(|tag| tag.0)
        .ok_or(EngineError::UnknownAgent(id.0))?;
    let wealth = world.get::<Wealth>(entity).map_or(0.0, |w| w.0);

    let cell = grid.random_cell(rng);
    grid.move_agent(id, cell)?;

    let mut agent = world.entity_mut(entity);
    agent.insert((ArchetypeTag(target), MoralWorth(0), GridPos::new(cell.x, cell.y)));
    if let Some(mut ledger) = agent.get_mut::<PunishmentLedger>() {
        ledger.reset();
    }

    tracing::debug!(
        "Tick {}: agent {} transformed {} -> {} (wealth {:.2})",
        tick,
        id.0,
        from,
        target,
        wealth
    );

    Ok(GameEvent::Transformation {
        tick,
        agent: id.0,
        from,
        to: target,
        wealth,
    })
}
