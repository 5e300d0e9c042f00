//! Agent Turns
//!
//! Each agent, in activation order: move, punish one opponent, maybe change
//! archetype, then update moral worth from this tick's investment. Later
//! agents see the wealth and archetype changes made by earlier ones.

use bevy_ecs::prelude::*;
use pgg_events::GameEvent;

use super::moral_worth::update_moral_worth;
use super::movement::wander;
use super::punishment::punish_opponent;
use super::transform::{transform_agent, transformation_target};
use crate::components::agent::{ArchetypeTag, InvestmentDecision, MoralWorth};
use crate::components::world::{ActivationOrder, RunState, TickEvents};
use crate::config::GameConfig;
use crate::random::{RandomSource, SimRng};
use crate::spatial::{SpatialGrid, SpatialIndex};

/// System: run every agent's turn for the current tick
pub fn run_agent_turns(world: &mut World) {
    let order = world.resource::<ActivationOrder>().entities.clone();
    let config = world.resource::<GameConfig>().clone();
    let tick = world.resource::<RunState>().tick;

    world.resource_scope(|world, mut rng: Mut<SimRng>| {
        world.resource_scope(|world, mut grid: Mut<SpatialGrid>| {
            for entity in order {
                let events = take_turn(
                    world,
                    entity,
                    tick,
                    &config,
                    rng.source(),
                    grid.index_mut(),
                );
                world.resource_mut::<TickEvents>().events.extend(events);
            }
        });
    });
}

/// One agent's turn; returns the events it produced.
///
/// Every live agent takes a full turn regardless of wealth, so moral worth
/// is updated exactly once per agent per tick even when wealth is <= 0.
pub fn take_turn(
    world: &mut World,
    entity: Entity,
    tick: u64,
    config: &GameConfig,
    rng: &mut dyn RandomSource,
    grid: &mut dyn SpatialIndex,
) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let fixed_loss = config.payoff.fixed_loss;

    if let Err(e) = wander(world, entity, rng, grid) {
        tracing::warn!("Skipping turn for {:?}: {}", entity, e);
        return events;
    }

    if let Some(event) = punish_opponent(world, entity, tick, &config.punishment, rng, &*grid) {
        events.push(event);
    }

    let Some(investment) = world
        .get::<InvestmentDecision>(entity)
        .and_then(|decision| decision.for_tick(tick))
    else {
        tracing::warn!("Agent {:?} has no decision for tick {}", entity, tick);
        return events;
    };

    let target = world
        .get::<ArchetypeTag>(entity)
        .and_then(|tag| transformation_target(tag.0, investment.amount, fixed_loss));
    if let Some(target) = target {
        match transform_agent(world, entity, target, tick, rng, grid) {
            Ok(event) => events.push(event),
            Err(e) => tracing::warn!("Transformation of {:?} skipped: {}", entity, e),
        }
    }

    if let Some(mut moral_worth) = world.get_mut::<MoralWorth>(entity) {
        update_moral_worth(&mut moral_worth, investment.amount, &config.ledger, fixed_loss);
    }

    events
}
