//! Punishment Protocol
//!
//! Pairwise interaction between the acting agent and one opponent. A higher
//! investor may punish the lower one (altruistic), a lower investor may
//! punish the higher one (antisocial). Equal investments never punish.

use bevy_ecs::prelude::*;
use pgg_events::{GameEvent, PunishmentKind};

use crate::components::agent::{
    AgentId, GridPos, InvestmentDecision, PunishmentLedger, PunishmentProfile, Wealth,
};
use crate::components::world::Population;
use crate::config::{OpponentScope, PunishmentConfig, PunishmentProbabilities};
use crate::random::RandomSource;
use crate::spatial::SpatialIndex;

/// A punishment that fired
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PunishmentOutcome {
    pub kind: PunishmentKind,
    /// Absolute investment difference
    pub gap: f64,
}

/// Decide whether an agent investing `own` punishes one investing `other`.
///
/// When the investments differ, exactly two uniforms are drawn: one against
/// the minor-gap threshold and one against the major-gap threshold. Equal
/// investments draw nothing.
pub fn resolve_punishment(
    own: f64,
    other: f64,
    config: &PunishmentConfig,
    probabilities: &PunishmentProbabilities,
    rng: &mut dyn RandomSource,
) -> Option<PunishmentOutcome> {
    if own == other {
        return None;
    }

    let (kind, gap, minor_threshold, major_threshold) = if own > other {
        (
            PunishmentKind::Altruistic,
            own - other,
            probabilities.altruistic_minor,
            probabilities.altruistic_major,
        )
    } else {
        (
            PunishmentKind::Antisocial,
            other - own,
            probabilities.antisocial_minor,
            probabilities.antisocial_major,
        )
    };

    let minor_draw = rng.uniform();
    let major_draw = rng.uniform();

    let fires = (config.minor_gap.contains(gap) && minor_draw <= minor_threshold)
        || (config.major_gap.contains(gap) && major_draw <= major_threshold);

    fires.then_some(PunishmentOutcome { kind, gap })
}

/// Pick one opponent uniformly from `candidates`, never `actor`
pub fn select_opponent(
    actor: AgentId,
    candidates: &[AgentId],
    rng: &mut dyn RandomSource,
) -> Option<AgentId> {
    let others: Vec<AgentId> = candidates
        .iter()
        .copied()
        .filter(|id| *id != actor)
        .collect();
    if others.is_empty() {
        return None;
    }
    Some(others[rng.index(others.len())])
}

/// Candidate opponents for `actor`, sorted by id
fn opponent_candidates(
    world: &World,
    scope: OpponentScope,
    actor: Entity,
    grid: &dyn SpatialIndex,
) -> Vec<AgentId> {
    let population = world.resource::<Population>();
    match scope {
        OpponentScope::Population => population.ids(),
        OpponentScope::Neighborhood => world
            .get::<GridPos>(actor)
            .map(|pos| {
                grid.neighbors_of(*pos)
                    .into_iter()
                    .filter(|id| population.contains(*id))
                    .collect()
            })
            .unwrap_or_default(),
    }
}

/// Run the punishment protocol for `actor` against one opponent.
///
/// Returns the event when a punishment fired.
pub fn punish_opponent(
    world: &mut World,
    actor: Entity,
    tick: u64,
    config: &PunishmentConfig,
    rng: &mut dyn RandomSource,
    grid: &dyn SpatialIndex,
) -> Option<GameEvent> {
    let actor_id = *world.get::<AgentId>(actor)?;
    let candidates = opponent_candidates(world, config.opponent_scope, actor, grid);

    let Some(opponent_id) = select_opponent(actor_id, &candidates, rng) else {
        tracing::trace!("Agent {} has no opponent this tick", actor_id.0);
        return None;
    };
    let opponent = world.resource::<Population>().get(opponent_id)?;

    let own = world
        .get::<InvestmentDecision>(actor)
        .and_then(|d| d.for_tick(tick));
    let other = world
        .get::<InvestmentDecision>(opponent)
        .and_then(|d| d.for_tick(tick));
    let (Some(own), Some(other)) = (own, other) else {
        tracing::warn!(
            "Skipping punishment between {} and {}: missing decision for tick {}",
            actor_id.0,
            opponent_id.0,
            tick
        );
        return None;
    };

    let probabilities = world
        .get::<PunishmentProfile>(actor)
        .map(|profile| profile.0)
        .unwrap_or(config.probabilities);

    let outcome = resolve_punishment(own.amount, other.amount, config, &probabilities, rng)?;

    let cost = config.cost_punish_agent;
    let fine = config.agent_punishment;

    if let Some(mut wealth) = world.get_mut::<Wealth>(actor) {
        wealth.0 -= cost;
    }
    if let Some(mut ledger) = world.get_mut::<PunishmentLedger>(actor) {
        ledger.record(outcome.kind, cost, fine);
    }
    if let Some(mut wealth) = world.get_mut::<Wealth>(opponent) {
        wealth.0 -= fine;
    }

    tracing::debug!(
        "Tick {}: agent {} {:?}-punished agent {} (gap {:.1})",
        tick,
        actor_id.0,
        outcome.kind,
        opponent_id.0,
        outcome.gap
    );

    Some(GameEvent::Punishment {
        tick,
        punisher: actor_id.0,
        target: opponent_id.0,
        kind: outcome.kind,
        gap: outcome.gap,
        cost,
        fine,
    })
}
