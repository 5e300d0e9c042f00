//! Agent Spawning
//!
//! Seeds the population (cooperators first, then defectors) with moral worth
//! drawn from a normal distribution and a random grid cell each.

use bevy_ecs::prelude::*;
use pgg_events::Archetype;

use crate::components::agent::{
    Agent, AgentBundle, ArchetypeTag, GridPos, InvestmentDecision, MoralWorth,
    PunishmentLedger, PunishmentProfile, Wealth,
};
use crate::components::world::Population;
use crate::config::GameConfig;
use crate::error::EngineError;
use crate::random::RandomSource;
use crate::spatial::SpatialIndex;

/// Explicit description of one agent to spawn
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSpec {
    pub archetype: Archetype,
    pub wealth: f64,
    pub moral_worth: i32,
    /// Random cell when None
    pub position: Option<GridPos>,
}

impl AgentSpec {
    pub fn new(archetype: Archetype, wealth: f64, moral_worth: i32) -> Self {
        Self {
            archetype,
            wealth,
            moral_worth,
            position: None,
        }
    }

    pub fn cooperator(wealth: f64, moral_worth: i32) -> Self {
        Self::new(Archetype::Cooperator, wealth, moral_worth)
    }

    pub fn defector(wealth: f64, moral_worth: i32) -> Self {
        Self::new(Archetype::Defector, wealth, moral_worth)
    }

    pub fn at(mut self, position: GridPos) -> Self {
        self.position = Some(position);
        self
    }
}

/// Counts after seeding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnSummary {
    pub cooperators: usize,
    pub defectors: usize,
    /// Agents whose initial moral worth had to be clamped into range
    pub clamped: usize,
}

impl SpawnSummary {
    pub fn total(&self) -> usize {
        self.cooperators + self.defectors
    }

    fn count(&mut self, archetype: Archetype) {
        match archetype {
            Archetype::Cooperator => self.cooperators += 1,
            Archetype::Defector => self.defectors += 1,
        }
    }
}

/// Spawn one agent with the next free id and register it everywhere
pub fn spawn_agent(
    world: &mut World,
    spec: &AgentSpec,
    rng: &mut dyn RandomSource,
    grid: &mut dyn SpatialIndex,
) -> Result<(Entity, bool), EngineError> {
    let id = world.resource::<Population>().next_id();
    let position = match spec.position {
        Some(position) => position,
        None => grid.random_cell(rng),
    };
    let (moral_worth, clamped) = MoralWorth::saturating(spec.moral_worth);
    if clamped {
        tracing::warn!(
            "Agent {} initial moral worth {} clamped to {}",
            id.0,
            spec.moral_worth,
            moral_worth.0
        );
    }

    grid.place(id, position)?;
    let probabilities = world.resource::<GameConfig>().punishment.probabilities;
    let entity = world
        .spawn(AgentBundle {
            agent: Agent,
            id,
            archetype: ArchetypeTag(spec.archetype),
            wealth: Wealth(spec.wealth),
            moral_worth,
            position,
            profile: PunishmentProfile(probabilities),
            ledger: PunishmentLedger::default(),
            decision: InvestmentDecision::default(),
        })
        .id();

    if let Err(e) = world.resource_mut::<Population>().insert(id, entity) {
        world.despawn(entity);
        grid.remove(id);
        return Err(e);
    }
    Ok((entity, clamped))
}

/// Spawn agents from explicit specs, in order
pub fn spawn_agents(
    world: &mut World,
    specs: &[AgentSpec],
    rng: &mut dyn RandomSource,
    grid: &mut dyn SpatialIndex,
) -> Result<SpawnSummary, EngineError> {
    let mut summary = SpawnSummary::default();
    for spec in specs {
        let (_, clamped) = spawn_agent(world, spec, rng, grid)?;
        summary.count(spec.archetype);
        if clamped {
            summary.clamped += 1;
        }
    }
    Ok(summary)
}

/// Specs for the configured population: cooperators, then defectors
pub fn population_specs(config: &GameConfig, rng: &mut dyn RandomSource) -> Vec<AgentSpec> {
    let population = &config.population;
    let mut draw = |archetype: Archetype| {
        let moral_worth = rng
            .normal(population.moral_worth_mean, population.moral_worth_sd)
            .round() as i32;
        AgentSpec::new(archetype, population.initial_wealth, moral_worth)
    };

    let mut specs: Vec<AgentSpec> = (0..population.num_cooperators)
        .map(|_| draw(Archetype::Cooperator))
        .collect();
    specs.extend((0..population.num_defectors()).map(|_| draw(Archetype::Defector)));
    specs
}

/// Spawn the configured population
pub fn spawn_population(
    world: &mut World,
    rng: &mut dyn RandomSource,
    grid: &mut dyn SpatialIndex,
) -> Result<SpawnSummary, EngineError> {
    let config = world.resource::<GameConfig>().clone();
    let specs = population_specs(&config, rng);
    let summary = spawn_agents(world, &specs, rng, grid)?;
    tracing::info!(
        "Seeded {} agents ({} cooperators, {} defectors)",
        summary.total(),
        summary.cooperators,
        summary.defectors
    );
    Ok(summary)
}
