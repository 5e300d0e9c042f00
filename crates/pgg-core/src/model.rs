//! Public Goods Game Model
//!
//! Owns the ECS world and the per-tick schedule. One `step` is one tick:
//! begin, order, decide, agent turns, collect, distribute, record, check.

use std::marker::PhantomData;

use bevy_ecs::prelude::*;
use pgg_events::{AgentRecord, GameEvent, PoolRecord};

use crate::components::agent::AgentId;
use crate::components::world::{ActivationOrder, CommonPool, Population, RunState, TickEvents};
use crate::config::GameConfig;
use crate::error::EngineError;
use crate::output::{capture_agents, record_metrics, MetricsCollector, StatsCollector};
use crate::random::{RandomSource, SeededSource, SimRng};
use crate::setup::{spawn_agents, spawn_population, AgentSpec, SpawnSummary};
use crate::spatial::{MultiGrid, SpatialGrid};
use crate::systems::{
    begin_tick, check_termination, collect_investment, decide_investments, distribute_payoff,
    run_agent_turns, shuffle_activation,
};

/// A seeded run of the spatial public-goods game
pub struct PublicGoodsGame<C = StatsCollector>
where
    C: MetricsCollector + Resource,
{
    world: World,
    schedule: Schedule,
    spawned: SpawnSummary,
    _collector: PhantomData<C>,
}

impl PublicGoodsGame<StatsCollector> {
    /// Configured population, seeded randomness, default collector
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, EngineError> {
        Self::with_source(config, SeededSource::new(seed))
    }

    pub fn with_source(
        config: GameConfig,
        source: impl RandomSource + 'static,
    ) -> Result<Self, EngineError> {
        Self::with_collector(config, source, StatsCollector::new())
    }

    /// Explicit agents instead of the configured population
    pub fn from_agents(
        config: GameConfig,
        source: impl RandomSource + 'static,
        agents: &[AgentSpec],
    ) -> Result<Self, EngineError> {
        Self::build(config, SimRng::new(source), StatsCollector::new(), Some(agents))
    }
}

impl<C> PublicGoodsGame<C>
where
    C: MetricsCollector + Resource,
{
    pub fn with_collector(
        config: GameConfig,
        source: impl RandomSource + 'static,
        collector: C,
    ) -> Result<Self, EngineError> {
        Self::build(config, SimRng::new(source), collector, None)
    }

    fn build(
        config: GameConfig,
        rng: SimRng,
        collector: C,
        agents: Option<&[AgentSpec]>,
    ) -> Result<Self, EngineError> {
        config.validate()?;

        let mut world = World::new();
        world.insert_resource(SpatialGrid::new(MultiGrid::from_config(&config.grid)));
        world.insert_resource(config);
        world.insert_resource(rng);
        world.insert_resource(RunState::new());
        world.insert_resource(CommonPool::new());
        world.insert_resource(Population::new());
        world.insert_resource(ActivationOrder::new());
        world.insert_resource(TickEvents::new());
        world.insert_resource(collector);

        let spawned = world.resource_scope(|world, mut rng: Mut<SimRng>| {
            world.resource_scope(|world, mut grid: Mut<SpatialGrid>| match agents {
                Some(specs) => spawn_agents(world, specs, rng.source(), grid.index_mut()),
                None => spawn_population(world, rng.source(), grid.index_mut()),
            })
        })?;

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                begin_tick,
                shuffle_activation,
                decide_investments,
                run_agent_turns,
                collect_investment,
                distribute_payoff,
                record_metrics::<C>,
                check_termination,
            )
                .chain(),
        );

        Ok(Self {
            world,
            schedule,
            spawned,
            _collector: PhantomData,
        })
    }

    /// Advance one tick; returns whether the run continues
    pub fn step(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.schedule.run(&mut self.world);
        self.is_running()
    }

    /// Step until termination; returns the last tick executed
    pub fn run(&mut self) -> u64 {
        while self.step() {}
        let tick = self.tick();
        tracing::info!("Run finished after {} ticks", tick);
        tick
    }

    pub fn tick(&self) -> u64 {
        self.world.resource::<RunState>().tick
    }

    pub fn is_running(&self) -> bool {
        self.world.resource::<RunState>().running
    }

    pub fn spawned(&self) -> SpawnSummary {
        self.spawned
    }

    pub fn pool(&self) -> PoolRecord {
        self.world.resource::<CommonPool>().record()
    }

    /// Every live agent, sorted by id
    pub fn agents(&mut self) -> Vec<AgentRecord> {
        capture_agents(&mut self.world)
    }

    pub fn agent(&mut self, id: u64) -> Option<AgentRecord> {
        self.agents().into_iter().find(|record| record.id == id)
    }

    pub fn population(&self) -> Vec<AgentId> {
        self.world.resource::<Population>().ids()
    }

    /// Events of the most recent tick
    pub fn events(&self) -> &[GameEvent] {
        &self.world.resource::<TickEvents>().events
    }

    pub fn collector(&self) -> &C {
        self.world.resource::<C>()
    }

    pub fn config(&self) -> &GameConfig {
        self.world.resource::<GameConfig>()
    }
}
