//! Metrics Collection
//!
//! Once per tick the engine captures plain agent and pool state into a
//! `MetricsFrame` and hands it to the installed `MetricsCollector`. The
//! engine itself computes no aggregates; `StatsCollector` is the default
//! collector and derives the usual population reporters.

use bevy_ecs::prelude::*;
use pgg_events::{AgentRecord, Archetype, ArchetypeSummary, GameEvent, PoolRecord, TickSnapshot};

use crate::components::agent::{
    Agent, AgentId, ArchetypeTag, GridPos, InvestmentDecision, MoralWorth, PunishmentLedger, Wealth,
};
use crate::components::world::{CommonPool, RunState, TickEvents};

/// Everything a collector may read about one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsFrame {
    pub tick: u64,
    pub pool: PoolRecord,
    /// Sorted by id
    pub agents: Vec<AgentRecord>,
    pub events: Vec<GameEvent>,
}

/// External collaborator fed once per tick
pub trait MetricsCollector: Send + Sync + 'static {
    fn collect(&mut self, frame: &MetricsFrame);
}

/// Plain records for every live agent, sorted by id
pub fn capture_agents(world: &mut World) -> Vec<AgentRecord> {
    let tick = world.resource::<RunState>().tick;
    let mut query = world.query_filtered::<(
        &AgentId,
        &ArchetypeTag,
        &Wealth,
        &MoralWorth,
        &GridPos,
        &PunishmentLedger,
        &InvestmentDecision,
    ), With<Agent>>();

    let mut records: Vec<AgentRecord> = query
        .iter(world)
        .map(
            |(id, archetype, wealth, moral_worth, position, ledger, decision)| AgentRecord {
                id: id.0,
                archetype: archetype.0,
                wealth: wealth.0,
                moral_worth: moral_worth.0,
                position: (position.x, position.y),
                investment: decision.for_tick(tick).map(|investment| investment.amount),
                punishments: *ledger.totals(),
            },
        )
        .collect();
    records.sort_by_key(|record| record.id);
    records
}

pub fn capture_frame(world: &mut World) -> MetricsFrame {
    let agents = capture_agents(world);
    MetricsFrame {
        tick: world.resource::<RunState>().tick,
        pool: world.resource::<CommonPool>().record(),
        agents,
        events: world.resource::<TickEvents>().events.clone(),
    }
}

/// System: feed the current tick to collector `C`
pub fn record_metrics<C: MetricsCollector + Resource>(world: &mut World) {
    let frame = capture_frame(world);
    world.resource_mut::<C>().collect(&frame);
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn archetype_summary(agents: &[AgentRecord], archetype: Archetype) -> ArchetypeSummary {
    let members: Vec<&AgentRecord> = agents.iter().filter(|a| a.archetype == archetype).collect();
    ArchetypeSummary {
        count: members.len(),
        average_wealth: mean(members.iter().map(|a| a.wealth)),
        average_moral_worth: mean(members.iter().map(|a| a.moral_worth as f64)),
    }
}

/// Derive the population reporters from one frame
pub fn summarize(frame: &MetricsFrame) -> TickSnapshot {
    let agents = &frame.agents;
    let totals = agents.iter().map(|a| &a.punishments);

    let mut snapshot = TickSnapshot {
        tick: frame.tick,
        cooperators: archetype_summary(agents, Archetype::Cooperator),
        defectors: archetype_summary(agents, Archetype::Defector),
        population_average_wealth: mean(agents.iter().map(|a| a.wealth)),
        population_average_moral_worth: mean(agents.iter().map(|a| a.moral_worth as f64)),
        common_pool_wealth: frame.pool.balance,
        punishments_this_tick: frame.events.iter().filter(|e| e.is_punishment()).count(),
        transformations_this_tick: frame.events.iter().filter(|e| e.is_transformation()).count(),
        ..TickSnapshot::default()
    };

    for t in totals {
        snapshot.altruistic_punishment_frequency += t.altruistic_count;
        snapshot.antisocial_punishment_frequency += t.antisocial_count;
        snapshot.altruistic_money_spent += t.altruistic_money_spent;
        snapshot.altruistic_money_lost += t.altruistic_money_lost;
        snapshot.antisocial_money_spent += t.antisocial_money_spent;
        snapshot.antisocial_money_lost += t.antisocial_money_lost;
    }

    snapshot
}

/// Default collector: keeps one `TickSnapshot` per tick
#[derive(Resource, Debug, Default)]
pub struct StatsCollector {
    history: Vec<TickSnapshot>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[TickSnapshot] {
        &self.history
    }

    pub fn latest(&self) -> Option<&TickSnapshot> {
        self.history.last()
    }
}

impl MetricsCollector for StatsCollector {
    fn collect(&mut self, frame: &MetricsFrame) {
        self.history.push(summarize(frame));
    }
}
