//! Snapshot Types
//!
//! Read-only views of agents and the common pool handed to metrics
//! collectors, and the per-tick aggregate built from them.

use serde::{Deserialize, Serialize};

use crate::Archetype;

/// Lifetime punishment bookkeeping for one agent
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PunishmentTotals {
    pub altruistic_count: u32,
    pub antisocial_count: u32,
    pub altruistic_money_spent: f64,
    pub altruistic_money_lost: f64,
    pub antisocial_money_spent: f64,
    pub antisocial_money_lost: f64,
}

/// Plain state of one agent at a tick boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: u64,
    pub archetype: Archetype,
    pub wealth: f64,
    pub moral_worth: i32,
    pub position: (u32, u32),
    /// Investment recorded for the current tick, if the agent decided
    pub investment: Option<f64>,
    pub punishments: PunishmentTotals,
}

/// Common pool state
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolRecord {
    /// Accumulated investment over the run
    pub balance: f64,
    /// This tick's total investment
    pub investment: f64,
    /// Amount added to each agent this tick
    pub payoff_per_agent: f64,
}

/// Aggregates for one archetype
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeSummary {
    pub count: usize,
    pub average_wealth: f64,
    pub average_moral_worth: f64,
}

/// Model-level metrics for one tick
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickSnapshot {
    pub tick: u64,
    pub cooperators: ArchetypeSummary,
    pub defectors: ArchetypeSummary,
    pub population_average_wealth: f64,
    pub population_average_moral_worth: f64,
    pub altruistic_punishment_frequency: u32,
    pub antisocial_punishment_frequency: u32,
    pub altruistic_money_spent: f64,
    pub altruistic_money_lost: f64,
    pub antisocial_money_spent: f64,
    pub antisocial_money_lost: f64,
    pub common_pool_wealth: f64,
    pub punishments_this_tick: usize,
    pub transformations_this_tick: usize,
}

impl TickSnapshot {
    pub fn population(&self) -> usize {
        self.cooperators.count + self.defectors.count
    }
}
