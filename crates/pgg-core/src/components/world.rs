//! World Resources
//!
//! Model-level state: run clock, common pool, live population registry,
//! activation order and the per-tick event buffer.

use bevy_ecs::prelude::*;
use pgg_events::{GameEvent, PoolRecord};
use std::collections::BTreeMap;

use super::agent::AgentId;
use crate::error::EngineError;

/// Run clock and termination flag
#[derive(Resource, Debug, Clone)]
pub struct RunState {
    /// Tick currently being (or last) simulated; 0 before the first step
    pub tick: u64,
    pub running: bool,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            tick: 0,
            running: true,
        }
    }
}

/// Shared pool all agents invest into
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct CommonPool {
    /// Accumulated investment over the run
    pub balance: f64,
    /// Total invested this tick
    pub investment: f64,
    /// Amount added to each agent's wealth this tick
    pub payoff_per_agent: f64,
}

impl CommonPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Book this tick's investment into the pool
    pub fn deposit(&mut self, investment: f64) {
        self.investment = investment;
        self.balance += investment;
    }

    /// Equal share of the multiplied investment for each of `population` agents
    pub fn payoff(&self, multiplier: f64, population: usize) -> f64 {
        if population == 0 {
            0.0
        } else {
            self.investment * multiplier / population as f64
        }
    }

    pub fn is_dissipated(&self) -> bool {
        self.balance <= 0.0
    }

    pub fn record(&self) -> PoolRecord {
        PoolRecord {
            balance: self.balance,
            investment: self.investment,
            payoff_per_agent: self.payoff_per_agent,
        }
    }
}

/// Registry of live agents; exactly one entity per id
#[derive(Resource, Debug, Default)]
pub struct Population {
    by_id: BTreeMap<AgentId, Entity>,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: AgentId, entity: Entity) -> Result<(), EngineError> {
        if self.by_id.contains_key(&id) {
            return Err(EngineError::IdCollision(id.0));
        }
        self.by_id.insert(id, entity);
        Ok(())
    }

    pub fn remove(&mut self, id: AgentId) -> Option<Entity> {
        self.by_id.remove(&id)
    }

    pub fn get(&self, id: AgentId) -> Option<Entity> {
        self.by_id.get(&id).copied()
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Next unused id, 1-based
    pub fn next_id(&self) -> AgentId {
        AgentId(self.by_id.keys().next_back().map_or(1, |id| id.0 + 1))
    }

    /// Entities in ascending id order
    pub fn entities(&self) -> Vec<Entity> {
        self.by_id.values().copied().collect()
    }

    pub fn ids(&self) -> Vec<AgentId> {
        self.by_id.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Order in which agents act during the current tick
#[derive(Resource, Debug, Clone, Default)]
pub struct ActivationOrder {
    pub entities: Vec<Entity>,
}

impl ActivationOrder {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Events generated during the current tick
#[derive(Resource, Debug, Default)]
pub struct TickEvents {
    pub events: Vec<GameEvent>,
}

impl TickEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
