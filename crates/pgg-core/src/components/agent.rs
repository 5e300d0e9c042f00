//! Agent Components
//!
//! One entity per agent. The archetype is a tag component, so a
//! transformation rewrites components in place and the entity (and its id)
//! never changes.

use bevy_ecs::prelude::*;
use pgg_events::{Archetype, PunishmentKind, PunishmentTotals};
use serde::{Deserialize, Serialize};

use crate::config::PunishmentProbabilities;
use crate::policy::{clamp_moral_worth, in_band_range};

/// Marker component identifying an entity as an agent
#[derive(Component, Debug, Clone, Default)]
pub struct Agent;

/// Stable identifier, preserved across archetype transformation
#[derive(
    Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct AgentId(pub u64);

/// Current archetype of an agent
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchetypeTag(pub Archetype);

/// Balance; punishments may drive it negative
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct Wealth(pub f64);

/// Running score of investment history, kept within `[-20, 20]`
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoralWorth(pub i32);

impl MoralWorth {
    /// Build from any value, saturating into the banded range.
    /// Returns the value and whether clamping was needed.
    pub fn saturating(value: i32) -> (Self, bool) {
        (Self(clamp_moral_worth(value)), !in_band_range(value))
    }

    /// Apply a ledger delta, saturating at the band limits
    pub fn apply(&mut self, delta: i32) -> i32 {
        self.0 = clamp_moral_worth(self.0.saturating_add(delta));
        self.0
    }
}

/// Thresholds the agent's punishment draws are compared against
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct PunishmentProfile(pub PunishmentProbabilities);

/// Lifetime punishment counters
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct PunishmentLedger(pub PunishmentTotals);

impl PunishmentLedger {
    /// Record one punishment this agent administered
    pub fn record(&mut self, kind: PunishmentKind, cost: f64, fine: f64) {
        let totals = &mut self.0;
        match kind {
            PunishmentKind::Altruistic => {
                totals.altruistic_count += 1;
                totals.altruistic_money_spent += cost;
                totals.altruistic_money_lost += fine;
            }
            PunishmentKind::Antisocial => {
                totals.antisocial_count += 1;
                totals.antisocial_money_spent += cost;
                totals.antisocial_money_lost += fine;
            }
        }
    }

    pub fn reset(&mut self) {
        self.0 = PunishmentTotals::default();
    }

    pub fn totals(&self) -> &PunishmentTotals {
        &self.0
    }
}

/// Grid cell an agent occupies
#[derive(
    Component, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GridPos {
    pub x: u32,
    pub y: u32,
}

impl GridPos {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// The investment an agent settled on for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Investment {
    pub tick: u64,
    pub probability: f64,
    /// Either the contribution amount or the fixed loss
    pub amount: f64,
    pub contributed: bool,
}

/// Per-tick decision record, written once by the decision system and read by
/// every later step of that tick
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct InvestmentDecision(pub Option<Investment>);

impl InvestmentDecision {
    /// Investment recorded for `tick`, if any
    pub fn for_tick(&self, tick: u64) -> Option<Investment> {
        self.0.filter(|investment| investment.tick == tick)
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }
}

/// Components every agent is spawned with
#[derive(Bundle)]
pub struct AgentBundle {
    pub agent: Agent,
    pub id: AgentId,
    pub archetype: ArchetypeTag,
    pub wealth: Wealth,
    pub moral_worth: MoralWorth,
    pub position: GridPos,
    pub profile: PunishmentProfile,
    pub ledger: PunishmentLedger,
    pub decision: InvestmentDecision,
}
