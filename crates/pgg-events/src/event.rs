//! Event Types
//!
//! Interaction events emitted by the engine during a tick.

use serde::{Deserialize, Serialize};

use crate::Archetype;

/// Direction of a punishment relative to the investment gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PunishmentKind {
    /// The punisher invested more than the target
    Altruistic,
    /// The punisher invested less than the target
    Antisocial,
}

/// Something that happened between agents during a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    Punishment {
        tick: u64,
        punisher: u64,
        target: u64,
        kind: PunishmentKind,
        /// Absolute investment difference that triggered the punishment
        gap: f64,
        /// Wealth paid by the punisher
        cost: f64,
        /// Wealth taken from the target
        fine: f64,
    },
    Transformation {
        tick: u64,
        agent: u64,
        from: Archetype,
        to: Archetype,
        /// Wealth carried across, unchanged
        wealth: f64,
    },
}

impl GameEvent {
    pub fn tick(&self) -> u64 {
        match self {
            GameEvent::Punishment { tick, .. } | GameEvent::Transformation { tick, .. } => *tick,
        }
    }

    /// Agents involved, initiator first.
    pub fn participants(&self) -> Vec<u64> {
        match self {
            GameEvent::Punishment {
                punisher, target, ..
            } => vec![*punisher, *target],
            GameEvent::Transformation { agent, .. } => vec![*agent],
        }
    }

    pub fn is_punishment(&self) -> bool {
        matches!(self, GameEvent::Punishment { .. })
    }

    pub fn is_transformation(&self) -> bool {
        matches!(self, GameEvent::Transformation { .. })
    }
}
