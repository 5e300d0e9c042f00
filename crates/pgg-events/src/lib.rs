//! Shared data contracts for the spatial public-goods game.
//!
//! This crate contains pure data structures with no simulation logic.
//! External collaborators (metrics collectors, analysis tooling) depend on it
//! instead of on the engine.

pub mod archetype;
pub mod event;
pub mod snapshot;

pub use archetype::Archetype;
pub use event::{GameEvent, PunishmentKind};
pub use snapshot::{AgentRecord, ArchetypeSummary, PoolRecord, PunishmentTotals, TickSnapshot};
