//! Spatial public-goods game engine.
//!
//! Agents on a grid decide each tick whether to invest in a common pool,
//! punish an opponent whose investment differs from their own, and may switch
//! between cooperator and defector depending on what they invested. Built on
//! bevy_ecs: agents are entities, the pool and grid are resources, and one
//! tick is one run of a chained schedule.

pub mod components;
pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod policy;
pub mod random;
pub mod setup;
pub mod spatial;
pub mod systems;

pub use config::{ConfigError, GameConfig};
pub use error::EngineError;
pub use model::PublicGoodsGame;
pub use output::{MetricsCollector, MetricsFrame, StatsCollector};
pub use random::{RandomSource, ScriptedSource, SeededSource};
pub use setup::AgentSpec;
pub use spatial::{MultiGrid, SpatialIndex};

pub use pgg_events as events;
