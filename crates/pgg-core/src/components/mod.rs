//! ECS Components
//!
//! Agent components and the world-level resources the systems share.

pub mod agent;
pub mod world;

pub use agent::*;
pub use world::*;
