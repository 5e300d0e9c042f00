//! Population Setup
//!
//! Agent spawning and placement.

pub mod agents;

pub use agents::*;
