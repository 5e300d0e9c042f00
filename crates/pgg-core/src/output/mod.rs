//! Output
//!
//! Read-only views of the model handed to metrics collectors.

pub mod stats;

pub use stats::*;
