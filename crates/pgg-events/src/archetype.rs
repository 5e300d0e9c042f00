//! Behavioral archetypes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Behavioral category governing which contribution table an agent uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Cooperator,
    Defector,
}

impl Archetype {
    /// The archetype an agent flips to on transformation.
    pub fn opposite(&self) -> Archetype {
        match self {
            Archetype::Cooperator => Archetype::Defector,
            Archetype::Defector => Archetype::Cooperator,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Archetype::Cooperator => "cooperator",
            Archetype::Defector => "defector",
        }
    }

    /// Returns all archetype variants.
    pub fn all() -> &'static [Archetype] {
        &[Archetype::Cooperator, Archetype::Defector]
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
