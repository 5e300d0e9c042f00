//! Contribution Policy
//!
//! Maps an agent's archetype and moral worth to the probability of
//! contributing and the amount contributed. Both are step functions over five
//! contiguous moral-worth bands.

use pgg_events::Archetype;

use crate::config::{ContributionTable, PolicyConfig};

/// Lowest moral worth the policy distinguishes
pub const MORAL_WORTH_MIN: i32 = -20;
/// Highest moral worth the policy distinguishes
pub const MORAL_WORTH_MAX: i32 = 20;
/// Number of moral-worth bands
pub const BAND_COUNT: usize = 5;

/// Moral-worth band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WorthBand {
    /// `[-20, -11]`
    Shunned,
    /// `[-10, -1]`
    Doubted,
    /// `{0}`
    Neutral,
    /// `[1, 10]`
    Trusted,
    /// `[11, 20]`
    Esteemed,
}

impl WorthBand {
    /// Band containing `moral_worth`. Values beyond `[-20, 20]` saturate to
    /// the outermost band.
    pub fn of(moral_worth: i32) -> Self {
        match clamp_moral_worth(moral_worth) {
            -20..=-11 => WorthBand::Shunned,
            -10..=-1 => WorthBand::Doubted,
            0 => WorthBand::Neutral,
            1..=10 => WorthBand::Trusted,
            _ => WorthBand::Esteemed,
        }
    }

    /// Column in a contribution table
    pub fn index(&self) -> usize {
        match self {
            WorthBand::Shunned => 0,
            WorthBand::Doubted => 1,
            WorthBand::Neutral => 2,
            WorthBand::Trusted => 3,
            WorthBand::Esteemed => 4,
        }
    }
}

pub fn clamp_moral_worth(moral_worth: i32) -> i32 {
    moral_worth.clamp(MORAL_WORTH_MIN, MORAL_WORTH_MAX)
}

/// Whether `moral_worth` lies inside the banded range
pub fn in_band_range(moral_worth: i32) -> bool {
    (MORAL_WORTH_MIN..=MORAL_WORTH_MAX).contains(&moral_worth)
}

impl PolicyConfig {
    pub fn table(&self, archetype: Archetype) -> &ContributionTable {
        match archetype {
            Archetype::Cooperator => &self.cooperator,
            Archetype::Defector => &self.defector,
        }
    }

    /// Probability in `[0, 1]` that an agent contributes this tick
    pub fn probability_of_contributing(&self, archetype: Archetype, moral_worth: i32) -> f64 {
        self.table(archetype).probabilities[WorthBand::of(moral_worth).index()]
    }

    /// Amount invested when the contribution draw succeeds
    pub fn contribution_amount(&self, archetype: Archetype, moral_worth: i32) -> f64 {
        self.table(archetype).amounts[WorthBand::of(moral_worth).index()]
    }
}
