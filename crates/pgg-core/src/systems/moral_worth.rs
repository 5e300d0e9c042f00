//! Moral-Worth Ledger
//!
//! Adjusts each agent's moral worth from the investment it made this tick.

use crate::components::agent::MoralWorth;
use crate::config::LedgerConfig;

/// Change in moral worth earned by investing `investment`.
///
/// The modest band earns +1, the generous band +2, at or below the fixed loss
/// costs 1. Anything else leaves moral worth unchanged.
pub fn moral_worth_delta(investment: f64, ledger: &LedgerConfig, fixed_loss: f64) -> i32 {
    if ledger.modest.contains(investment) {
        1
    } else if ledger.generous.contains(investment) {
        2
    } else if investment <= fixed_loss {
        -1
    } else {
        0
    }
}

/// Apply this tick's investment to the ledger, saturating at `[-20, 20]`
pub fn update_moral_worth(
    moral_worth: &mut MoralWorth,
    investment: f64,
    ledger: &LedgerConfig,
    fixed_loss: f64,
) -> i32 {
    moral_worth.apply(moral_worth_delta(investment, ledger, fixed_loss))
}
