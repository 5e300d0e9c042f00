//! ECS Systems
//!
//! The per-tick engine: decision, agent turns (movement, punishment,
//! transformation, moral worth) and the round bookkeeping around them.

pub mod decision;
pub mod moral_worth;
pub mod movement;
pub mod punishment;
pub mod round;
pub mod transform;
pub mod turns;

pub use decision::{decide_invest, decide_investments};
pub use moral_worth::{moral_worth_delta, update_moral_worth};
pub use movement::wander;
pub use punishment::{punish_opponent, resolve_punishment, select_opponent, PunishmentOutcome};
pub use round::{
    begin_tick, check_termination, collect_investment, distribute_payoff, shuffle_activation,
};
pub use transform::{transform_agent, transformation_target};
pub use turns::{run_agent_turns, take_turn};
