//! Investment Decision
//!
//! One weighted coin flip per agent per tick: the contribution amount if the
//! draw falls at or below the contribution probability, the fixed loss
//! otherwise. The result is cached on the agent as that tick's decision.

use bevy_ecs::prelude::*;
use pgg_events::Archetype;

use crate::components::agent::{Agent, ArchetypeTag, Investment, InvestmentDecision, MoralWorth};
use crate::components::world::{ActivationOrder, RunState};
use crate::config::{GameConfig, PolicyConfig};
use crate::random::{RandomSource, SimRng};

/// Draw this tick's investment for one agent
pub fn decide_invest(
    policy: &PolicyConfig,
    fixed_loss: f64,
    archetype: Archetype,
    moral_worth: i32,
    tick: u64,
    rng: &mut dyn RandomSource,
) -> Investment {
    let probability = policy.probability_of_contributing(archetype, moral_worth);
    let contributed = rng.uniform() <= probability;
    let amount = if contributed {
        policy.contribution_amount(archetype, moral_worth)
    } else {
        fixed_loss
    };

    Investment {
        tick,
        probability,
        amount,
        contributed,
    }
}

/// System: every agent decides its investment, in activation order
pub fn decide_investments(
    config: Res<GameConfig>,
    run_state: Res<RunState>,
    order: Res<ActivationOrder>,
    mut rng: ResMut<SimRng>,
    mut agents: Query<(&ArchetypeTag, &MoralWorth, &mut InvestmentDecision), With<Agent>>,
) {
    for &entity in &order.entities {
        let Ok((archetype, moral_worth, mut decision)) = agents.get_mut(entity) else {
            tracing::warn!("Skipping decision for {:?}: not an agent", entity);
            continue;
        };
        let investment = decide_invest(
            &config.policy,
            config.payoff.fixed_loss,
            archetype.0,
            moral_worth.0,
            run_state.tick,
            rng.source(),
        );
        decision.0 = Some(investment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{ScriptedSource, SeededSource};

    #[test]
    fn test_draw_at_probability_contributes() {
        let policy = PolicyConfig::default();
        let mut rng = ScriptedSource::new().with_uniforms([0.7]);
        let investment = decide_invest(&policy, 2.0, Archetype::Cooperator, 5, 1, &mut rng);
        assert!(investment.contributed);
        assert_eq!(investment.amount, 17.7);
        assert_eq!(investment.probability, 0.7);
    }

    #[test]
    fn test_draw_above_probability_loses() {
        let policy = PolicyConfig::default();
        let mut rng = ScriptedSource::new().with_uniforms([0.51]);
        let investment = decide_invest(&policy, 2.0, Archetype::Defector, 5, 1, &mut rng);
        assert!(!investment.contributed);
        assert_eq!(investment.amount, 2.0);
    }

    #[test]
    fn test_single_draw_per_decision() {
        let policy = PolicyConfig::default();
        let mut rng = ScriptedSource::new().with_uniforms([0.1, 0.2, 0.3]);
        decide_invest(&policy, 2.0, Archetype::Cooperator, 0, 1, &mut rng);
        assert_eq!(rng.uniform_draws(), 1);
        assert_eq!(rng.remaining_uniforms(), 2);
    }

    #[test]
    fn test_amount_is_contribution_or_fixed_loss() {
        let policy = PolicyConfig::default();
        let mut rng = SeededSource::new(2024);
        for worth in -25..=25 {
            for archetype in Archetype::all() {
                let investment = decide_invest(&policy, 2.0, *archetype, worth, 1, &mut rng);
                assert!(investment.amount == 17.7 || investment.amount == 2.0);
                assert_eq!(investment.contributed, investment.amount == 17.7);
            }
        }
    }

    #[test]
    fn test_decide_investments_system() {
        let mut world = World::new();
        world.insert_resource(GameConfig::default());
        world.insert_resource(RunState { tick: 3, running: true });
        world.insert_resource(SimRng::new(ScriptedSource::new().with_uniforms([0.55, 0.55])));

        let cooperator = world
            .spawn((
                Agent,
                ArchetypeTag(Archetype::Cooperator),
                MoralWorth(0),
                InvestmentDecision::default(),
            ))
            .id();
        let defector = world
            .spawn((
                Agent,
                ArchetypeTag(Archetype::Defector),
                MoralWorth(0),
                InvestmentDecision::default(),
            ))
            .id();
        world.insert_resource(ActivationOrder {
            entities: vec![cooperator, defector],
        });

        let mut schedule = Schedule::default();
        schedule.add_systems(decide_investments);
        schedule.run(&mut world);

        // At neutral worth a 0.55 draw is under the cooperator's 0.6 but over the defector's 0.4
        let coop = world.get::<InvestmentDecision>(cooperator).unwrap().for_tick(3).unwrap();
        let defect = world.get::<InvestmentDecision>(defector).unwrap().for_tick(3).unwrap();
        assert_eq!(coop.amount, 17.7);
        assert_eq!(defect.amount, 2.0);
    }
}
