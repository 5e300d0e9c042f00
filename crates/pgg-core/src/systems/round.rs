//! Round Controller
//!
//! Tick bookkeeping around the agent turns: clock, activation order, pool
//! collection, payoff distribution and termination.

use bevy_ecs::prelude::*;

use crate::components::agent::{Agent, InvestmentDecision, Wealth};
use crate::components::world::{ActivationOrder, CommonPool, Population, RunState, TickEvents};
use crate::config::{ActivationMode, GameConfig};
use crate::random::SimRng;

/// System: advance the clock and clear the previous tick's records
pub fn begin_tick(
    mut run_state: ResMut<RunState>,
    mut events: ResMut<TickEvents>,
    mut decisions: Query<&mut InvestmentDecision, With<Agent>>,
) {
    run_state.advance_tick();
    events.clear();
    for mut decision in decisions.iter_mut() {
        decision.clear();
    }
}

/// System: fix the order agents act in for this tick
pub fn shuffle_activation(
    config: Res<GameConfig>,
    population: Res<Population>,
    mut rng: ResMut<SimRng>,
    mut order: ResMut<ActivationOrder>,
) {
    let entities = population.entities();
    order.entities = match config.simulation.activation {
        ActivationMode::Sequential => entities,
        ActivationMode::Random => rng
            .source()
            .permutation(entities.len())
            .into_iter()
            .map(|i| entities[i])
            .collect(),
    };
}

/// System: sum this tick's recorded investments into the common pool
pub fn collect_investment(
    run_state: Res<RunState>,
    population: Res<Population>,
    mut pool: ResMut<CommonPool>,
    decisions: Query<&InvestmentDecision, With<Agent>>,
) {
    let investment: f64 = population
        .entities()
        .into_iter()
        .filter_map(|entity| decisions.get(entity).ok())
        .filter_map(|decision| decision.for_tick(run_state.tick))
        .map(|decision| decision.amount)
        .sum();

    pool.deposit(investment);
    tracing::trace!(
        "Tick {}: invested {:.2}, pool balance {:.2}",
        run_state.tick,
        investment,
        pool.balance
    );
}

/// System: pay every agent an equal share of the multiplied investment
pub fn distribute_payoff(
    config: Res<GameConfig>,
    population: Res<Population>,
    mut pool: ResMut<CommonPool>,
    mut wealth: Query<&mut Wealth, With<Agent>>,
) {
    let payoff = pool.payoff(config.payoff.multiplier, population.len());
    pool.payoff_per_agent = payoff;

    for entity in population.entities() {
        if let Ok(mut balance) = wealth.get_mut(entity) {
            balance.0 += payoff;
        }
    }
}

/// System: stop the run once the pool has dissipated or the tick limit is hit
pub fn check_termination(
    config: Res<GameConfig>,
    pool: Res<CommonPool>,
    mut run_state: ResMut<RunState>,
) {
    if pool.is_dissipated() {
        run_state.running = false;
        tracing::info!("Common pool dissipated at tick {}", run_state.tick);
    } else if run_state.tick >= config.simulation.max_ticks {
        run_state.running = false;
        tracing::info!("Reached tick limit {}", config.simulation.max_ticks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::agent::Investment;
    use crate::components::AgentId;
    use crate::random::ScriptedSource;

    fn spawn(world: &mut World, id: u64, amount: Option<f64>, tick: u64) -> Entity {
        let decision = InvestmentDecision(amount.map(|amount| Investment {
            tick,
            probability: 0.5,
            amount,
            contributed: amount > 2.0,
        }));
        let entity = world.spawn((Agent, AgentId(id), Wealth(20.0), decision)).id();
        world
            .resource_mut::<Population>()
            .insert(AgentId(id), entity)
            .unwrap();
        entity
    }

    fn round_world(tick: u64) -> World {
        let mut world = World::new();
        world.insert_resource(GameConfig::default());
        world.insert_resource(RunState { tick, running: true });
        world.insert_resource(CommonPool::new());
        world.insert_resource(Population::new());
        world.insert_resource(TickEvents::new());
        world.insert_resource(ActivationOrder::new());
        world.insert_resource(SimRng::new(ScriptedSource::new()));
        world
    }

    #[test]
    fn test_collect_and_distribute() {
        let mut world = round_world(1);
        let amounts = [17.7, 17.7, 2.0, 17.7, 2.0];
        let entities: Vec<Entity> = amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| spawn(&mut world, i as u64 + 1, Some(*amount), 1))
            .collect();

        let mut schedule = Schedule::default();
        schedule.add_systems((collect_investment, distribute_payoff).chain());
        schedule.run(&mut world);

        let pool = *world.resource::<CommonPool>();
        assert!((pool.investment - 57.1).abs() < 1e-9);
        assert!((pool.payoff_per_agent - 18.272).abs() < 1e-9);
        for entity in entities {
            let wealth = world.get::<Wealth>(entity).unwrap().0;
            assert!((wealth - 38.272).abs() < 1e-9);
        }
    }

    #[test]
    fn test_stale_decisions_are_ignored() {
        let mut world = round_world(2);
        spawn(&mut world, 1, Some(17.7), 1);
        spawn(&mut world, 2, Some(2.0), 2);
        spawn(&mut world, 3, None, 2);

        let mut schedule = Schedule::default();
        schedule.add_systems(collect_investment);
        schedule.run(&mut world);

        assert_eq!(world.resource::<CommonPool>().investment, 2.0);
    }

    #[test]
    fn test_begin_tick_clears_records() {
        let mut world = round_world(4);
        let entity = spawn(&mut world, 1, Some(17.7), 4);

        let mut schedule = Schedule::default();
        schedule.add_systems(begin_tick);
        schedule.run(&mut world);

        assert_eq!(world.resource::<RunState>().tick, 5);
        assert_eq!(world.get::<InvestmentDecision>(entity).unwrap().0, None);
    }

    #[test]
    fn test_sequential_activation_follows_ids() {
        let mut world = round_world(0);
        let mut config = GameConfig::default();
        config.simulation.activation = ActivationMode::Sequential;
        world.insert_resource(config);
        let first = spawn(&mut world, 1, None, 0);
        let second = spawn(&mut world, 2, None, 0);

        let mut schedule = Schedule::default();
        schedule.add_systems(shuffle_activation);
        schedule.run(&mut world);

        assert_eq!(world.resource::<ActivationOrder>().entities, vec![first, second]);
    }

    fn run_termination_check(world: &mut World) -> bool {
        let mut schedule = Schedule::default();
        schedule.add_systems(check_termination);
        schedule.run(world);
        world.resource::<RunState>().running
    }

    #[test]
    fn test_termination_on_empty_pool_and_tick_limit() {
        let mut world = round_world(1);
        assert!(!run_termination_check(&mut world));

        let mut world = round_world(1000);
        world.resource_mut::<CommonPool>().deposit(10.0);
        assert!(!run_termination_check(&mut world));

        let mut world = round_world(999);
        world.resource_mut::<CommonPool>().deposit(10.0);
        assert!(run_termination_check(&mut world));
    }
}
