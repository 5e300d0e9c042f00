//! End-to-end ticks through the public model API

use std::collections::BTreeSet;

use pgg_core::config::ActivationMode;
use pgg_core::events::{Archetype, GameEvent};
use pgg_core::{AgentSpec, GameConfig, PublicGoodsGame, ScriptedSource};

const EPS: f64 = 1e-9;

fn sequential_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.simulation.activation = ActivationMode::Sequential;
    config.simulation.max_ticks = 10;
    config
}

#[test]
fn test_payoff_shared_across_population() {
    // Decision draws in id order; 0.99 fails every contribution and
    // punishment threshold
    let source = ScriptedSource::new()
        .with_uniforms([0.1, 0.1, 0.99, 0.1, 0.99])
        .with_fallback(0.99);
    let agents = [
        AgentSpec::cooperator(20.0, 5),
        AgentSpec::cooperator(20.0, 5),
        AgentSpec::cooperator(20.0, 5),
        AgentSpec::cooperator(20.0, 5),
        AgentSpec::defector(20.0, 5),
    ];
    let mut game = PublicGoodsGame::from_agents(sequential_config(), source, &agents).unwrap();

    assert!(game.step());

    let investments: Vec<f64> = game
        .agents()
        .iter()
        .map(|a| a.investment.unwrap())
        .collect();
    assert_eq!(investments, vec![17.7, 17.7, 2.0, 17.7, 2.0]);

    let pool = game.pool();
    assert!((pool.investment - 57.1).abs() < EPS);
    assert!((pool.payoff_per_agent - 18.272).abs() < EPS);
    assert!((pool.balance - 57.1).abs() < EPS);

    for agent in game.agents() {
        assert!(
            (agent.wealth - 38.272).abs() < EPS,
            "agent {} has wealth {}",
            agent.id,
            agent.wealth
        );
    }
    assert!(game.events().iter().all(|e| !e.is_punishment()));
}

#[test]
fn test_failed_draws_leave_wealth_untouched_by_punishment() {
    // Every uniform fails: all invest the fixed loss, no punishment fires
    let source = ScriptedSource::new().with_fallback(0.99);
    let agents = [
        AgentSpec::cooperator(20.0, 5),
        AgentSpec::defector(20.0, -5),
        AgentSpec::defector(20.0, 15),
    ];
    let mut game = PublicGoodsGame::from_agents(sequential_config(), source, &agents).unwrap();
    game.step();

    // 3 * 2.0 * 1.6 / 3
    for agent in game.agents() {
        assert!((agent.wealth - 23.2).abs() < EPS);
        assert_eq!(agent.punishments.altruistic_count, 0);
        assert_eq!(agent.punishments.antisocial_count, 0);
    }
}

#[test]
fn test_contributing_defector_becomes_cooperator() {
    let source = ScriptedSource::new()
        .with_uniforms([0.1, 0.1])
        .with_fallback(0.99);
    let agents = [
        AgentSpec::cooperator(20.0, 5),
        AgentSpec::defector(20.0, 5),
    ];
    let mut game = PublicGoodsGame::from_agents(sequential_config(), source, &agents).unwrap();
    game.step();

    let transformed = game.agent(2).unwrap();
    assert_eq!(transformed.archetype, Archetype::Cooperator);
    // 20 + 35.4 * 1.6 / 2
    assert!((transformed.wealth - 48.32).abs() < EPS);
    // Reset to 0, then +2 for a contribution in [11, 20]
    assert_eq!(transformed.moral_worth, 2);

    let events: Vec<&GameEvent> = game
        .events()
        .iter()
        .filter(|e| e.is_transformation())
        .collect();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0],
        GameEvent::Transformation {
            agent: 2,
            from: Archetype::Defector,
            to: Archetype::Cooperator,
            ..
        }
    ));

    assert_eq!(game.population().len(), 2);
    let latest = game.collector().latest().unwrap();
    assert_eq!(latest.cooperators.count, 2);
    assert_eq!(latest.defectors.count, 0);
    assert_eq!(latest.transformations_this_tick, 1);
}

#[test]
fn test_altruistic_punishment_moves_wealth() {
    // Cooperator contributes, defector does not; the cooperator then
    // punishes on the major-gap draw
    let source = ScriptedSource::new()
        .with_uniforms([0.1, 0.99, 0.99, 0.1])
        .with_fallback(0.99);
    let agents = [
        AgentSpec::cooperator(20.0, 5),
        AgentSpec::defector(20.0, 5),
    ];
    let mut game = PublicGoodsGame::from_agents(sequential_config(), source, &agents).unwrap();
    game.step();

    // Payoff: (17.7 + 2) * 1.6 / 2 = 15.76
    let cooperator = game.agent(1).unwrap();
    let defector = game.agent(2).unwrap();
    assert!((cooperator.wealth - (20.0 - 1.0 + 15.76)).abs() < EPS);
    assert!((defector.wealth - (20.0 - 3.0 + 15.76)).abs() < EPS);
    assert_eq!(cooperator.punishments.altruistic_count, 1);
    assert_eq!(cooperator.punishments.altruistic_money_spent, 1.0);
    assert_eq!(cooperator.punishments.altruistic_money_lost, 3.0);

    let latest = game.collector().latest().unwrap();
    assert_eq!(latest.altruistic_punishment_frequency, 1);
    assert_eq!(latest.punishments_this_tick, 1);
}

#[test]
fn test_seeded_run_invariants() {
    let mut config = GameConfig::default();
    config.simulation.max_ticks = 50;
    let mut game = PublicGoodsGame::new(config, 2024).unwrap();
    let expected = game.agents().len();

    while game.step() {
        let agents = game.agents();
        assert_eq!(agents.len(), expected);

        let ids: BTreeSet<u64> = agents.iter().map(|a| a.id).collect();
        assert_eq!(ids.len(), expected);

        for agent in &agents {
            assert!((-20..=20).contains(&agent.moral_worth));
            let investment = agent.investment.unwrap();
            assert!(
                investment == 17.7 || investment == 2.0,
                "unexpected investment {}",
                investment
            );
            assert!(agent.position.0 < 10 && agent.position.1 < 10);
        }
    }

    assert!(!game.is_running());
    assert!(game.tick() <= 50);
}

#[test]
fn test_run_ends_when_pool_empties() {
    // Nobody invests: zero fixed loss leaves the pool at 0 after tick 1
    let mut config = sequential_config();
    config.payoff.fixed_loss = 0.0;
    let source = ScriptedSource::new().with_fallback(0.99);
    let agents = [AgentSpec::cooperator(20.0, 0), AgentSpec::defector(20.0, 0)];
    let mut game = PublicGoodsGame::from_agents(config, source, &agents).unwrap();

    assert_eq!(game.run(), 1);
    assert_eq!(game.pool().balance, 0.0);
}

#[test]
fn test_broke_agent_still_takes_its_turn() {
    let source = ScriptedSource::new().with_fallback(0.99);
    let agents = [AgentSpec::defector(-10.0, 5), AgentSpec::defector(20.0, 5)];
    let mut game = PublicGoodsGame::from_agents(sequential_config(), source, &agents).unwrap();
    game.step();

    let broke = game.agent(1).unwrap();
    assert_eq!(broke.investment, Some(2.0));
    assert_eq!(broke.moral_worth, 4);
    // 4.0 * 1.6 / 2
    assert!((broke.wealth - (-10.0 + 3.2)).abs() < EPS);
}
