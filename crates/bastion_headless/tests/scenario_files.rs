//! The shipped scenario files load and play.

use std::path::PathBuf;

use bastion_headless::game_runner::{run_game, GameConfig};
use bastion_headless::scenario::Scenario;

fn scenario_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../scenarios")
        .join(name)
}

#[test]
fn test_shipped_scenarios_build() {
    for name in ["standard.ron", "ascension.ron", "tight_forge.ron"] {
        let scenario = Scenario::load(scenario_path(name)).unwrap();
        scenario
            .build_simulation(scenario.seed)
            .unwrap_or_else(|e| panic!("{name}: {e}"));
    }
}

#[test]
fn test_standard_file_matches_builtin() {
    let scenario = Scenario::load(scenario_path("standard.ron")).unwrap();
    assert_eq!(scenario, Scenario::default());
}

#[test]
fn test_tight_forge_rules_apply() {
    let scenario = Scenario::load(scenario_path("tight_forge.ron")).unwrap();
    let sim = scenario.build_simulation(scenario.seed).unwrap();
    assert_eq!(sim.rules().queue_limit, 2);
    assert_eq!(sim.effective_stats("RCP1").unwrap().upgrade_cost, 1000);
}

#[test]
fn test_ascension_prestiges_immediately() {
    let scenario = Scenario::load(scenario_path("ascension.ron")).unwrap();
    let mut config = GameConfig::new(scenario, 7);
    config.max_ticks = 10;
    let result = run_game(&config).unwrap();
    assert!(result.metrics.prestige_count >= 1);
    assert_eq!(result.metrics.first_prestige_tick, Some(0));
    assert!(result.metrics.crystal_earned >= 2);
}
