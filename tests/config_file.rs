//! The shipped sample config must stay loadable

use std::path::Path;

use hivemind::core::config::BotConfig;

#[test]
fn test_sample_config_matches_defaults() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/hivemind.toml");
    let loaded = BotConfig::load(&path).unwrap();
    let defaults = BotConfig::default();

    assert_eq!(loaded.seed, defaults.seed);
    assert_eq!(loaded.economy.base_cost, defaults.economy.base_cost);
    assert_eq!(loaded.hive_site.score_threshold, defaults.hive_site.score_threshold);
    assert_eq!(loaded.spawn.potential_radius, defaults.spawn.potential_radius);
    assert_eq!(loaded.pathing.barrier_cost, defaults.pathing.barrier_cost);
    assert_eq!(
        loaded.exploration.min_units_for_explorer,
        defaults.exploration.min_units_for_explorer
    );
}

#[test]
fn test_missing_config_file_is_io_error() {
    let result = BotConfig::load(Path::new("/nonexistent/hivemind.toml"));
    assert!(matches!(result, Err(hivemind::core::HiveError::IoError(_))));
}
