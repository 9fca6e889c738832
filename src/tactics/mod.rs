//! Heuristic evaluators that turn the knowledge map into tactical choices

pub mod blocking;
pub mod exploration;
pub mod hive_site;
pub mod spawn;

pub use blocking::{attack_or_advance, choose_block_target, find_flanks, BlockTable};
pub use exploration::{nearest_resource, nearest_unknown};
pub use hive_site::{best_site, resource_density, score_site, HiveSite};
pub use spawn::{
    break_even_score, effective_distance, estimate_resources_per_turn, local_potential,
    should_spawn, spawn_direction, turns_until_depleted, units_near,
};
