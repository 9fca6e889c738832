//! Spawn economics and harvest-rate estimates

use crate::core::config::{EconomyConfig, SpawnConfig};
use crate::core::types::Resources;
use crate::grid::{Coords, Direction};
use crate::knowledge::KnowledgeMap;

/// Distance-weighted resources around a base, ignoring the base cell itself
pub fn local_potential(map: &KnowledgeMap, base: Coords, radius: i32) -> f64 {
    map.resource_cells()
        .iter()
        .filter_map(|cell| {
            let d = base.distance(cell);
            (d > 0 && d <= radius).then(|| map.resources_at(*cell) as f64 / d as f64)
        })
        .sum()
}

/// Potential per stationed unit
pub fn break_even_score(potential: f64, nearby_units: usize) -> f64 {
    potential / nearby_units.max(1) as f64
}

/// Friendly units strictly closer than `radius` to `base`
pub fn units_near(map: &KnowledgeMap, base: Coords, radius: i32) -> usize {
    map.own_units()
        .iter()
        .filter(|u| u.distance(&base) < radius)
        .count()
}

/// Is one more unit at `base` worth its cost?
pub fn should_spawn(
    map: &KnowledgeMap,
    base: Coords,
    nearby_units: usize,
    balance: Resources,
    economy: &EconomyConfig,
    spawn: &SpawnConfig,
) -> bool {
    if balance < economy.spawn_cost {
        return false;
    }
    if nearby_units < spawn.min_units_nearby {
        return true;
    }
    let potential = local_potential(map, base, spawn.potential_radius);
    break_even_score(potential, nearby_units) > spawn.break_even_threshold
}

/// First open, unreserved neighbour of `base` in direction order
pub fn spawn_direction(map: &KnowledgeMap, base: Coords) -> Option<Direction> {
    Direction::ALL.into_iter().find(|d| {
        let cell = base.neighbor(*d);
        map.is_open(cell) && !map.is_reserved(cell)
    })
}

/// Average one-way trip length from a resource to the nearest own base,
/// weighted by resource count
///
/// None without an own base or known resources.
pub fn effective_distance(map: &KnowledgeMap) -> Option<f64> {
    let weighted: f64 = map
        .resource_cells()
        .iter()
        .filter_map(|cell| {
            let d = map.distance_to_nearest_own_base(*cell)?.max(1);
            Some(map.resources_at(*cell) as f64 / d as f64)
        })
        .sum();

    if weighted < 0.001 {
        return None;
    }
    Some(map.resource_total() as f64 / weighted)
}

/// Expected harvest per turn for `units` foragers
///
/// Each trip is there and back plus one turn each for pickup and deposit.
pub fn estimate_resources_per_turn(map: &KnowledgeMap, units: usize) -> f64 {
    match effective_distance(map) {
        Some(d) => units as f64 / (2.0 * d + 2.0),
        None => 0.0,
    }
}

/// Turns until the known resources run out, assuming every enemy unit
/// harvests at our per-unit rate
pub fn turns_until_depleted(map: &KnowledgeMap) -> Option<u32> {
    let own = map.own_units().len();
    if own == 0 {
        return None;
    }
    let rate = estimate_resources_per_turn(map, own);
    if rate < 0.001 {
        return None;
    }
    let share = (own + map.enemy_unit_count()) as f64 / own as f64;
    Some((map.resource_total() as f64 / share / rate) as u32)
}
