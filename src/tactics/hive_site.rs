//! Hive placement scoring
//!
//! A site is worth the distance-weighted resources around it, discounted
//! near enemy bases and boosted the further it pushes out from our own.

use ordered_float::OrderedFloat;
use std::cmp::Reverse;

use crate::core::config::HiveSiteConfig;
use crate::grid::Coords;
use crate::knowledge::KnowledgeMap;

/// Best place found for a new base
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HiveSite {
    pub coords: Coords,
    pub score: f64,
}

/// Sum of `resources / max(1, distance)` over all cells within `radius`
pub fn resource_density(map: &KnowledgeMap, center: Coords, radius: i32) -> f64 {
    center
        .hexes_in_range(radius)
        .into_iter()
        .map(|cell| {
            let resources = map.resources_at(cell);
            if resources == 0 {
                return 0.0;
            }
            resources as f64 / center.distance(&cell).max(1) as f64
        })
        .sum()
}

/// Final score of a candidate, or None if it may not host a base
pub fn score_site(map: &KnowledgeMap, candidate: Coords, config: &HiveSiteConfig) -> Option<f64> {
    let tile = map.tile(candidate)?;
    if !tile.walkable || tile.kind.is_base() {
        return None;
    }

    let own_distance = map.distance_to_nearest_own_base(candidate);
    if own_distance.is_some_and(|d| d < config.min_own_distance) {
        return None;
    }

    let raw = resource_density(map, candidate, config.scan_radius);
    if raw < config.score_floor {
        return None;
    }

    let safety = match map.distance_to_nearest_enemy_base(candidate) {
        Some(d) if d < config.enemy_safety_distance => {
            d as f64 / config.enemy_safety_distance as f64
        }
        _ => 1.0,
    };

    // Without any own base there is nothing to expand away from
    let expansion = 1.0 + own_distance.unwrap_or(0) as f64 * config.expansion_weight;

    Some(raw * safety * expansion)
}

/// Highest-scoring site on the known map (first in row-major order on ties)
pub fn best_site(map: &KnowledgeMap, config: &HiveSiteConfig) -> Option<HiveSite> {
    map.iter()
        .filter_map(|(coords, _)| {
            score_site(map, *coords, config).map(|score| HiveSite {
                coords: *coords,
                score,
            })
        })
        .min_by_key(|site| Reverse(OrderedFloat(site.score)))
}
