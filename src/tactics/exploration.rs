//! Exploration and harvest targets

use crate::grid::Coords;
use crate::knowledge::{KnowledgeMap, TileKind};

/// Closest Unknown cell to `from`
///
/// A previous target that is still Unknown is kept, so the explorer does
/// not flip between equally distant frontiers.
pub fn nearest_unknown(
    map: &KnowledgeMap,
    from: Coords,
    previous: Option<Coords>,
) -> Option<Coords> {
    if let Some(target) = previous {
        if map.contains(target) && map.kind(target) == TileKind::Unknown {
            return Some(target);
        }
    }

    map.iter()
        .filter(|(_, tile)| tile.kind == TileKind::Unknown)
        .map(|(coords, _)| *coords)
        .min_by_key(|coords| coords.distance(&from))
}

/// Closest resource cell a unit at `from` can harvest this turn
///
/// Cells held by another unit or already claimed are skipped; the unit's
/// own cell always qualifies.
pub fn nearest_resource(map: &KnowledgeMap, from: Coords) -> Option<Coords> {
    map.resource_cells()
        .iter()
        .copied()
        .filter(|cell| *cell == from || (map.is_open(*cell) && !map.is_reserved(*cell)))
        .min_by_key(|cell| cell.distance(&from))
}
