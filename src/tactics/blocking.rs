//! Enemy base blocking
//!
//! A blocker walks to a staging cell next to an enemy base and stays there
//! as a saboteur, attacking anything that comes through the two flank cells.

use std::collections::{BTreeMap, BTreeSet};

use crate::core::config::PathingConfig;
use crate::grid::Coords;
use crate::knowledge::{KnowledgeMap, TileKind};
use crate::pathfinding::find_step;
use crate::snapshot::Order;

/// The two neighbours of `staging` that also touch `base`
///
/// Returns None unless `staging` is adjacent to `base`.
pub fn find_flanks(base: Coords, staging: Coords) -> Option<(Coords, Coords)> {
    if base.distance(&staging) != 1 {
        return None;
    }
    let mut flanks = staging
        .neighbors()
        .into_iter()
        .filter(|n| n.distance(&base) == 1);
    Some((flanks.next()?, flanks.next()?))
}

/// Pick the staging cell for blocking `base`
///
/// Neighbours are tried in direction order. A neighbour whose flanks are
/// both walkable (or unexplored) wins immediately; otherwise the one with
/// the most such flanks, then the first usable neighbour at all.
pub fn choose_block_target(map: &KnowledgeMap, base: Coords) -> Option<Coords> {
    let mut best: Option<(Coords, usize)> = None;
    let mut first_usable = None;

    for neighbor in base.neighbors() {
        if !map.is_walkable_or_unexplored(neighbor) {
            continue;
        }
        first_usable.get_or_insert(neighbor);

        let Some((left, right)) = find_flanks(base, neighbor) else {
            continue;
        };
        let covered = [left, right]
            .into_iter()
            .filter(|f| map.is_walkable_or_unexplored(*f))
            .count();

        if covered == 2 {
            return Some(neighbor);
        }
        if covered > 0 && best.map_or(true, |(_, seen)| covered > seen) {
            best = Some((neighbor, covered));
        }
    }

    best.map(|(cell, _)| cell).or(first_usable)
}

/// Staging cell per enemy base, and which bases already hold a saboteur
#[derive(Debug, Clone, Default)]
pub struct BlockTable {
    targets: BTreeMap<Coords, Coords>,
    blocked: BTreeSet<Coords>,
}

impl BlockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute staging cells for every enemy base not yet blocked
    pub fn refresh_targets(&mut self, map: &KnowledgeMap) {
        let blocked = &self.blocked;
        self.targets
            .retain(|base, _| blocked.contains(base) || map.enemy_bases().contains(base));

        for base in map.enemy_bases() {
            if self.blocked.contains(base) {
                continue;
            }
            match choose_block_target(map, *base) {
                Some(staging) => {
                    self.targets.insert(*base, staging);
                }
                None => {
                    self.targets.remove(base);
                }
            }
        }
    }

    pub fn target_for(&self, base: Coords) -> Option<Coords> {
        self.targets.get(&base).copied()
    }

    /// First enemy base (row-major) that has a staging cell and no saboteur
    pub fn next_unblocked(&self) -> Option<(Coords, Coords)> {
        self.targets
            .iter()
            .find(|(base, _)| !self.blocked.contains(*base))
            .map(|(base, staging)| (*base, *staging))
    }

    pub fn mark_blocked(&mut self, base: Coords) {
        self.blocked.insert(base);
    }

    pub fn unmark(&mut self, base: Coords) {
        self.blocked.remove(&base);
    }

    pub fn is_blocked(&self, base: Coords) -> bool {
        self.blocked.contains(&base)
    }

    pub fn blocked_count(&self) -> usize {
        self.blocked.len()
    }

    /// Forget bases that are no longer known as enemy bases
    pub fn prune(&mut self, map: &KnowledgeMap) {
        self.blocked.retain(|base| map.kind(*base) == TileKind::EnemyBase);
        self.targets
            .retain(|base, _| map.kind(*base) == TileKind::EnemyBase);
    }
}

/// Attack an adjacent enemy unit, or keep walking to the staging cell
///
/// Flank cells are checked before the other neighbours. A unit already on
/// its staging cell with nothing in reach gets no order.
pub fn attack_or_advance(
    map: &mut KnowledgeMap,
    base: Coords,
    unit: Coords,
    staging: Coords,
    costs: &PathingConfig,
) -> Option<Order> {
    let flanks = find_flanks(base, unit)
        .map(|(left, right)| vec![left, right])
        .unwrap_or_default();

    let enemy = flanks
        .into_iter()
        .chain(unit.neighbors())
        .find(|cell| map.kind(*cell) == TileKind::EnemyUnit);

    if let Some(direction) = enemy.and_then(|cell| unit.direction_to(&cell)) {
        return Some(Order::attack(unit, direction));
    }

    if unit != staging {
        let stop_adjacent = !map.is_open(staging);
        return find_step(map, unit, staging, stop_adjacent, costs);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Direction;
    use crate::snapshot::{Entity, GameState, OrderKind, Terrain};

    fn field() -> GameState {
        let mut state = GameState::new(1, 2);
        state.fill_open(-4..=4, -8..=8);
        state
    }

    fn knowledge(state: &GameState) -> KnowledgeMap {
        let mut map = KnowledgeMap::new();
        map.refresh(state, 0, 0);
        map
    }

    #[test]
    fn test_flanks_touch_both() {
        let base = Coords::new(0, 0);
        for staging in base.neighbors() {
            let (left, right) = find_flanks(base, staging).unwrap();
            assert_ne!(left, right);
            for flank in [left, right] {
                assert_eq!(flank.distance(&base), 1);
                assert_eq!(flank.distance(&staging), 1);
            }
        }
        assert!(find_flanks(base, Coords::new(0, 4)).is_none());
    }

    #[test]
    fn test_open_base_gets_full_coverage() {
        let base = Coords::new(0, 0);
        let mut state = field();
        state.hex_mut(base).unwrap().entity = Some(Entity::base(1));
        let map = knowledge(&state);

        let staging = choose_block_target(&map, base).unwrap();
        // All neighbours qualify; direction order puts East first
        assert_eq!(staging, base.neighbor(Direction::E));
        let (left, right) = find_flanks(base, staging).unwrap();
        assert!(map.is_walkable(left) && map.is_walkable(right));
    }

    #[test]
    fn test_single_gap_is_chosen() {
        let base = Coords::new(0, 0);
        let gap = base.neighbor(Direction::SW);
        let mut state = field();
        state.hex_mut(base).unwrap().entity = Some(Entity::base(1));
        let (left, right) = find_flanks(base, gap).unwrap();
        for n in base.neighbors() {
            if n != gap && n != left && n != right {
                state.set_hex(n, Terrain::Rock);
            }
        }
        let map = knowledge(&state);

        assert_eq!(choose_block_target(&map, base), Some(gap));
    }

    #[test]
    fn test_partial_coverage_fallback() {
        let base = Coords::new(0, 0);
        let mut state = field();
        state.hex_mut(base).unwrap().entity = Some(Entity::base(1));
        // Only W and NW stay open: each has one walkable flank
        let open = [base.neighbor(Direction::W), base.neighbor(Direction::NW)];
        for n in base.neighbors() {
            if !open.contains(&n) {
                state.set_hex(n, Terrain::Rock);
            }
        }
        let map = knowledge(&state);

        assert_eq!(choose_block_target(&map, base), Some(open[0]));
    }

    #[test]
    fn test_no_target_when_walled_in() {
        let base = Coords::new(0, 0);
        let mut state = field();
        state.hex_mut(base).unwrap().entity = Some(Entity::base(1));
        for n in base.neighbors() {
            state.set_hex(n, Terrain::Rock);
        }
        let map = knowledge(&state);

        assert_eq!(choose_block_target(&map, base), None);
    }

    #[test]
    fn test_block_table_is_stable_once_blocked() {
        let base = Coords::new(0, 0);
        let mut state = field();
        state.hex_mut(base).unwrap().entity = Some(Entity::base(1));
        let mut map = knowledge(&state);

        let mut table = BlockTable::new();
        table.refresh_targets(&map);
        let (target_base, staging) = table.next_unblocked().unwrap();
        assert_eq!(target_base, base);
        table.mark_blocked(base);
        assert_eq!(table.blocked_count(), 1);
        assert!(table.next_unblocked().is_none());

        // East neighbour gets blocked off; the table keeps the old choice
        state.set_hex(staging, Terrain::Rock);
        map.refresh(&state, 0, 0);
        table.refresh_targets(&map);
        assert_eq!(table.target_for(base), Some(staging));

        table.unmark(base);
        table.refresh_targets(&map);
        assert_ne!(table.target_for(base), Some(staging));
    }

    #[test]
    fn test_prune_forgets_destroyed_bases() {
        let base = Coords::new(0, 0);
        let mut state = field();
        state.hex_mut(base).unwrap().entity = Some(Entity::base(1));
        let mut map = knowledge(&state);
        let mut table = BlockTable::new();
        table.refresh_targets(&map);
        table.mark_blocked(base);

        state.hex_mut(base).unwrap().entity = None;
        map.refresh(&state, 0, 0);
        table.prune(&map);
        assert!(!table.is_blocked(base));
        assert!(table.target_for(base).is_none());
    }

    #[test]
    fn test_attacks_flank_intruder() {
        let base = Coords::new(0, 0);
        let staging = base.neighbor(Direction::E);
        let (left, _) = find_flanks(base, staging).unwrap();
        let mut state = field();
        state.hex_mut(base).unwrap().entity = Some(Entity::base(1));
        state.hex_mut(staging).unwrap().entity = Some(Entity::unit(0));
        state.hex_mut(left).unwrap().entity = Some(Entity::unit(1));
        let mut map = knowledge(&state);

        let order =
            attack_or_advance(&mut map, base, staging, staging, &PathingConfig::default()).unwrap();
        assert_eq!(order.kind, OrderKind::Attack);
        assert_eq!(order.destination(), Some(left));
    }

    #[test]
    fn test_advances_then_waits() {
        let base = Coords::new(0, 0);
        let staging = base.neighbor(Direction::E);
        let mut state = field();
        state.hex_mut(base).unwrap().entity = Some(Entity::base(1));
        let mut map = knowledge(&state);
        let costs = PathingConfig::default();

        let order = attack_or_advance(&mut map, base, Coords::new(0, 8), staging, &costs).unwrap();
        assert_eq!(order.kind, OrderKind::Move);
        assert_eq!(order.direction, Some(Direction::W));

        assert!(attack_or_advance(&mut map, base, staging, staging, &costs).is_none());
    }
}
