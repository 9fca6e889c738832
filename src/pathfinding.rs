//! A* pathfinding over the knowledge map
//!
//! Open cells cost `step_cost` to enter, breakable enemy barriers cost
//! `barrier_cost`; everything else (unknown, off-map, reserved, blocked) is
//! skipped. Equal totals are resolved by candidate insertion order, so the
//! result is reproducible.

use ahash::{AHashMap, AHashSet};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::core::config::PathingConfig;
use crate::grid::{Coords, Direction};
use crate::knowledge::KnowledgeMap;
use crate::snapshot::Order;

/// Search-local record for one reached cell
#[derive(Debug, Clone)]
struct PathNode {
    cost: u32,
    total: u32,
    prev: Option<Coords>,
    /// Insertion rank, kept when the node's cost improves
    rank: u64,
}

/// Entry in the open set
#[derive(Debug, Clone, PartialEq, Eq)]
struct Candidate {
    coords: Coords,
    total: u32,
    rank: u64,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap: lowest total, then earliest inserted
        other
            .total
            .cmp(&self.total)
            .then_with(|| other.rank.cmp(&self.rank))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A route found by the search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    /// Start first, goal last
    pub cells: Vec<Coords>,
    pub cost: u32,
}

impl Path {
    /// The cell after the start, if the path moves at all
    pub fn first_step(&self) -> Option<Coords> {
        self.cells.get(1).copied()
    }

    /// Number of single-hex steps
    pub fn len(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Find a route from `start` towards `target`
///
/// With `stop_adjacent` the search succeeds on any cell at distance 1 from
/// the target, which is how units approach cells they cannot enter (bases,
/// Unknown cells). Returns None when no candidate satisfies the goal.
pub fn find_path(
    map: &KnowledgeMap,
    start: Coords,
    target: Coords,
    stop_adjacent: bool,
    costs: &PathingConfig,
) -> Option<Path> {
    let mut nodes: AHashMap<Coords, PathNode> = AHashMap::new();
    let mut rejected: AHashSet<Coords> = AHashSet::new();
    let mut open = BinaryHeap::new();
    let mut next_rank = 0u64;

    let start_total = start.distance(&target) as u32;
    nodes.insert(
        start,
        PathNode {
            cost: 0,
            total: start_total,
            prev: None,
            rank: next_rank,
        },
    );
    open.push(Candidate {
        coords: start,
        total: start_total,
        rank: next_rank,
    });
    next_rank += 1;

    while let Some(current) = open.pop() {
        if rejected.contains(&current.coords) {
            continue;
        }
        let node = nodes.get(&current.coords)?.clone();
        if node.total != current.total {
            continue; // superseded by a cheaper entry
        }

        let reached = if stop_adjacent {
            current.coords.distance(&target) == 1
        } else {
            current.coords == target
        };
        if reached {
            return Some(reconstruct_path(&nodes, current.coords, node.cost));
        }

        rejected.insert(current.coords);

        for neighbor in current.coords.neighbors() {
            if rejected.contains(&neighbor) || map.is_reserved(neighbor) {
                continue;
            }
            let Some(tile) = map.tile(neighbor) else {
                continue;
            };
            let step_cost = if tile.is_open() {
                costs.step_cost
            } else if tile.is_breakable() {
                costs.barrier_cost
            } else {
                continue;
            };

            let cost = node.cost + step_cost;
            let total = cost + neighbor.distance(&target) as u32;

            match nodes.get_mut(&neighbor) {
                Some(existing) => {
                    if cost >= existing.cost {
                        continue;
                    }
                    existing.cost = cost;
                    existing.total = total;
                    existing.prev = Some(current.coords);
                    open.push(Candidate {
                        coords: neighbor,
                        total,
                        rank: existing.rank,
                    });
                }
                None => {
                    nodes.insert(
                        neighbor,
                        PathNode {
                            cost,
                            total,
                            prev: Some(current.coords),
                            rank: next_rank,
                        },
                    );
                    open.push(Candidate {
                        coords: neighbor,
                        total,
                        rank: next_rank,
                    });
                    next_rank += 1;
                }
            }
        }
    }

    None // No path found
}

fn reconstruct_path(nodes: &AHashMap<Coords, PathNode>, goal: Coords, cost: u32) -> Path {
    let mut cells = vec![goal];
    let mut current = goal;
    while let Some(prev) = nodes.get(&current).and_then(|n| n.prev) {
        cells.push(prev);
        current = prev;
    }
    cells.reverse();
    Path { cells, cost }
}

/// The single order that moves a unit one hex along the best route
///
/// Stepping into an enemy barrier becomes an Attack. The destination is
/// reserved so no other friendly unit is routed into it this turn. Returns
/// None when there is no route or the unit already satisfies the goal.
pub fn find_step(
    map: &mut KnowledgeMap,
    start: Coords,
    target: Coords,
    stop_adjacent: bool,
    costs: &PathingConfig,
) -> Option<Order> {
    let path = find_path(map, start, target, stop_adjacent, costs)?;
    let next = path.first_step()?;
    let direction: Direction = start.direction_to(&next)?;

    let breakable = map.tile(next).is_some_and(|t| t.is_breakable());
    map.reserve(next);

    Some(if breakable {
        Order::attack(start, direction)
    } else {
        Order::move_to(start, direction)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{Entity, GameState, OrderKind, Terrain};
    use std::ops::RangeInclusive;

    fn open_map(rows: RangeInclusive<i32>, cols: RangeInclusive<i32>) -> GameState {
        let mut state = GameState::new(1, 2);
        state.fill_open(rows, cols);
        state
    }

    fn knowledge(state: &GameState) -> KnowledgeMap {
        let mut map = KnowledgeMap::new();
        map.refresh(state, 0, 0);
        map
    }

    #[test]
    fn test_straight_line() {
        let map = knowledge(&open_map(-2..=2, 0..=12));
        let start = Coords::new(0, 0);
        let goal = Coords::new(0, 10);

        let path = find_path(&map, start, goal, false, &PathingConfig::default()).unwrap();
        assert_eq!(path.cells.first(), Some(&start));
        assert_eq!(path.cells.last(), Some(&goal));
        assert_eq!(path.len(), 5);
        assert_eq!(path.cost, 5);
    }

    #[test]
    fn test_route_around_obstacle() {
        let mut state = open_map(-3..=3, 0..=12);
        state.set_hex(Coords::new(0, 4), Terrain::Rock);
        state.set_hex(Coords::new(0, 6), Terrain::Rock);
        let map = knowledge(&state);

        let path =
            find_path(&map, Coords::new(0, 0), Coords::new(0, 10), false, &PathingConfig::default())
                .unwrap();
        assert!(!path.cells.contains(&Coords::new(0, 4)));
        assert!(!path.cells.contains(&Coords::new(0, 6)));
    }

    #[test]
    fn test_no_path_when_enclosed() {
        let mut state = open_map(-4..=4, -8..=8);
        let goal = Coords::new(0, 4);
        for n in goal.neighbors() {
            state.set_hex(n, Terrain::Rock);
        }
        let map = knowledge(&state);

        let costs = PathingConfig::default();
        assert!(find_path(&map, Coords::new(0, -4), goal, false, &costs).is_none());
    }

    #[test]
    fn test_unknown_cells_are_not_entered() {
        let state = open_map(0..=0, 0..=4);
        let mut map = knowledge(&state);
        map.expand_fringe();

        // Target lies in the fringe: only reachable in stop-adjacent mode
        let fringe = Coords::new(0, 6);
        let costs = PathingConfig::default();
        assert!(find_path(&map, Coords::new(0, 0), fringe, false, &costs).is_none());
        let path = find_path(&map, Coords::new(0, 0), fringe, true, &costs).unwrap();
        assert_eq!(path.cells.last(), Some(&Coords::new(0, 4)));
    }

    #[test]
    fn test_stop_adjacent_never_lands_on_target() {
        let mut state = open_map(-3..=3, 0..=12);
        let target = Coords::new(0, 8);
        state.hex_mut(target).unwrap().entity = Some(Entity::base(0));
        let map = knowledge(&state);

        let costs = PathingConfig::default();
        let path = find_path(&map, Coords::new(0, 0), target, true, &costs).unwrap();
        let last = *path.cells.last().unwrap();
        assert_ne!(last, target);
        assert_eq!(last.distance(&target), 1);
    }

    #[test]
    fn test_already_there_gives_no_step() {
        let mut map = knowledge(&open_map(-1..=1, 0..=6));
        let costs = PathingConfig::default();
        let here = Coords::new(0, 2);
        assert!(find_step(&mut map, here, here, false, &costs).is_none());
        assert!(find_step(&mut map, here, Coords::new(0, 4), true, &costs).is_none());
    }

    #[test]
    fn test_step_reserves_destination() {
        let mut map = knowledge(&open_map(0..=0, 0..=8));
        let costs = PathingConfig::default();

        let order =
            find_step(&mut map, Coords::new(0, 0), Coords::new(0, 8), false, &costs).unwrap();
        assert_eq!(order.kind, OrderKind::Move);
        assert_eq!(order.direction, Some(Direction::E));
        assert!(map.is_reserved(Coords::new(0, 2)));

        // A second unit on the same one-lane corridor cannot follow this turn
        assert!(find_step(&mut map, Coords::new(0, 0), Coords::new(0, 8), false, &costs).is_none());
    }

    #[test]
    fn test_attack_into_barrier() {
        let mut state = open_map(0..=0, 0..=8);
        state.hex_mut(Coords::new(0, 2)).unwrap().entity = Some(Entity::barrier(1));
        let mut map = knowledge(&state);

        let costs = PathingConfig::default();
        let order =
            find_step(&mut map, Coords::new(0, 0), Coords::new(0, 8), false, &costs).unwrap();
        assert_eq!(order.kind, OrderKind::Attack);
        assert_eq!(order.direction, Some(Direction::E));
    }

    #[test]
    fn test_own_barrier_blocks() {
        let mut state = open_map(0..=0, 0..=8);
        state.hex_mut(Coords::new(0, 2)).unwrap().entity = Some(Entity::barrier(0));
        let map = knowledge(&state);

        let costs = PathingConfig::default();
        assert!(find_path(&map, Coords::new(0, 0), Coords::new(0, 8), false, &costs).is_none());
    }

    #[test]
    fn test_barrier_cost_counts() {
        let mut state = open_map(0..=0, 0..=8);
        state.hex_mut(Coords::new(0, 4)).unwrap().entity = Some(Entity::barrier(1));
        let map = knowledge(&state);

        let costs = PathingConfig::default();
        let path = find_path(&map, Coords::new(0, 0), Coords::new(0, 8), false, &costs).unwrap();
        assert_eq!(path.len(), 4);
        assert_eq!(path.cost, 3 + 6);
    }

    #[test]
    fn test_deterministic() {
        let map = knowledge(&open_map(-4..=4, -8..=8));
        let costs = PathingConfig::default();
        let a = find_path(&map, Coords::new(-4, -8), Coords::new(4, 8), false, &costs);
        for _ in 0..5 {
            assert_eq!(find_path(&map, Coords::new(-4, -8), Coords::new(4, 8), false, &costs), a);
        }
    }
}
