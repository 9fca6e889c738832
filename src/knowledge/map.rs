//! Persistent fog-of-war map
//!
//! Cells in the current vision are reclassified every turn. Cells outside it
//! keep their last observed state, so knowledge only accumulates. Unknown
//! fringe cells are added around the known region to give exploration a
//! target.

use ahash::AHashSet;
use std::collections::{BTreeMap, BTreeSet};

use crate::core::types::{PlayerId, Resources};
use crate::grid::Coords;
use crate::knowledge::tile::{Tile, TileKind};
use crate::snapshot::{EntityKind, GameState, VisibilitySource};

/// What a refresh changed, for logging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub observed: usize,
    pub edges_found: usize,
    pub ghosts_cleared: usize,
}

/// Everything the bot believes about the board
#[derive(Debug, Clone, Default)]
pub struct KnowledgeMap {
    tiles: BTreeMap<Coords, Tile>,
    /// Destination cells claimed by a friendly unit this turn
    reserved: AHashSet<Coords>,
    own_bases: BTreeSet<Coords>,
    enemy_bases: BTreeSet<Coords>,
    resource_cells: BTreeSet<Coords>,
    own_units: BTreeSet<Coords>,
    resource_total: Resources,
    enemy_unit_count: usize,
}

impl KnowledgeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one turn's observation into the map
    ///
    /// Visible cells are overwritten, unseen cells are left alone. Own-unit
    /// tiles outside the vision are dead units and become Empty. Indexes are
    /// rebuilt from the whole persisted map afterwards.
    pub fn refresh(
        &mut self,
        state: &GameState,
        observer: PlayerId,
        edge_scan_depth: i32,
    ) -> RefreshSummary {
        let index = state.index();
        let mut summary = RefreshSummary::default();

        for hex in &state.hexes {
            self.tiles.insert(hex.coords, Tile::observe(hex, observer));
            summary.observed += 1;
        }

        for (coords, tile) in self.tiles.iter_mut() {
            if tile.kind.is_friendly_unit() && !index.observes(*coords) {
                tile.kind = TileKind::Empty;
                tile.owner = None;
                tile.has_payload = false;
                summary.ghosts_cleared += 1;
            }
        }

        self.own_units = state
            .hexes
            .iter()
            .filter(|h| {
                h.entity
                    .is_some_and(|e| e.kind == EntityKind::Bee && e.player == observer)
            })
            .map(|h| h.coords)
            .collect();

        let viewers: Vec<Coords> = self.own_units.iter().copied().collect();
        for viewer in viewers {
            summary.edges_found += self.scan_edges(viewer, &index, edge_scan_depth);
        }

        self.reindex();
        summary
    }

    /// Walk outwards from a friendly unit and mark the first unobserved step
    /// in each direction as Edge
    ///
    /// Vision always covers `depth` hexes, so a missing cell that close is
    /// off the board rather than fogged. Returns the number of new edges.
    pub fn scan_edges(
        &mut self,
        viewer: Coords,
        source: &impl VisibilitySource,
        depth: i32,
    ) -> usize {
        let mut found = 0;
        for direction in crate::grid::Direction::ALL {
            let mut position = viewer;
            for _ in 0..depth {
                let next = position.neighbor(direction);
                if !source.observes(next) {
                    if self.mark_edge(next) {
                        found += 1;
                    }
                    break;
                }
                position = next;
            }
        }
        found
    }

    /// Mark a cell as Edge unless it holds observed knowledge
    fn mark_edge(&mut self, coords: Coords) -> bool {
        match self.tiles.get(&coords).map(|t| t.kind) {
            None | Some(TileKind::Unknown) => {
                self.tiles.insert(coords, Tile::edge());
                tracing::debug!("Edge found at {}", coords);
                true
            }
            _ => false,
        }
    }

    /// Add Unknown cells around every known, non-Edge cell
    ///
    /// Never overwrites an existing entry. Returns the number inserted.
    pub fn expand_fringe(&mut self) -> usize {
        let fringe: BTreeSet<Coords> = self
            .tiles
            .iter()
            .filter(|(_, t)| !matches!(t.kind, TileKind::Unknown | TileKind::Edge))
            .flat_map(|(c, _)| c.neighbors())
            .filter(|n| !self.tiles.contains_key(n))
            .collect();

        let added = fringe.len();
        for coords in fringe {
            self.tiles.insert(coords, Tile::unknown());
        }
        added
    }

    fn reindex(&mut self) {
        self.own_bases.clear();
        self.enemy_bases.clear();
        self.resource_cells.clear();
        self.resource_total = 0;
        self.enemy_unit_count = 0;

        for (coords, tile) in &self.tiles {
            match tile.kind {
                TileKind::OwnBase => {
                    self.own_bases.insert(*coords);
                }
                TileKind::EnemyBase => {
                    self.enemy_bases.insert(*coords);
                }
                TileKind::EnemyUnit => self.enemy_unit_count += 1,
                _ => {}
            }
            if tile.resources > 0 {
                self.resource_cells.insert(*coords);
                self.resource_total += tile.resources;
            }
        }
    }

    // === Lookups ===

    pub fn tile(&self, coords: Coords) -> Option<&Tile> {
        self.tiles.get(&coords)
    }

    /// Classification of a cell; absent cells read as Unknown
    pub fn kind(&self, coords: Coords) -> TileKind {
        self.tiles
            .get(&coords)
            .map(|t| t.kind)
            .unwrap_or(TileKind::Unknown)
    }

    pub fn contains(&self, coords: Coords) -> bool {
        self.tiles.contains_key(&coords)
    }

    /// Open for movement; absent cells are not
    pub fn is_open(&self, coords: Coords) -> bool {
        self.tiles.get(&coords).is_some_and(|t| t.is_open())
    }

    pub fn is_walkable(&self, coords: Coords) -> bool {
        self.tiles.get(&coords).is_some_and(|t| t.walkable)
    }

    /// Walkable or not yet explored (absent cells count as unexplored)
    pub fn is_walkable_or_unexplored(&self, coords: Coords) -> bool {
        self.tiles
            .get(&coords)
            .map_or(true, |t| t.is_walkable_or_unexplored())
    }

    pub fn resources_at(&self, coords: Coords) -> Resources {
        self.tiles.get(&coords).map_or(0, |t| t.resources)
    }

    pub fn has_payload(&self, coords: Coords) -> bool {
        self.tiles.get(&coords).is_some_and(|t| t.has_payload)
    }

    pub fn is_friendly_unit(&self, coords: Coords) -> bool {
        self.kind(coords).is_friendly_unit()
    }

    /// All tiles, row-major
    pub fn iter(&self) -> impl Iterator<Item = (&Coords, &Tile)> {
        self.tiles.iter()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn own_bases(&self) -> &BTreeSet<Coords> {
        &self.own_bases
    }

    pub fn enemy_bases(&self) -> &BTreeSet<Coords> {
        &self.enemy_bases
    }

    pub fn resource_cells(&self) -> &BTreeSet<Coords> {
        &self.resource_cells
    }

    pub fn own_units(&self) -> &BTreeSet<Coords> {
        &self.own_units
    }

    pub fn resource_total(&self) -> Resources {
        self.resource_total
    }

    pub fn enemy_unit_count(&self) -> usize {
        self.enemy_unit_count
    }

    pub fn unknown_count(&self) -> usize {
        self.tiles
            .values()
            .filter(|t| t.kind == TileKind::Unknown)
            .count()
    }

    pub fn exploration_complete(&self) -> bool {
        self.unknown_count() == 0
    }

    /// Distance from `coords` to the closest own base, if any is known
    pub fn distance_to_nearest_own_base(&self, coords: Coords) -> Option<i32> {
        self.own_bases.iter().map(|b| b.distance(&coords)).min()
    }

    /// Closest own base (first in row-major order on ties)
    pub fn nearest_own_base(&self, coords: Coords) -> Option<Coords> {
        self.own_bases
            .iter()
            .copied()
            .min_by_key(|b| b.distance(&coords))
    }

    pub fn distance_to_nearest_enemy_base(&self, coords: Coords) -> Option<i32> {
        self.enemy_bases.iter().map(|b| b.distance(&coords)).min()
    }

    // === Per-turn state ===

    /// Tag the explorer's cell for the rest of the turn
    pub fn mark_explorer(&mut self, coords: Coords) {
        if let Some(tile) = self.tiles.get_mut(&coords) {
            if tile.kind == TileKind::OwnUnit {
                tile.kind = TileKind::Explorer;
            }
        }
    }

    pub fn reserve(&mut self, coords: Coords) {
        self.reserved.insert(coords);
    }

    pub fn is_reserved(&self, coords: Coords) -> bool {
        self.reserved.contains(&coords)
    }

    pub fn clear_reservations(&mut self) {
        self.reserved.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{Entity, Terrain};

    fn field_with_unit() -> GameState {
        let mut state = GameState::new(1, 2);
        state.fill_open(-2..=2, -4..=4);
        state.hex_mut(Coords::new(0, 0)).unwrap().entity = Some(Entity::unit(0));
        state
    }

    #[test]
    fn test_refresh_classifies_visible_cells() {
        let mut state = field_with_unit();
        state.set_hex(Coords::new(1, 1), Terrain::Rock);
        state.set_hex(Coords::new(0, 2), Terrain::Field).resources = 4;

        let mut map = KnowledgeMap::new();
        map.refresh(&state, 0, 0);

        assert_eq!(map.kind(Coords::new(0, 0)), TileKind::OwnUnit);
        assert_eq!(map.kind(Coords::new(1, 1)), TileKind::Obstacle);
        assert_eq!(map.resources_at(Coords::new(0, 2)), 4);
        assert_eq!(map.resource_total(), 4);
        assert!(map.own_units().contains(&Coords::new(0, 0)));
    }

    #[test]
    fn test_unseen_cells_keep_last_state() {
        let mut state = field_with_unit();
        state.hex_mut(Coords::new(2, 4)).unwrap().entity = Some(Entity::base(1));
        let mut map = KnowledgeMap::new();
        map.refresh(&state, 0, 0);

        // Next turn the base is out of sight
        let mut later = field_with_unit();
        later.hide(Coords::new(2, 4));
        map.refresh(&later, 0, 0);

        assert_eq!(map.kind(Coords::new(2, 4)), TileKind::EnemyBase);
        assert!(map.enemy_bases().contains(&Coords::new(2, 4)));
    }

    #[test]
    fn test_resource_index_covers_fogged_cells() {
        let mut state = field_with_unit();
        state.hex_mut(Coords::new(-2, -4)).unwrap().resources = 3;
        state.hex_mut(Coords::new(2, 4)).unwrap().resources = 2;
        let mut map = KnowledgeMap::new();
        map.refresh(&state, 0, 0);

        let mut later = field_with_unit();
        later.hide(Coords::new(-2, -4));
        map.refresh(&later, 0, 0);

        assert_eq!(map.resource_total(), 5);
        assert!(map.resource_cells().contains(&Coords::new(-2, -4)));
    }

    #[test]
    fn test_unseen_own_unit_becomes_empty() {
        let mut state = field_with_unit();
        state.hex_mut(Coords::new(2, 4)).unwrap().entity = Some(Entity::unit(0));
        let mut map = KnowledgeMap::new();
        map.refresh(&state, 0, 0);

        let mut later = field_with_unit();
        later.hide(Coords::new(2, 4));
        let summary = map.refresh(&later, 0, 0);

        assert_eq!(summary.ghosts_cleared, 1);
        assert_eq!(map.kind(Coords::new(2, 4)), TileKind::Empty);
        assert!(!map.own_units().contains(&Coords::new(2, 4)));
    }

    #[test]
    fn test_fringe_surrounds_known_region() {
        let mut map = KnowledgeMap::new();
        map.refresh(&field_with_unit(), 0, 0);
        let known = map.len();

        let added = map.expand_fringe();
        assert!(added > 0);
        assert_eq!(map.len(), known + added);
        assert_eq!(map.unknown_count(), added);
        assert_eq!(map.kind(Coords::new(0, 6)), TileKind::Unknown);
        // Fringe is one ring only
        assert!(!map.contains(Coords::new(0, 8)));

        // Idempotent once the ring exists
        assert_eq!(map.expand_fringe(), 0);
    }

    #[test]
    fn test_fringe_never_overwrites_known_cells() {
        let mut state = field_with_unit();
        state.set_hex(Coords::new(0, 2), Terrain::Rock);
        let mut map = KnowledgeMap::new();
        map.refresh(&state, 0, 0);
        map.expand_fringe();

        for (coords, tile) in map.iter() {
            if state.index().observes(*coords) {
                assert_ne!(tile.kind, TileKind::Unknown, "observed {} downgraded", coords);
            }
        }
        assert_eq!(map.kind(Coords::new(0, 2)), TileKind::Obstacle);
    }

    #[test]
    fn test_scan_edges_marks_board_boundary() {
        // Board ends two columns east of the unit
        let mut state = GameState::new(1, 2);
        state.fill_open(-3..=3, -6..=2);
        state.hex_mut(Coords::new(0, 0)).unwrap().entity = Some(Entity::unit(0));

        let mut map = KnowledgeMap::new();
        let summary = map.refresh(&state, 0, 3);

        assert!(summary.edges_found > 0);
        assert_eq!(map.kind(Coords::new(0, 4)), TileKind::Edge);
        // Westwards the board continues for three steps: no edge
        assert_ne!(map.kind(Coords::new(0, -6)), TileKind::Edge);
        assert!(!map.contains(Coords::new(0, -8)));
    }

    #[test]
    fn test_edges_do_not_grow_fringe() {
        let mut state = GameState::new(1, 2);
        state.fill_open(-3..=3, -6..=2);
        state.hex_mut(Coords::new(0, 0)).unwrap().entity = Some(Entity::unit(0));
        let mut map = KnowledgeMap::new();
        map.refresh(&state, 0, 3);
        map.expand_fringe();

        assert_eq!(map.kind(Coords::new(0, 4)), TileKind::Edge);
        assert!(!map.contains(Coords::new(0, 6)));
    }

    #[test]
    fn test_edge_scan_never_downgrades_observed_cell() {
        let mut state = field_with_unit();
        state.hex_mut(Coords::new(0, 4)).unwrap().resources = 2;
        let mut map = KnowledgeMap::new();
        map.refresh(&state, 0, 0);

        // Same unit, smaller vision: (0, 4) unobserved but known
        let mut later = GameState::new(2, 2);
        later.fill_open(-1..=1, -2..=2);
        later.hex_mut(Coords::new(0, 0)).unwrap().entity = Some(Entity::unit(0));
        map.refresh(&later, 0, 3);

        assert_eq!(map.kind(Coords::new(0, 4)), TileKind::Empty);
        assert_eq!(map.resources_at(Coords::new(0, 4)), 2);
    }

    #[test]
    fn test_exploration_complete() {
        let mut map = KnowledgeMap::new();
        assert!(map.exploration_complete());
        map.refresh(&field_with_unit(), 0, 0);
        map.expand_fringe();
        assert!(!map.exploration_complete());
    }

    #[test]
    fn test_reservations() {
        let mut map = KnowledgeMap::new();
        map.reserve(Coords::new(0, 2));
        assert!(map.is_reserved(Coords::new(0, 2)));
        map.clear_reservations();
        assert!(!map.is_reserved(Coords::new(0, 2)));
    }

    #[test]
    fn test_absent_cells_are_safe_defaults() {
        let map = KnowledgeMap::new();
        let nowhere = Coords::new(40, 40);
        assert!(!map.is_open(nowhere));
        assert!(!map.is_walkable(nowhere));
        assert_eq!(map.resources_at(nowhere), 0);
        assert_eq!(map.kind(nowhere), TileKind::Unknown);
    }
}
