//! Per-turn observation handed over by the session
//!
//! Only the currently visible cells are present. Everything else is fog.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::core::types::{PlayerId, Resources, Turn};
use crate::grid::Coords;

/// Terrain descriptor of a visible cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Terrain {
    #[default]
    Empty,
    Field,
    Rock,
}

impl Terrain {
    pub fn is_walkable(&self) -> bool {
        !matches!(self, Terrain::Rock)
    }
}

/// What can occupy a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Bee,
    Hive,
    Wall,
}

/// An occupant of a visible cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    pub player: PlayerId,
    /// Units only: carrying a resource back home
    #[serde(default)]
    pub has_flower: bool,
}

impl Entity {
    pub fn unit(player: PlayerId) -> Self {
        Self {
            kind: EntityKind::Bee,
            player,
            has_flower: false,
        }
    }

    pub fn loaded_unit(player: PlayerId) -> Self {
        Self {
            has_flower: true,
            ..Self::unit(player)
        }
    }

    pub fn base(player: PlayerId) -> Self {
        Self {
            kind: EntityKind::Hive,
            player,
            has_flower: false,
        }
    }

    pub fn barrier(player: PlayerId) -> Self {
        Self {
            kind: EntityKind::Wall,
            player,
            has_flower: false,
        }
    }
}

/// A single visible cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibleHex {
    pub coords: Coords,
    #[serde(default)]
    pub terrain: Terrain,
    #[serde(default)]
    pub resources: Resources,
    #[serde(default)]
    pub entity: Option<Entity>,
}

/// Snapshot of one turn from one player's point of view
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameState {
    pub turn: Turn,
    pub num_players: usize,
    pub player_resources: Vec<Resources>,
    pub hexes: Vec<VisibleHex>,
    #[serde(default)]
    pub game_over: bool,
}

impl GameState {
    pub fn new(turn: Turn, num_players: usize) -> Self {
        Self {
            turn,
            num_players,
            player_resources: vec![0; num_players],
            hexes: Vec::new(),
            game_over: false,
        }
    }

    /// Balance of a player, zero for unknown ids
    pub fn resources_of(&self, player: PlayerId) -> Resources {
        self.player_resources.get(player).copied().unwrap_or(0)
    }

    /// Add (or replace) a visible cell
    pub fn set_hex(&mut self, coords: Coords, terrain: Terrain) -> &mut VisibleHex {
        let index = match self.hexes.iter().position(|h| h.coords == coords) {
            Some(index) => {
                self.hexes[index].terrain = terrain;
                index
            }
            None => {
                self.hexes.push(VisibleHex {
                    coords,
                    terrain,
                    resources: 0,
                    entity: None,
                });
                self.hexes.len() - 1
            }
        };
        &mut self.hexes[index]
    }

    /// Fill every valid cell of a rectangle with open terrain
    pub fn fill_open(&mut self, rows: RangeInclusive<i32>, cols: RangeInclusive<i32>) {
        for row in rows {
            for col in cols.clone() {
                let coords = Coords::new(row, col);
                if coords.is_valid() {
                    self.set_hex(coords, Terrain::Empty);
                }
            }
        }
    }

    /// Remove a cell from the visible set
    pub fn hide(&mut self, coords: Coords) {
        self.hexes.retain(|h| h.coords != coords);
    }

    pub fn hex_mut(&mut self, coords: Coords) -> Option<&mut VisibleHex> {
        self.hexes.iter_mut().find(|h| h.coords == coords)
    }

    /// Lookup table over the visible cells
    pub fn index(&self) -> VisibleIndex {
        VisibleIndex {
            cells: self.hexes.iter().map(|h| h.coords).collect(),
        }
    }
}

/// Anything that can answer "was this cell observed this turn?"
pub trait VisibilitySource {
    fn observes(&self, coords: Coords) -> bool;
}

/// Hash set of a snapshot's visible cells
pub struct VisibleIndex {
    cells: AHashSet<Coords>,
}

impl VisibilitySource for VisibleIndex {
    fn observes(&self, coords: Coords) -> bool {
        self.cells.contains(&coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_open_skips_invalid_cells() {
        let mut state = GameState::new(1, 2);
        state.fill_open(0..=1, 0..=3);
        assert_eq!(state.hexes.len(), 4);
        assert!(state.hexes.iter().all(|h| h.coords.is_valid()));
    }

    #[test]
    fn test_set_hex_replaces() {
        let mut state = GameState::new(1, 2);
        state.set_hex(Coords::new(0, 0), Terrain::Empty);
        state.set_hex(Coords::new(0, 0), Terrain::Rock);
        assert_eq!(state.hexes.len(), 1);
        assert_eq!(state.hexes[0].terrain, Terrain::Rock);
    }

    #[test]
    fn test_index_observes() {
        let mut state = GameState::new(1, 2);
        state.set_hex(Coords::new(2, 2), Terrain::Field);
        let index = state.index();
        assert!(index.observes(Coords::new(2, 2)));
        assert!(!index.observes(Coords::new(0, 0)));
    }

    #[test]
    fn test_snapshot_json_shape() {
        let json = r#"{
            "turn": 3,
            "num_players": 2,
            "player_resources": [10, 4],
            "hexes": [
                {"coords": {"row": 0, "col": 0}, "terrain": "EMPTY",
                 "entity": {"kind": "BEE", "player": 0, "has_flower": true}},
                {"coords": {"row": 0, "col": 2}, "terrain": "FIELD", "resources": 5},
                {"coords": {"row": 1, "col": 1}, "terrain": "ROCK"}
            ]
        }"#;
        let state: GameState = serde_json::from_str(json).unwrap();
        assert_eq!(state.turn, 3);
        assert_eq!(state.resources_of(1), 4);
        assert_eq!(state.resources_of(5), 0);
        assert!(state.hexes[0].entity.unwrap().has_flower);
        assert_eq!(state.hexes[1].resources, 5);
        assert!(!state.hexes[2].terrain.is_walkable());
        assert!(!state.game_over);
    }
}
