//! Per-cell classification stored in the knowledge map

use serde::{Deserialize, Serialize};

use crate::core::types::{PlayerId, Resources};
use crate::snapshot::{EntityKind, Terrain, VisibleHex};

/// What we believe occupies a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TileKind {
    #[default]
    Unknown,
    OwnUnit,
    EnemyUnit,
    OwnBase,
    EnemyBase,
    OwnBarrier,
    EnemyBarrier,
    Empty,
    Obstacle,
    /// Beyond the playable area (inside vision range, yet never reported)
    Edge,
    /// Own unit currently holding the explorer role
    Explorer,
}

impl TileKind {
    pub fn is_friendly_unit(&self) -> bool {
        matches!(self, TileKind::OwnUnit | TileKind::Explorer)
    }

    pub fn is_base(&self) -> bool {
        matches!(self, TileKind::OwnBase | TileKind::EnemyBase)
    }

    /// Two-character symbol used by the grid dump
    pub fn symbol(&self) -> &'static str {
        match self {
            TileKind::Unknown => "? ",
            TileKind::OwnUnit => "B ",
            TileKind::EnemyUnit => "E ",
            TileKind::OwnBase => "H ",
            TileKind::EnemyBase => "X ",
            TileKind::OwnBarrier => "W ",
            TileKind::EnemyBarrier => "V ",
            TileKind::Empty => ". ",
            TileKind::Obstacle => "R ",
            TileKind::Edge => "# ",
            TileKind::Explorer => "S ",
        }
    }
}

/// Everything remembered about one cell
///
/// An `Unknown` tile carries no other meaningful data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Tile {
    pub kind: TileKind,
    /// A unit could stand here if vacated: walkable terrain, no base or barrier
    pub walkable: bool,
    pub owner: Option<PlayerId>,
    pub resources: Resources,
    /// Unit tiles only: the unit carries a resource
    pub has_payload: bool,
}

impl Tile {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn edge() -> Self {
        Self {
            kind: TileKind::Edge,
            ..Self::default()
        }
    }

    /// Classify a freshly observed cell from `observer`'s point of view
    pub fn observe(hex: &VisibleHex, observer: PlayerId) -> Self {
        let terrain_walkable = hex.terrain.is_walkable();
        let mut tile = Tile {
            kind: if hex.terrain == Terrain::Rock {
                TileKind::Obstacle
            } else {
                TileKind::Empty
            },
            walkable: terrain_walkable,
            owner: None,
            resources: hex.resources,
            has_payload: false,
        };

        if let Some(entity) = hex.entity {
            let own = entity.player == observer;
            tile.owner = Some(entity.player);
            tile.kind = match (entity.kind, own) {
                (EntityKind::Bee, true) => TileKind::OwnUnit,
                (EntityKind::Bee, false) => TileKind::EnemyUnit,
                (EntityKind::Hive, true) => TileKind::OwnBase,
                (EntityKind::Hive, false) => TileKind::EnemyBase,
                (EntityKind::Wall, true) => TileKind::OwnBarrier,
                (EntityKind::Wall, false) => TileKind::EnemyBarrier,
            };
            match entity.kind {
                EntityKind::Bee => tile.has_payload = entity.has_flower,
                EntityKind::Hive | EntityKind::Wall => tile.walkable = false,
            }
        }

        tile
    }

    /// Free to step into right now
    pub fn is_open(&self) -> bool {
        self.walkable && self.kind == TileKind::Empty
    }

    /// Not open, but can be attacked through at a higher path cost
    pub fn is_breakable(&self) -> bool {
        self.kind == TileKind::EnemyBarrier
    }

    /// Could host a unit, or might once explored
    pub fn is_walkable_or_unexplored(&self) -> bool {
        self.walkable || self.kind == TileKind::Unknown
    }

    pub fn symbol(&self) -> &'static str {
        if self.kind == TileKind::Empty && self.resources > 0 {
            return "F ";
        }
        self.kind.symbol()
    }
}
