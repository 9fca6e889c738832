//! Orders submitted back to the game at the end of a turn

use serde::{Deserialize, Serialize};

use crate::grid::{Coords, Direction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderKind {
    Move,
    /// Pick up a resource in a field, or deposit one next to an own base
    Forage,
    Attack,
    Spawn,
    BuildHive,
}

impl OrderKind {
    /// Does this order need a direction?
    pub fn is_directional(&self) -> bool {
        matches!(self, OrderKind::Move | OrderKind::Attack | OrderKind::Spawn)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "type")]
    pub kind: OrderKind,
    pub coords: Coords,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

impl Order {
    pub fn move_to(coords: Coords, direction: Direction) -> Self {
        Self {
            kind: OrderKind::Move,
            coords,
            direction: Some(direction),
        }
    }

    pub fn attack(coords: Coords, direction: Direction) -> Self {
        Self {
            kind: OrderKind::Attack,
            coords,
            direction: Some(direction),
        }
    }

    pub fn spawn(coords: Coords, direction: Direction) -> Self {
        Self {
            kind: OrderKind::Spawn,
            coords,
            direction: Some(direction),
        }
    }

    pub fn forage(coords: Coords) -> Self {
        Self {
            kind: OrderKind::Forage,
            coords,
            direction: None,
        }
    }

    pub fn build_hive(coords: Coords) -> Self {
        Self {
            kind: OrderKind::BuildHive,
            coords,
            direction: None,
        }
    }

    /// Cell the ordered unit ends up in (or affects), for directional orders
    pub fn destination(&self) -> Option<Coords> {
        self.direction.map(|d| self.coords.neighbor(d))
    }
}
