//! Hex coordinate system (doubled-width coordinates)
//!
//! Cells are addressed by (row, col) where horizontal neighbours are two
//! columns apart and diagonal neighbours one row and one column apart. Only
//! cells with an even `row + col` exist.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Doubled-width hex coordinate
///
/// Ordered row-major, which is the canonical scan order for map-wide
/// searches.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct Coords {
    pub row: i32,
    pub col: i32,
}

impl Coords {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Does this address name a real cell (even row + col parity)?
    pub fn is_valid(&self) -> bool {
        (self.row + self.col).rem_euclid(2) == 0
    }

    /// Hex distance in steps
    pub fn distance(&self, other: &Self) -> i32 {
        let dx = (self.row - other.row).abs();
        let dy = (self.col - other.col).abs();
        if dy < dx {
            dx
        } else {
            dx + (dy - dx) / 2
        }
    }

    /// The cell one step away in `direction`
    pub fn neighbor(&self, direction: Direction) -> Self {
        let offset = direction.offset();
        Self::new(self.row + offset.row, self.col + offset.col)
    }

    /// All six neighbours, in canonical direction order
    pub fn neighbors(&self) -> [Coords; 6] {
        Direction::ALL.map(|d| self.neighbor(d))
    }

    /// Direction of a single step from `self` to `other`, if they are adjacent
    pub fn direction_to(&self, other: &Self) -> Option<Direction> {
        Direction::ALL
            .into_iter()
            .find(|d| self.neighbor(*d) == *other)
    }

    /// All valid cells within `radius` steps (inclusive), row-major
    pub fn hexes_in_range(&self, radius: i32) -> Vec<Coords> {
        let mut results = Vec::new();
        for row in (self.row - radius)..=(self.row + radius) {
            for col in (self.col - 2 * radius)..=(self.col + 2 * radius) {
                let coord = Coords::new(row, col);
                if (coord.row - self.row + coord.col - self.col).rem_euclid(2) != 0 {
                    continue;
                }
                if self.distance(&coord) <= radius {
                    results.push(coord);
                }
            }
        }
        results
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The six legal single-step directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    E,
    SE,
    SW,
    W,
    NW,
    NE,
}

impl Direction {
    /// Canonical scan order, used wherever the chosen neighbour matters
    pub const ALL: [Direction; 6] = [
        Direction::E,
        Direction::SE,
        Direction::SW,
        Direction::W,
        Direction::NW,
        Direction::NE,
    ];

    /// (row, col) delta of one step in this direction
    pub fn offset(&self) -> Coords {
        match self {
            Direction::E => Coords::new(0, 2),
            Direction::SE => Coords::new(1, 1),
            Direction::SW => Coords::new(1, -1),
            Direction::W => Coords::new(0, -2),
            Direction::NW => Coords::new(-1, -1),
            Direction::NE => Coords::new(-1, 1),
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Direction::E => Direction::W,
            Direction::SE => Direction::NW,
            Direction::SW => Direction::NE,
            Direction::W => Direction::E,
            Direction::NW => Direction::SE,
            Direction::NE => Direction::SW,
        }
    }
}
