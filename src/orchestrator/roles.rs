//! Role bookkeeping that survives between turns
//!
//! Units carry no identity in a snapshot, so each role remembers the cell
//! its unit was last seen on (and where it was ordered to go) and finds it
//! again next turn.

use std::collections::{BTreeMap, BTreeSet};

use crate::grid::Coords;
use crate::knowledge::KnowledgeMap;
use crate::snapshot::{Order, OrderKind};
use crate::tactics::BlockTable;

/// A friendly unit followed across turns by position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedUnit {
    last: Coords,
    expected: Option<Coords>,
}

impl TrackedUnit {
    pub fn new(cell: Coords) -> Self {
        Self {
            last: cell,
            expected: None,
        }
    }

    pub fn last(&self) -> Coords {
        self.last
    }

    /// Record this turn's position and the order given to the unit
    pub fn follow(&mut self, cell: Coords, order: Option<&Order>) {
        self.last = cell;
        self.expected = order
            .filter(|o| o.kind == OrderKind::Move)
            .and_then(|o| o.destination());
    }

    /// Current cell of the unit, or None if it is missing
    ///
    /// Looks at the expected destination, then the last cell, then its six
    /// neighbours. Cells already claimed by another role are skipped.
    pub fn locate(&self, map: &KnowledgeMap, claimed: &BTreeSet<Coords>) -> Option<Coords> {
        self.expected
            .into_iter()
            .chain(std::iter::once(self.last))
            .chain(self.last.neighbors())
            .find(|cell| !claimed.contains(cell) && map.is_friendly_unit(*cell))
    }
}

/// Unit walking to a hive site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildTask {
    pub unit: TrackedUnit,
    pub site: Coords,
}

/// Unit walking to the staging cell of an enemy base
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockTask {
    pub unit: TrackedUnit,
    pub base: Coords,
    pub staging: Coords,
}

/// Everything the orchestrator remembers about unit roles
#[derive(Debug, Clone, Default)]
pub struct RoleState {
    pub explorer: Option<TrackedUnit>,
    /// Sticky exploration target
    pub explorer_target: Option<Coords>,
    pub builder: Option<BuildTask>,
    pub blocker: Option<BlockTask>,
    /// Saboteur cell -> enemy base it guards
    pub saboteurs: BTreeMap<Coords, Coords>,
    pub blocks: BlockTable,
}

impl RoleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn explorer_cell(&self) -> Option<Coords> {
        self.explorer.map(|u| u.last())
    }
}

/// Friendly units without a role, carrying nothing, in row-major order
pub fn free_units<'a>(
    map: &'a KnowledgeMap,
    claimed: &'a BTreeSet<Coords>,
) -> impl Iterator<Item = Coords> + 'a {
    map.own_units()
        .iter()
        .copied()
        .filter(move |u| !claimed.contains(u) && !map.has_payload(*u))
}

/// Free unit farthest from its nearest own base
pub fn pick_explorer(map: &KnowledgeMap, claimed: &BTreeSet<Coords>) -> Option<Coords> {
    free_units(map, claimed)
        .min_by_key(|u| std::cmp::Reverse(map.distance_to_nearest_own_base(*u).unwrap_or(0)))
}

/// Free unit closest to `target`
pub fn nearest_free_unit(
    map: &KnowledgeMap,
    claimed: &BTreeSet<Coords>,
    target: Coords,
) -> Option<Coords> {
    free_units(map, claimed).min_by_key(|u| u.distance(&target))
}
