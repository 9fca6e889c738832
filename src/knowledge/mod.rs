//! Fog-of-war knowledge accumulated across turns

pub mod dump;
pub mod map;
pub mod tile;

pub use dump::{dump_to_file, render_grid};
pub use map::{KnowledgeMap, RefreshSummary};
pub use tile::{Tile, TileKind};
