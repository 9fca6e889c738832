//! The in-memory turn contract: what comes in, what goes out

pub mod orders;
pub mod state;

pub use orders::{Order, OrderKind};
pub use state::{
    Entity, EntityKind, GameState, Terrain, VisibilitySource, VisibleHex, VisibleIndex,
};
