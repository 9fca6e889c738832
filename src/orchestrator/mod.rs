//! Turn orchestration
//!
//! Architecture: Trait + state object
//! - TurnPolicy trait is the seam a session loop drives
//! - RoleState holds explorer/builder/blocker/saboteur assignments across turns
//! - Strategist owns the knowledge map and sequences the heuristics

pub mod commander;
pub mod roles;

pub use commander::Strategist;
pub use roles::{BlockTask, BuildTask, RoleState, TrackedUnit};

use crate::core::types::PlayerId;
use crate::snapshot::{GameState, Order};

/// Anything that turns a snapshot into an order batch
pub trait TurnPolicy {
    /// Plan one turn for `player`; never fails, may return no orders
    fn plan_turn(&mut self, state: &GameState, player: PlayerId) -> Vec<Order>;
}
