//! Game session seam
//!
//! The decision core never talks to the game directly. A session hands it
//! one snapshot per turn and takes the order batch back; a network client
//! would implement the same trait as the offline replay.

pub mod replay;

pub use replay::ReplaySession;

use std::path::Path;

use crate::core::error::Result;
use crate::core::types::{PlayerId, Turn};
use crate::knowledge::dump_to_file;
use crate::orchestrator::{Strategist, TurnPolicy};
use crate::snapshot::{GameState, Order};

/// Source of turns and sink for orders
pub trait GameSession {
    /// Block until the next turn is ours; None once the game is over
    fn next_turn(&mut self) -> Result<Option<GameState>>;

    /// Hand back the orders for `turn`
    fn submit(&mut self, turn: Turn, orders: &[Order]) -> Result<()>;
}

/// Drive a strategist through a whole session, returning the number of
/// turns played
///
/// With `dump` set, the knowledge map is written there after every turn.
pub fn play(
    session: &mut impl GameSession,
    strategist: &mut Strategist,
    player: PlayerId,
    dump: Option<&Path>,
) -> Result<usize> {
    let mut turns = 0;
    while let Some(state) = session.next_turn()? {
        let orders = strategist.plan_turn(&state, player);
        tracing::debug!("Turn {}: submitting {} orders", state.turn, orders.len());
        session.submit(state.turn, &orders)?;
        if let Some(path) = dump {
            dump_to_file(strategist.map(), path)?;
        }
        turns += 1;
    }
    tracing::info!("Session finished after {} turns", turns);
    Ok(turns)
}
