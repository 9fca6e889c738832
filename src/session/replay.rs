//! Offline session fed from recorded snapshots
//!
//! Input is a JSON array of `GameState`s. Every submitted batch is written to
//! the output as one JSON line: `{"turn": N, "orders": [...]}`.

use serde::Serialize;
use std::collections::VecDeque;
use std::io::Write;
use std::path::Path;

use crate::core::error::{HiveError, Result};
use crate::core::types::Turn;
use crate::session::GameSession;
use crate::snapshot::{GameState, Order};

#[derive(Serialize)]
struct SubmittedTurn<'a> {
    turn: Turn,
    orders: &'a [Order],
}

/// Replays a fixed list of turns and records the answers
pub struct ReplaySession<W: Write> {
    turns: VecDeque<GameState>,
    output: W,
    submitted: usize,
}

impl<W: Write> ReplaySession<W> {
    pub fn new(turns: Vec<GameState>, output: W) -> Self {
        Self {
            turns: turns.into(),
            output,
            submitted: 0,
        }
    }

    /// Load snapshots from a JSON string
    pub fn from_json(json: &str, output: W) -> Result<Self> {
        let turns: Vec<GameState> = serde_json::from_str(json)?;
        Ok(Self::new(turns, output))
    }

    /// Load snapshots from a JSON file on disk
    pub fn from_file(path: &Path, output: W) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content, output)
    }

    pub fn remaining(&self) -> usize {
        self.turns.len()
    }

    pub fn submitted(&self) -> usize {
        self.submitted
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<W: Write> GameSession for ReplaySession<W> {
    fn next_turn(&mut self) -> Result<Option<GameState>> {
        Ok(self.turns.pop_front().filter(|state| !state.game_over))
    }

    fn submit(&mut self, turn: Turn, orders: &[Order]) -> Result<()> {
        if let Some(bad) = orders
            .iter()
            .find(|o| o.kind.is_directional() && o.direction.is_none())
        {
            return Err(HiveError::SessionError(format!(
                "{:?} order at {} has no direction",
                bad.kind, bad.coords
            )));
        }

        let line = serde_json::to_string(&SubmittedTurn { turn, orders })?;
        writeln!(self.output, "{}", line)?;
        self.submitted += 1;
        Ok(())
    }
}
