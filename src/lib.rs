//! Hivemind - decision core of a turn-based hex-grid hive strategy bot

pub mod core;
pub mod grid;
pub mod knowledge;
pub mod orchestrator;
pub mod pathfinding;
pub mod session;
pub mod snapshot;
pub mod tactics;
