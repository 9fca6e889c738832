//! Core type definitions used throughout the codebase

/// Player identifier as assigned by the game server
pub type PlayerId = usize;

/// Turn counter
pub type Turn = u32;

/// Resource units (flowers in the field, balance in the bank)
pub type Resources = u32;
