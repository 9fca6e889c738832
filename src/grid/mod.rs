//! Hex grid addressing shared by every other module

pub mod hex;

pub use hex::{Coords, Direction};
