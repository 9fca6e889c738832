pub mod config;
pub mod error;
pub mod types;

pub use config::BotConfig;
pub use error::{HiveError, Result};
pub use types::{PlayerId, Resources, Turn};
