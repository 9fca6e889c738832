//! Bot configuration with documented constants
//!
//! All tuning numbers live here, grouped by the subsystem that reads them.
//! Defaults reproduce the values the bot was tuned with; a TOML file can
//! override any subset of them.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{HiveError, Result};

/// Costs and population targets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Resource cost of spawning one unit at a base
    pub spawn_cost: u32,

    /// Resource cost of building a new base
    pub base_cost: u32,

    /// Target number of friendly units per own base
    ///
    /// Also gates blocker assignment: no blocker leaves until the
    /// population reaches `units_per_base * own_bases`.
    pub units_per_base: usize,

    /// Never build beyond this many own bases
    pub max_bases: usize,

    /// Stop spawning when known resources per player fall below this
    pub min_resources_per_player: u32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            spawn_cost: 6,
            base_cost: 12,
            units_per_base: 5,
            max_bases: 2,
            min_resources_per_player: 6,
        }
    }
}

/// Hive-site scoring weights
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HiveSiteConfig {
    /// Radius (hexes) summed over when scoring a candidate
    pub scan_radius: i32,

    /// Candidates closer than this to an own base are rejected
    pub min_own_distance: i32,

    /// Below this distance to an enemy base the score decays linearly to 0
    pub enemy_safety_distance: i32,

    /// Bonus per hex of distance from the nearest own base
    pub expansion_weight: f64,

    /// Raw scores below this floor are rejected outright
    pub score_floor: f64,

    /// A build is only authorised above this final score
    pub score_threshold: f64,

    /// While fewer Unknown cells than this remain, a base is wanted
    pub unknown_build_limit: usize,
}

impl Default for HiveSiteConfig {
    fn default() -> Self {
        Self {
            scan_radius: 5,
            min_own_distance: 6,
            enemy_safety_distance: 12,
            expansion_weight: 0.10,
            score_floor: 0.1,
            score_threshold: 50.0,
            unknown_build_limit: 7,
        }
    }
}

/// Spawn economics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Radius (hexes) of resource cells counted towards local potential
    pub potential_radius: i32,

    /// Potential per nearby unit above which spawning pays off
    pub break_even_threshold: f64,

    /// Units strictly closer than this to a base count as stationed there
    pub nearby_radius: i32,

    /// With fewer stationed units than this, spawn regardless of potential
    pub min_units_nearby: usize,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            potential_radius: 12,
            break_even_threshold: 0.5,
            nearby_radius: 6,
            min_units_nearby: 3,
        }
    }
}

/// A* step costs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathingConfig {
    /// Cost of entering an open cell
    pub step_cost: u32,

    /// Cost of entering a breakable enemy barrier
    ///
    /// Break-even detour is `barrier_cost - step_cost` extra hexes. With
    /// the defaults (1 vs 6) a detour up to four hexes longer always wins,
    /// five longer ties with the barrier route (insertion order decides)
    /// and six or more longer loses to breaking through.
    pub barrier_cost: u32,
}

impl Default for PathingConfig {
    fn default() -> Self {
        Self {
            step_cost: 1,
            barrier_cost: 6,
        }
    }
}

/// Exploration and edge detection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorationConfig {
    /// How far outwards from each unit the edge scan walks
    pub edge_scan_depth: i32,

    /// An explorer is only kept while at least this many units exist
    pub min_units_for_explorer: usize,
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            edge_scan_depth: 3,
            min_units_for_explorer: 3,
        }
    }
}

/// Complete bot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Seed for the fallback-move RNG
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub economy: EconomyConfig,
    #[serde(default)]
    pub hive_site: HiveSiteConfig,
    #[serde(default)]
    pub spawn: SpawnConfig,
    #[serde(default)]
    pub pathing: PathingConfig,
    #[serde(default)]
    pub exploration: ExplorationConfig,
}

fn default_seed() -> u64 {
    42
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            economy: EconomyConfig::default(),
            hive_site: HiveSiteConfig::default(),
            spawn: SpawnConfig::default(),
            pathing: PathingConfig::default(),
            exploration: ExplorationConfig::default(),
        }
    }
}

impl BotConfig {
    /// Parse a config from TOML text and validate it
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: BotConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.pathing.step_cost == 0 {
            return Err(HiveError::InvalidConfig(
                "pathing.step_cost must be positive".into(),
            ));
        }

        if self.pathing.barrier_cost < self.pathing.step_cost {
            return Err(HiveError::InvalidConfig(format!(
                "pathing.barrier_cost ({}) should be >= step_cost ({})",
                self.pathing.barrier_cost, self.pathing.step_cost
            )));
        }

        if self.hive_site.scan_radius < 1 || self.spawn.potential_radius < 1 {
            return Err(HiveError::InvalidConfig("Scan radii must be positive".into()));
        }

        if self.hive_site.enemy_safety_distance < 1 {
            return Err(HiveError::InvalidConfig(
                "hive_site.enemy_safety_distance must be positive".into(),
            ));
        }

        if self.economy.units_per_base == 0 {
            return Err(HiveError::InvalidConfig(
                "economy.units_per_base must be positive".into(),
            ));
        }

        Ok(())
    }
}
