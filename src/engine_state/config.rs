//! # World Configuration
//!
//! Tunable parameters for terrain generation, biome classification and streaming.
//!
//! Every field has a default equal to the documented constant, so an empty JSON
//! object (or no file at all) yields the standard world. Configuration is read once
//! when the engine starts and validated before any chunk is generated.
//!
//! ```
//! use voxel_world::engine_state::config::WorldConfig;
//!
//! let config = WorldConfig::from_json_str(r#"{ "seed": 7, "render_distance": 2 }"#).unwrap();
//! assert_eq!(config.seed, 7);
//! assert_eq!(config.terrain.dirt_depth, 3);
//! ```

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::engine_state::{error::WorldError, voxels::biome::Biome};

/// Default number of chunks kept loaded on each side of the observer.
pub const DEFAULT_RENDER_DISTANCE: i32 = 4;

/// Top-level configuration for a world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Seed for every noise function and per-chunk random sequence.
    pub seed: u32,
    /// Half-width of the square window of resident chunks, in chunks.
    pub render_distance: i32,
    /// Worker threads used for chunk generation. Zero generates inline.
    pub generation_workers: usize,
    /// Column height and decoration parameters.
    pub terrain: TerrainConfig,
    /// Biome noise parameters.
    pub biomes: BiomeConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            render_distance: DEFAULT_RENDER_DISTANCE,
            generation_workers: 0,
            terrain: TerrainConfig::default(),
            biomes: BiomeConfig::default(),
        }
    }
}

/// Parameters of the column height formula and the forest decoration pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// World coordinates are divided by this before sampling height noise.
    pub frequency_divisor: f64,
    /// Column height produced by a noise sample of -1.
    pub min_base_height: i32,
    /// Column height produced by a noise sample of 1.
    pub max_base_height: i32,
    /// Height added to mountain columns.
    pub mountains_offset: i32,
    /// Height added to desert columns.
    pub desert_offset: i32,
    /// Number of dirt cells between the surface block and stone.
    pub dirt_depth: i32,
    /// Tree placement attempts per forest chunk.
    pub tree_attempts: u32,
    /// Trunk length in cells.
    pub trunk_height: i32,
    /// Horizontal reach of the canopy from the trunk.
    pub leaf_radius: i32,
    /// Vertical thickness of the canopy, starting at the trunk top.
    pub leaf_layers: i32,
    /// Chance that any single canopy cell receives leaves.
    pub leaf_probability: f64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            frequency_divisor: 50.0,
            min_base_height: 40,
            max_base_height: 80,
            mountains_offset: 20,
            desert_offset: -10,
            dirt_depth: 3,
            tree_attempts: 5,
            trunk_height: 4,
            leaf_radius: 2,
            leaf_layers: 3,
            leaf_probability: 0.7,
        }
    }
}

impl TerrainConfig {
    /// Fixed height adjustment applied on top of the base formula for `biome`.
    pub fn height_offset(&self, biome: Biome) -> i32 {
        match biome {
            Biome::MOUNTAINS => self.mountains_offset,
            Biome::DESERT => self.desert_offset,
            Biome::PLAINS | Biome::FOREST => 0,
        }
    }
}

/// Parameters of the biome classifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomeConfig {
    /// Chunk coordinates are divided by this before sampling biome noise.
    pub scale: f64,
    /// Noise above this is mountains.
    pub mountains_threshold: f64,
    /// Noise above this (and not mountains) is forest.
    pub forest_threshold: f64,
    /// Noise below this is desert.
    pub desert_threshold: f64,
}

impl Default for BiomeConfig {
    fn default() -> Self {
        Self {
            scale: 10.0,
            mountains_threshold: 0.6,
            forest_threshold: 0.3,
            desert_threshold: -0.3,
        }
    }
}

impl WorldConfig {
    /// Parses and validates a JSON configuration document.
    pub fn from_json_str(text: &str) -> Result<Self, WorldError> {
        let config: WorldConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, WorldError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks that every value is in a range the generator can work with.
    pub fn validate(&self) -> Result<(), WorldError> {
        if self.render_distance < 0 {
            return Err(invalid(format!(
                "render_distance must not be negative, got {}",
                self.render_distance
            )));
        }

        let terrain = &self.terrain;
        if !(terrain.frequency_divisor.is_finite() && terrain.frequency_divisor > 0.0) {
            return Err(invalid(format!(
                "terrain.frequency_divisor must be positive, got {}",
                terrain.frequency_divisor
            )));
        }
        if terrain.min_base_height > terrain.max_base_height {
            return Err(invalid(format!(
                "terrain.min_base_height ({}) exceeds terrain.max_base_height ({})",
                terrain.min_base_height, terrain.max_base_height
            )));
        }
        if terrain.dirt_depth < 0 || terrain.trunk_height < 0 || terrain.leaf_radius < 0 {
            return Err(invalid(
                "terrain.dirt_depth, trunk_height and leaf_radius must not be negative".to_string(),
            ));
        }
        if terrain.leaf_layers < 0 {
            return Err(invalid(format!(
                "terrain.leaf_layers must not be negative, got {}",
                terrain.leaf_layers
            )));
        }
        if !(0.0..=1.0).contains(&terrain.leaf_probability) {
            return Err(invalid(format!(
                "terrain.leaf_probability must be within [0, 1], got {}",
                terrain.leaf_probability
            )));
        }

        let biomes = &self.biomes;
        if !(biomes.scale.is_finite() && biomes.scale > 0.0) {
            return Err(invalid(format!(
                "biomes.scale must be positive, got {}",
                biomes.scale
            )));
        }
        if !(biomes.desert_threshold <= biomes.forest_threshold
            && biomes.forest_threshold <= biomes.mountains_threshold)
        {
            return Err(invalid(
                "biome thresholds must satisfy desert <= forest <= mountains".to_string(),
            ));
        }

        Ok(())
    }
}

fn invalid(message: String) -> WorldError {
    WorldError::InvalidConfig(message)
}
