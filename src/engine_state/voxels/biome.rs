//! # Biome Classifier
//!
//! Assigns each chunk column a biome from low-frequency 2D Perlin noise.
//!
//! Classification is a pure function of the chunk coordinate and the world seed. It
//! never touches chunk storage, so it can be queried before a chunk exists and its
//! result handed to the terrain generator.

use std::fmt;

use noise::{NoiseFn, Perlin};
use num_derive::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::engine_state::{config::BiomeConfig, error::WorldError};

use super::coords::ChunkCoord;

/// Mixed into the world seed so biome noise is independent of height noise.
const BIOME_SEED_SALT: u32 = 0x5EED_B10E;

/// Terrain style of a chunk, driving generator parameters.
#[repr(u8)]
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, FromPrimitive, Serialize, Deserialize,
)]
pub enum Biome {
    /// Unmodified base height, grass surface.
    #[default]
    PLAINS = 0,
    /// Raised terrain.
    MOUNTAINS = 1,
    /// Base height with trees.
    FOREST = 2,
    /// Lowered terrain with a sand surface.
    DESERT = 3,
}

impl Biome {
    /// Converts a raw biome id.
    ///
    /// # Errors
    /// Returns `WorldError::InvalidBiome` if the id matches no variant.
    pub fn from_id(id: u8) -> Result<Self, WorldError> {
        num::FromPrimitive::from_u8(id).ok_or(WorldError::InvalidBiome(id))
    }

    /// Whether the generator decorates this biome with trees.
    pub fn has_trees(self) -> bool {
        self == Biome::FOREST
    }
}

impl TryFrom<u8> for Biome {
    type Error = WorldError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Biome::from_id(value)
    }
}

impl fmt::Display for Biome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Biome::PLAINS => "plains",
            Biome::MOUNTAINS => "mountains",
            Biome::FOREST => "forest",
            Biome::DESERT => "desert",
        };
        f.write_str(name)
    }
}

/// Maps chunk coordinates to biomes.
pub struct BiomeClassifier {
    noise: Perlin,
    config: BiomeConfig,
}

impl BiomeClassifier {
    /// Creates a classifier for the world with the given seed.
    pub fn new(seed: u32, config: BiomeConfig) -> Self {
        Self {
            noise: Perlin::new(seed ^ BIOME_SEED_SALT),
            config,
        }
    }

    /// Raw biome noise for a chunk, in roughly [-1, 1].
    pub fn sample(&self, coord: ChunkCoord) -> f64 {
        self.noise.get([
            coord.x as f64 / self.config.scale,
            coord.z as f64 / self.config.scale,
        ])
    }

    /// The biome of the chunk at `coord`.
    pub fn classify(&self, coord: ChunkCoord) -> Biome {
        self.classify_sample(self.sample(coord))
    }

    /// Applies the biome thresholds to a noise sample.
    ///
    /// Thresholds are checked highest first, so a sample above the mountain threshold
    /// is never classified as forest.
    pub fn classify_sample(&self, sample: f64) -> Biome {
        if sample > self.config.mountains_threshold {
            Biome::MOUNTAINS
        } else if sample > self.config.forest_threshold {
            Biome::FOREST
        } else if sample < self.config.desert_threshold {
            Biome::DESERT
        } else {
            Biome::PLAINS
        }
    }
}
