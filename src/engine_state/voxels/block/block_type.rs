//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world and the
//! checked conversions into them from raw ids and names.

use std::{fmt, str::FromStr};

use num_derive::FromPrimitive;

use crate::engine_state::error::WorldError;

use super::BlockTypeSize;

/// Enumerates all possible block types in the voxel world.
///
/// `AIR` is the canonical empty value: every read outside the world's vertical
/// bounds, or into space that holds no data, resolves to it. The `FromPrimitive`
/// derive backs the checked conversion from raw ids.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, FromPrimitive)]
pub enum BlockType {
    /// Empty space.
    #[default]
    AIR = 0,

    /// Surface block of every biome except desert.
    GRASS = 1,

    /// The layers directly below a grass or sand surface.
    DIRT = 2,

    /// Everything below the dirt layers.
    STONE = 3,

    /// Desert surface block.
    SAND = 4,

    /// Tree trunks.
    WOOD = 5,

    /// Tree canopies.
    LEAVES = 6,

    /// Still water.
    WATER = 7,
}

impl BlockType {
    /// Every block type, in id order.
    pub const ALL: [BlockType; 8] = [
        BlockType::AIR,
        BlockType::GRASS,
        BlockType::DIRT,
        BlockType::STONE,
        BlockType::SAND,
        BlockType::WOOD,
        BlockType::LEAVES,
        BlockType::WATER,
    ];

    /// Converts a raw `BlockTypeSize` id into a `BlockType`.
    ///
    /// # Errors
    /// Returns `WorldError::InvalidBlockType` if the id matches no variant.
    pub fn from_id(btype: BlockTypeSize) -> Result<Self, WorldError> {
        num::FromPrimitive::from_u8(btype).ok_or(WorldError::InvalidBlockType(btype))
    }

    /// The raw id of this block type.
    pub fn id(self) -> BlockTypeSize {
        self as BlockTypeSize
    }

    /// Whether this block occupies its cell (anything but air).
    pub fn is_solid(self) -> bool {
        self != BlockType::AIR
    }

    /// Lower-case name used in logs and configuration.
    pub fn name(self) -> &'static str {
        match self {
            BlockType::AIR => "air",
            BlockType::GRASS => "grass",
            BlockType::DIRT => "dirt",
            BlockType::STONE => "stone",
            BlockType::SAND => "sand",
            BlockType::WOOD => "wood",
            BlockType::LEAVES => "leaves",
            BlockType::WATER => "water",
        }
    }
}

impl TryFrom<BlockTypeSize> for BlockType {
    type Error = WorldError;

    fn try_from(value: BlockTypeSize) -> Result<Self, Self::Error> {
        BlockType::from_id(value)
    }
}

impl FromStr for BlockType {
    type Err = WorldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockType::ALL
            .into_iter()
            .find(|block_type| block_type.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| WorldError::UnknownBlockName(s.to_string()))
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
