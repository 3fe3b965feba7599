//! # Chunk Creation Module
//!
//! Allocation of chunk storage and the write primitives terrain generation builds a
//! chunk with.
//!
//! Storage is reserved with a fallible allocation so that running out of memory
//! while streaming surfaces as `WorldError::ResourceExhausted` on the operation that
//! needed the chunk instead of aborting the process.

use crate::engine_state::{
    error::WorldError,
    voxels::{block::{block_type::BlockType, Block}, coords::ChunkCoord},
};

use super::{Chunk, CHUNK_VOLUME, WORLD_HEIGHT};

/// Vertical layering of one generated column.
///
/// Cells above `height` are air, the cell at `height` is the surface block, the
/// `dirt_depth` cells below it are dirt and everything further down is stone.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ColumnProfile {
    /// World height of the surface cell, in `1..=WORLD_HEIGHT`.
    pub height: i32,
    /// Block placed at `height`.
    pub surface: BlockType,
    /// Number of dirt cells under the surface.
    pub dirt_depth: i32,
}

impl ColumnProfile {
    /// The block this profile places at world height `y`.
    pub fn block_at(&self, y: i32) -> BlockType {
        if y > self.height || y < 1 {
            BlockType::AIR
        } else if y == self.height {
            self.surface
        } else if y >= self.height - self.dirt_depth {
            BlockType::DIRT
        } else {
            BlockType::STONE
        }
    }
}

impl Chunk {
    /// Creates a new, ungenerated chunk filled with air.
    ///
    /// # Errors
    /// Returns `WorldError::OutOfWorld` if `coord` is outside the representable chunk
    /// range and `WorldError::ResourceExhausted` if the block array cannot be allocated.
    pub fn new(coord: ChunkCoord) -> Result<Self, WorldError> {
        if !coord.in_world() {
            return Err(WorldError::OutOfWorld(coord));
        }

        let mut blocks = Vec::new();
        blocks
            .try_reserve_exact(CHUNK_VOLUME)
            .map_err(|_| WorldError::ResourceExhausted {
                coord,
                bytes: CHUNK_VOLUME * std::mem::size_of::<Block>(),
            })?;
        blocks.resize(CHUNK_VOLUME, Block::AIR);

        Ok(Chunk {
            coord,
            blocks,
            biome: None,
            generated: false,
            dirty: false,
        })
    }

    /// Writes every cell of one column from `profile`.
    pub(crate) fn fill_column(&mut self, lx: usize, lz: usize, profile: &ColumnProfile) {
        for y in 1..=WORLD_HEIGHT {
            if let Some(index) = Self::index(lx, y, lz) {
                self.blocks[index] = Block::new(profile.block_at(y));
            }
        }
    }

    /// Writes `block_type` only if the cell is inside the world and currently air.
    ///
    /// Returns whether the cell was written. Decoration uses this so it can never
    /// overwrite terrain or an earlier decoration.
    pub(crate) fn place_if_air(
        &mut self,
        lx: usize,
        y: i32,
        lz: usize,
        block_type: BlockType,
    ) -> bool {
        match Self::index(lx, y, lz) {
            Some(index) if self.blocks[index] == Block::AIR => {
                self.blocks[index] = Block::new(block_type);
                true
            }
            _ => false,
        }
    }
}
