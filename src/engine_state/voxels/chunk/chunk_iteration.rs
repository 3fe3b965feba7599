//! # Chunk Iteration Module
//!
//! This module provides an iterator over all non-air blocks in a chunk, for bulk
//! consumers such as a mesh builder that only care about occupied cells.

use cgmath::Point3;

use crate::engine_state::voxels::block::{block_type::BlockType, Block};

use super::Chunk;

/// An iterator over all non-air blocks in a chunk.
///
/// Yields each occupied cell's chunk-relative position `(x, y, z)` (with `y` a world
/// height) together with its block type, in storage order: bottom layer first, and
/// within a layer row by row along x.
pub struct ChunkBlockIterator<'a> {
    /// Reference to the chunk being iterated over
    chunk_ref: &'a Chunk,
    /// Next flat index to inspect
    current_offset: usize,
}

impl<'a> ChunkBlockIterator<'a> {
    /// Creates a new `ChunkBlockIterator` positioned before the first cell.
    pub fn new(chunk_ref: &'a Chunk) -> Self {
        ChunkBlockIterator {
            chunk_ref,
            current_offset: 0,
        }
    }
}

impl Iterator for ChunkBlockIterator<'_> {
    type Item = (Point3<usize>, BlockType);

    fn next(&mut self) -> Option<Self::Item> {
        let blocks = self.chunk_ref.blocks();
        while self.current_offset < blocks.len() {
            let index = self.current_offset;
            self.current_offset += 1;

            let block = blocks[index];
            if block != Block::AIR {
                return Some((Chunk::position_of(index), block.block_type()));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.chunk_ref.blocks().len() - self.current_offset;
        (0, Some(remaining))
    }
}
