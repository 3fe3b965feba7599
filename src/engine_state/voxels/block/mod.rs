//! # Block Module
//!
//! This module provides the core block-related functionality: the `BlockType`
//! enumeration and the compact `Block` cell stored in chunk arrays.

use block_type::BlockType;

pub mod block_type;

/// The underlying integer type used to represent block types in memory.
pub type BlockTypeSize = u8;

/// Represents a single voxel cell in a chunk array.
///
/// # Memory Layout
/// The `#[repr(C)]` attribute and the `Pod` derive let a whole chunk array be viewed
/// as raw bytes, which is what bulk consumers such as a mesh builder read and what
/// generation determinism is checked against.
#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct Block {
    /// The type of this block, encoded as a `BlockTypeSize` for compact storage.
    pub block_type: BlockTypeSize,
}

impl Block {
    /// An empty cell.
    pub const AIR: Block = Block {
        block_type: BlockType::AIR as BlockTypeSize,
    };

    /// Creates a new block of the specified type.
    pub fn new(block_type: BlockType) -> Self {
        Block {
            block_type: block_type as BlockTypeSize,
        }
    }

    /// The block type stored in this cell.
    ///
    /// Cells are only ever written through `Block::new`, so the stored id is always a
    /// valid variant; a corrupted id reads back as air.
    pub fn block_type(&self) -> BlockType {
        BlockType::from_id(self.block_type).unwrap_or_default()
    }
}

impl Default for Block {
    fn default() -> Self {
        Block::AIR
    }
}

impl From<BlockType> for Block {
    fn from(block_type: BlockType) -> Self {
        Block::new(block_type)
    }
}
