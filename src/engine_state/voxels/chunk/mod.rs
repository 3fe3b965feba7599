//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a fixed-footprint, full-height column of
//! blocks that is the unit of generation, storage and eviction.
//!
//! ## Storage
//!
//! Blocks live in a dense array laid out as `[WORLD_HEIGHT][CHUNK_SIZE][CHUNK_SIZE]`
//! (y, then z, then x), one byte per cell. The array is allocated once when the chunk
//! is created and never resized, so every access is a single index computation.
//!
//! ## Coordinates
//!
//! Local x and z are 0-based in `0..CHUNK_SIZE`; passing anything else is a caller
//! bug. Heights are world heights: valid cells are `1..=WORLD_HEIGHT`, and anything
//! outside that range reads as `BlockType::AIR` and ignores writes.
//!
//! ## State flags
//!
//! - `generated` becomes `true` once terrain generation has filled the chunk. The
//!   world store never exposes a chunk without it.
//! - `dirty` becomes `true` whenever blocks change. A downstream mesh builder reads
//!   and clears it; nothing in this crate clears it.

use cgmath::Point3;

use super::biome::Biome;
use super::block::{block_type::BlockType, Block};
use super::coords::ChunkCoord;
use super::terrain::TerrainGenerator;

use chunk_iteration::ChunkBlockIterator;

mod chunk_creation;
pub mod chunk_iteration;

pub use chunk_creation::ColumnProfile;

/// The horizontal dimension (width and depth) of a chunk in blocks.
pub const CHUNK_SIZE: i32 = 16;
/// Height of the world, and of every chunk, in blocks.
pub const WORLD_HEIGHT: i32 = 128;
/// The number of columns in a chunk (CHUNK_SIZE²).
pub const CHUNK_AREA: usize = (CHUNK_SIZE * CHUNK_SIZE) as usize;
/// The total number of cells in a chunk.
pub const CHUNK_VOLUME: usize = CHUNK_AREA * WORLD_HEIGHT as usize;

/// A full-height column of blocks covering `CHUNK_SIZE` x `CHUNK_SIZE` world columns.
#[derive(Clone, Debug)]
pub struct Chunk {
    /// The position of this chunk in chunk coordinates.
    coord: ChunkCoord,
    /// Dense block storage, exactly `CHUNK_VOLUME` cells.
    blocks: Vec<Block>,
    /// The biome this chunk was generated with.
    biome: Option<Biome>,
    generated: bool,
    dirty: bool,
}

/// Whether `y` names a cell inside the world's vertical bounds.
#[inline]
pub fn in_vertical_bounds(y: i32) -> bool {
    (1..=WORLD_HEIGHT).contains(&y)
}

impl Chunk {
    #[inline]
    fn index(lx: usize, y: i32, lz: usize) -> Option<usize> {
        debug_assert!(
            lx < CHUNK_SIZE as usize && lz < CHUNK_SIZE as usize,
            "local coordinates ({lx}, {lz}) outside chunk"
        );
        if !in_vertical_bounds(y) {
            return None;
        }
        Some(((y - 1) as usize * CHUNK_SIZE as usize + lz) * CHUNK_SIZE as usize + lx)
    }

    /// Gets the block at the specified chunk-relative coordinates.
    ///
    /// Returns `BlockType::AIR` if `y` is outside `1..=WORLD_HEIGHT`.
    pub fn get_block(&self, lx: usize, y: i32, lz: usize) -> BlockType {
        match Self::index(lx, y, lz) {
            Some(index) => self.blocks[index].block_type(),
            None => BlockType::AIR,
        }
    }

    /// Sets the block at the specified chunk-relative coordinates and marks the chunk
    /// dirty.
    ///
    /// Does nothing if `y` is outside `1..=WORLD_HEIGHT`.
    pub fn set_block(&mut self, lx: usize, y: i32, lz: usize, block_type: BlockType) {
        if let Some(index) = Self::index(lx, y, lz) {
            self.blocks[index] = Block::new(block_type);
            self.dirty = true;
        }
    }

    /// Fills the chunk with terrain for `biome` and marks it generated and dirty.
    ///
    /// Every cell is rewritten, so generating an already generated chunk again with the
    /// same biome and generator reproduces identical content.
    pub fn generate(&mut self, biome: Biome, generator: &TerrainGenerator) {
        generator.populate(self, biome);
        self.biome = Some(biome);
        self.generated = true;
        self.dirty = true;
    }

    /// The chunk's coordinate.
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// The biome the chunk was generated with, if it has been generated.
    pub fn biome(&self) -> Option<Biome> {
        self.biome
    }

    /// Whether terrain generation has run on this chunk.
    pub fn is_generated(&self) -> bool {
        self.generated
    }

    /// Whether blocks changed since the flag was last cleared.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clears the dirty flag. Called by the consumer that rebuilt its mesh.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// The raw block array, in `[y][z][x]` order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// The raw block array viewed as bytes, one block type id per cell.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.blocks)
    }

    /// Iterates over every non-air cell with its chunk-relative position.
    pub fn solid_blocks(&self) -> ChunkBlockIterator<'_> {
        ChunkBlockIterator::new(self)
    }

    /// The highest non-air cell in a column, or `None` for an empty column.
    pub fn column_height(&self, lx: usize, lz: usize) -> Option<i32> {
        (1..=WORLD_HEIGHT)
            .rev()
            .find(|&y| self.get_block(lx, y, lz).is_solid())
    }

    /// Chunk-relative position of a flat array index.
    pub(crate) fn position_of(index: usize) -> Point3<usize> {
        let size = CHUNK_SIZE as usize;
        Point3::new(index % size, index / CHUNK_AREA + 1, (index / size) % size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::config::TerrainConfig;

    fn empty_chunk() -> Chunk {
        Chunk::new(ChunkCoord::new(0, 0)).unwrap()
    }

    #[test]
    fn new_chunk_is_air_and_clean() {
        let chunk = empty_chunk();
        assert_eq!(chunk.blocks().len(), CHUNK_VOLUME);
        assert!(chunk.as_bytes().iter().all(|&b| b == 0));
        assert!(!chunk.is_generated());
        assert!(!chunk.is_dirty());
        assert_eq!(chunk.biome(), None);
    }

    #[test]
    fn set_then_get_marks_dirty() {
        let mut chunk = empty_chunk();
        chunk.set_block(3, 10, 12, BlockType::STONE);

        assert_eq!(chunk.get_block(3, 10, 12), BlockType::STONE);
        assert_eq!(chunk.get_block(12, 10, 3), BlockType::AIR);
        assert!(chunk.is_dirty());

        chunk.clear_dirty();
        assert!(!chunk.is_dirty());
        assert_eq!(chunk.get_block(3, 10, 12), BlockType::STONE);
    }

    #[test]
    fn vertical_bounds_read_air_and_ignore_writes() {
        let mut chunk = empty_chunk();
        chunk.set_block(0, 0, 0, BlockType::STONE);
        chunk.set_block(0, WORLD_HEIGHT + 1, 0, BlockType::STONE);
        chunk.set_block(0, -5, 0, BlockType::STONE);

        assert!(!chunk.is_dirty());
        assert!(chunk.as_bytes().iter().all(|&b| b == 0));
        assert_eq!(chunk.get_block(0, 0, 0), BlockType::AIR);
        assert_eq!(chunk.get_block(0, WORLD_HEIGHT + 1, 0), BlockType::AIR);
        assert_eq!(chunk.get_block(0, i32::MIN, 0), BlockType::AIR);

        chunk.set_block(15, WORLD_HEIGHT, 15, BlockType::LEAVES);
        chunk.set_block(0, 1, 0, BlockType::STONE);
        assert_eq!(chunk.get_block(15, WORLD_HEIGHT, 15), BlockType::LEAVES);
        assert_eq!(chunk.get_block(0, 1, 0), BlockType::STONE);
    }

    #[test]
    fn layout_is_y_then_z_then_x() {
        let mut chunk = empty_chunk();
        chunk.set_block(1, 2, 3, BlockType::WOOD);

        let index = (CHUNK_SIZE as usize + 3) * CHUNK_SIZE as usize + 1;
        assert_eq!(chunk.as_bytes()[index], BlockType::WOOD as u8);
        assert_eq!(Chunk::position_of(index), Point3::new(1, 2, 3));
    }

    #[test]
    fn generate_sets_flags_and_is_repeatable() {
        let generator = TerrainGenerator::new(5, TerrainConfig::default());
        let mut chunk = Chunk::new(ChunkCoord::new(-2, 9)).unwrap();
        chunk.generate(Biome::FOREST, &generator);

        assert!(chunk.is_generated());
        assert!(chunk.is_dirty());
        assert_eq!(chunk.biome(), Some(Biome::FOREST));

        let first = chunk.as_bytes().to_vec();
        chunk.set_block(0, WORLD_HEIGHT, 0, BlockType::WATER);
        chunk.generate(Biome::FOREST, &generator);
        assert_eq!(chunk.as_bytes(), first.as_slice());
    }

    #[test]
    fn column_height_finds_the_top_cell() {
        let mut chunk = empty_chunk();
        assert_eq!(chunk.column_height(4, 4), None);

        chunk.set_block(4, 7, 4, BlockType::DIRT);
        chunk.set_block(4, 30, 4, BlockType::LEAVES);
        assert_eq!(chunk.column_height(4, 4), Some(30));
    }
}
