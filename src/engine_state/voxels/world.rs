//! # World Module
//!
//! This module provides the `WorldStore`, the sole owner of every resident chunk and
//! the world-space entry point for block reads and writes.
//!
//! ## Architecture
//!
//! The world uses a sparse storage approach: a hash map from chunk coordinate to
//! chunk. A chunk is created and generated the first time its coordinate is
//! requested and lives until the streaming manager evicts it. Chunks hold no
//! references to other chunks; anything that needs a neighbour goes back through the
//! store by coordinate.
//!
//! ## Chunk Generation
//!
//! Generation is synchronous and completes before a chunk is inserted, so a chunk in
//! the map is always generated. Chunks built on worker threads enter through
//! `publish`, which enforces the same rule. Regenerating an evicted chunk reproduces
//! exactly the content it had before.
//!
//! ## Performance Considerations
//!
//! - Chunk lookup is O(1) using a hash map
//! - Block access is one lookup plus one array index
//! - Only chunks inside the streaming window stay in memory

use std::collections::HashMap;
use std::sync::Arc;

use cgmath::Point3;
use log::{debug, trace};

use crate::core::MtResource;
use crate::engine_state::{config::WorldConfig, error::WorldError};

use super::biome::BiomeClassifier;
use super::block::block_type::BlockType;
use super::chunk::{in_vertical_bounds, Chunk};
use super::coords::{world_to_chunk, world_to_local, ChunkCoord};
use super::terrain::TerrainGenerator;

/// Classifies, allocates and generates the chunk at `coord`.
///
/// This is the one place chunks are built, whether inline by the store or on a
/// generation worker.
pub fn build_chunk(
    coord: ChunkCoord,
    classifier: &BiomeClassifier,
    generator: &TerrainGenerator,
) -> Result<Chunk, WorldError> {
    let biome = classifier.classify(coord);
    let mut chunk = Chunk::new(coord)?;
    chunk.generate(biome, generator);
    debug!("Generated chunk {coord} ({biome})");
    Ok(chunk)
}

/// Owning registry of resident chunks.
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use voxel_world::engine_state::config::WorldConfig;
/// use voxel_world::engine_state::voxels::block::block_type::BlockType;
/// use voxel_world::engine_state::voxels::world::WorldStore;
///
/// let mut world = WorldStore::new(&WorldConfig::default());
/// world.set_block(Point3::new(-3, 120, 40), BlockType::WOOD).unwrap();
/// assert_eq!(world.get_block(Point3::new(-3, 120, 40)).unwrap(), BlockType::WOOD);
/// assert_eq!(world.resident_count(), 1);
/// ```
pub struct WorldStore {
    /// A mapping from chunk coordinates to chunk data.
    chunks: HashMap<ChunkCoord, MtResource<Chunk>>,
    classifier: Arc<BiomeClassifier>,
    generator: Arc<TerrainGenerator>,
}

impl WorldStore {
    /// Creates a new, empty world for `config`.
    pub fn new(config: &WorldConfig) -> Self {
        WorldStore {
            chunks: HashMap::new(),
            classifier: Arc::new(BiomeClassifier::new(config.seed, config.biomes.clone())),
            generator: Arc::new(TerrainGenerator::new(config.seed, config.terrain.clone())),
        }
    }

    /// The world seed.
    pub fn seed(&self) -> u32 {
        self.generator.seed()
    }

    /// The biome classifier, shareable with generation workers.
    pub fn classifier(&self) -> Arc<BiomeClassifier> {
        self.classifier.clone()
    }

    /// The terrain generator, shareable with generation workers.
    pub fn generator(&self) -> Arc<TerrainGenerator> {
        self.generator.clone()
    }

    /// Returns the chunk at `coord`, generating it first if it is not resident.
    ///
    /// # Errors
    /// Returns `WorldError::ResourceExhausted` if a new chunk cannot be allocated and
    /// `WorldError::OutOfWorld` if `coord` is beyond the representable chunk range.
    /// The map is left unchanged in both cases.
    pub fn get_chunk(&mut self, coord: ChunkCoord) -> Result<MtResource<Chunk>, WorldError> {
        if let Some(chunk) = self.chunks.get(&coord) {
            return Ok(chunk.clone());
        }

        let chunk = MtResource::new(build_chunk(coord, &self.classifier, &self.generator)?);
        self.chunks.insert(coord, chunk.clone());
        Ok(chunk)
    }

    /// Returns the chunk at `coord` only if it is resident.
    pub fn get_loaded_chunk(&self, coord: ChunkCoord) -> Option<MtResource<Chunk>> {
        self.chunks.get(&coord).cloned()
    }

    /// Reads the block at a world position.
    ///
    /// Heights outside the world read as air without touching storage. Any other
    /// position loads (and if needed generates) the one chunk containing it.
    ///
    /// # Errors
    /// Only `WorldError::ResourceExhausted`, when the containing chunk had to be built
    /// and could not be allocated.
    pub fn get_block(&mut self, position: Point3<i32>) -> Result<BlockType, WorldError> {
        if !in_vertical_bounds(position.y) {
            return Ok(BlockType::AIR);
        }

        let chunk = self.get_chunk(world_to_chunk(position.x, position.z))?;
        let (lx, lz) = world_to_local(position.x, position.z);
        let block_type = chunk.get().get_block(lx, position.y, lz);
        Ok(block_type)
    }

    /// Writes the block at a world position.
    ///
    /// Heights outside the world are ignored. Any other position loads (and if needed
    /// generates) the containing chunk and marks it dirty.
    ///
    /// # Errors
    /// Only `WorldError::ResourceExhausted`, as for `get_block`.
    pub fn set_block(
        &mut self,
        position: Point3<i32>,
        block_type: BlockType,
    ) -> Result<(), WorldError> {
        if !in_vertical_bounds(position.y) {
            return Ok(());
        }

        let chunk = self.get_chunk(world_to_chunk(position.x, position.z))?;
        let (lx, lz) = world_to_local(position.x, position.z);
        chunk.get_mut().set_block(lx, position.y, lz, block_type);
        Ok(())
    }

    /// Reads the block at a world position without generating anything.
    ///
    /// Positions in chunks that are not resident read as air.
    pub fn peek_block(&self, position: Point3<i32>) -> BlockType {
        if !in_vertical_bounds(position.y) {
            return BlockType::AIR;
        }

        match self.chunks.get(&world_to_chunk(position.x, position.z)) {
            Some(chunk) => {
                let (lx, lz) = world_to_local(position.x, position.z);
                chunk.get().get_block(lx, position.y, lz)
            }
            None => BlockType::AIR,
        }
    }

    /// Height of the highest non-air block in the world column `(wx, wz)`.
    ///
    /// Entities use this to stand on the terrain. Loads the containing chunk.
    pub fn surface_height(&mut self, wx: i32, wz: i32) -> Result<Option<i32>, WorldError> {
        let chunk = self.get_chunk(world_to_chunk(wx, wz))?;
        let (lx, lz) = world_to_local(wx, wz);
        let height = chunk.get().column_height(lx, lz);
        Ok(height)
    }

    /// Inserts a chunk that was built elsewhere.
    ///
    /// Returns `Ok(false)` and drops `chunk` if its coordinate is already resident; the
    /// resident chunk may carry edits the new one lacks.
    ///
    /// # Errors
    /// Returns `WorldError::NotGenerated` if terrain generation has not run on `chunk`.
    pub fn publish(&mut self, chunk: Chunk) -> Result<bool, WorldError> {
        let coord = chunk.coord();
        if !chunk.is_generated() {
            return Err(WorldError::NotGenerated(coord));
        }
        if self.chunks.contains_key(&coord) {
            trace!("Dropping duplicate chunk {coord}");
            return Ok(false);
        }

        self.chunks.insert(coord, MtResource::new(chunk));
        Ok(true)
    }

    /// Removes the chunk at `coord` from the world.
    ///
    /// Storage is released once the last outstanding handle is dropped. Returns
    /// whether a chunk was resident.
    pub fn evict(&mut self, coord: ChunkCoord) -> bool {
        let removed = self.chunks.remove(&coord).is_some();
        if removed {
            debug!("Evicted chunk {coord}");
        }
        removed
    }

    /// Whether a chunk is resident at `coord`.
    pub fn is_resident(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    /// Number of resident chunks.
    pub fn resident_count(&self) -> usize {
        self.chunks.len()
    }

    /// Coordinates of every resident chunk, in no particular order.
    pub fn resident_coords(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.chunks.keys().copied()
    }

    /// Resident chunks whose dirty flag is set, for a mesh builder to pick up.
    pub fn dirty_chunks(&self) -> Vec<(ChunkCoord, MtResource<Chunk>)> {
        self.chunks
            .iter()
            .filter(|(_, chunk)| chunk.get().is_dirty())
            .map(|(coord, chunk)| (*coord, chunk.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::config::BiomeConfig;
    use crate::engine_state::voxels::{biome::Biome, chunk::WORLD_HEIGHT, coords::local_to_world};

    fn world() -> WorldStore {
        WorldStore::new(&WorldConfig {
            seed: 2024,
            ..WorldConfig::default()
        })
    }

    #[test]
    fn get_chunk_generates_once() {
        let mut world = world();
        let first = world.get_chunk(ChunkCoord::new(1, -1)).unwrap();
        let second = world.get_chunk(ChunkCoord::new(1, -1)).unwrap();

        assert!(first.ptr_eq(&second));
        assert!(first.get().is_generated());
        assert_eq!(world.resident_count(), 1);
    }

    #[test]
    fn chunks_beyond_the_world_are_never_stored() {
        let mut world = world();
        let outside = ChunkCoord::new(0, i32::MIN);
        assert!(matches!(
            world.get_chunk(outside),
            Err(WorldError::OutOfWorld(coord)) if coord == outside
        ));
        assert_eq!(world.resident_count(), 0);
    }

    #[test]
    fn block_access_routes_to_the_right_chunk() {
        let mut world = world();
        world
            .set_block(Point3::new(-1, 100, -1), BlockType::WATER)
            .unwrap();

        assert!(world.is_resident(ChunkCoord::new(-1, -1)));
        let chunk = world.get_loaded_chunk(ChunkCoord::new(-1, -1)).unwrap();
        assert_eq!(chunk.get().get_block(15, 100, 15), BlockType::WATER);
        assert_eq!(
            world.get_block(Point3::new(-1, 100, -1)).unwrap(),
            BlockType::WATER
        );
    }

    #[test]
    fn out_of_bounds_heights_touch_nothing() {
        let mut world = world();
        assert_eq!(world.get_block(Point3::new(5, 0, 5)).unwrap(), BlockType::AIR);
        assert_eq!(
            world.get_block(Point3::new(5, WORLD_HEIGHT + 1, 5)).unwrap(),
            BlockType::AIR
        );
        world
            .set_block(Point3::new(5, -3, 5), BlockType::STONE)
            .unwrap();

        assert_eq!(world.resident_count(), 0);
    }

    #[test]
    fn peek_never_generates() {
        let mut world = world();
        assert_eq!(world.peek_block(Point3::new(0, 1, 0)), BlockType::AIR);
        assert_eq!(world.resident_count(), 0);

        let loaded = world.get_block(Point3::new(0, 1, 0)).unwrap();
        assert_eq!(loaded, BlockType::STONE);
        assert_eq!(world.peek_block(Point3::new(0, 1, 0)), BlockType::STONE);
    }

    #[test]
    fn surface_height_matches_the_generator() {
        let mut world = WorldStore::new(&WorldConfig {
            seed: 2024,
            biomes: BiomeConfig {
                desert_threshold: -2.0,
                forest_threshold: 2.0,
                mountains_threshold: 2.0,
                ..BiomeConfig::default()
            },
            ..WorldConfig::default()
        });
        let coord = ChunkCoord::new(0, 3);
        assert_eq!(world.classifier().classify(coord), Biome::PLAINS);

        let generator = world.generator();
        for (lx, lz) in [(0, 0), (5, 11), (15, 15)] {
            let (wx, wz) = local_to_world(coord, lx, lz);
            let expected = generator.column_height(wx, wz, Biome::PLAINS);
            assert_eq!(world.surface_height(wx, wz).unwrap(), Some(expected));
        }

        let (wx, wz) = coord.origin();
        world
            .set_block(Point3::new(wx, WORLD_HEIGHT, wz), BlockType::LEAVES)
            .unwrap();
        assert_eq!(world.surface_height(wx, wz).unwrap(), Some(WORLD_HEIGHT));
    }

    #[test]
    fn evicted_chunks_regenerate_identically() {
        let mut world = world();
        let coord = ChunkCoord::new(-6, 4);
        let before = world.get_chunk(coord).unwrap().get().as_bytes().to_vec();

        assert!(world.evict(coord));
        assert!(!world.evict(coord));
        assert!(!world.is_resident(coord));

        let after = world.get_chunk(coord).unwrap();
        assert_eq!(after.get().as_bytes(), before.as_slice());
    }

    #[test]
    fn edits_do_not_survive_eviction() {
        let mut world = world();
        let position = Point3::new(3, WORLD_HEIGHT, 3);
        world.set_block(position, BlockType::SAND).unwrap();
        world.evict(ChunkCoord::new(0, 0));

        assert_eq!(world.get_block(position).unwrap(), BlockType::AIR);
    }

    #[test]
    fn publish_rejects_ungenerated_and_duplicate_chunks() {
        let mut world = world();
        let coord = ChunkCoord::new(2, 2);

        let raw = Chunk::new(coord).unwrap();
        assert!(matches!(
            world.publish(raw),
            Err(WorldError::NotGenerated(c)) if c == coord
        ));
        assert!(!world.is_resident(coord));

        let built = build_chunk(coord, &world.classifier(), &world.generator()).unwrap();
        assert!(world.publish(built.clone()).unwrap());
        assert!(!world.publish(built).unwrap());
        assert_eq!(world.resident_count(), 1);
    }

    #[test]
    fn dirty_chunks_lists_only_dirty_ones() {
        let mut world = world();
        for x in 0..3 {
            world.get_chunk(ChunkCoord::new(x, 0)).unwrap();
        }
        assert_eq!(world.dirty_chunks().len(), 3);

        for (_, chunk) in world.dirty_chunks() {
            chunk.get_mut().clear_dirty();
        }
        assert!(world.dirty_chunks().is_empty());

        world
            .set_block(Point3::new(20, 90, 1), BlockType::DIRT)
            .unwrap();
        let dirty = world.dirty_chunks();
        assert_eq!(dirty.len(), 1);
        assert_eq!(dirty[0].0, ChunkCoord::new(1, 0));
    }
}
