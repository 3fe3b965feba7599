//! # Terrain Generator
//!
//! Deterministic heightmap terrain: a function from chunk coordinate, biome and world
//! seed to fully populated chunk contents.
//!
//! ## Column heights
//!
//! Each world column samples 2D Perlin noise at its world coordinates divided by
//! `frequency_divisor`. The sample in [-1, 1] maps linearly onto
//! `[min_base_height, max_base_height]`, the biome offset is added and the result is
//! clamped to `[1, WORLD_HEIGHT]`.
//!
//! ## Forest decoration
//!
//! Forest chunks get a fixed number of tree attempts from a random sequence seeded
//! only by the world seed and the chunk coordinate. Trees read heights from the
//! height map of the same pass and only write into air, and they are clipped to the
//! chunk, so they never reach into neighbouring chunks.

use noise::{NoiseFn, Perlin};

use crate::engine_state::config::TerrainConfig;

use super::biome::Biome;
use super::block::block_type::BlockType;
use super::chunk::{in_vertical_bounds, Chunk, ColumnProfile, CHUNK_SIZE, WORLD_HEIGHT};
use super::coords::{local_to_world, ChunkCoord};

const SIZE: usize = CHUNK_SIZE as usize;

/// Surface heights of one chunk, indexed `[x][z]`.
type HeightMap = [[i32; SIZE]; SIZE];

/// Builds chunk contents from the world seed.
pub struct TerrainGenerator {
    seed: u32,
    noise: Perlin,
    config: TerrainConfig,
}

impl TerrainGenerator {
    /// Creates a generator for the world with the given seed.
    pub fn new(seed: u32, config: TerrainConfig) -> Self {
        Self {
            seed,
            noise: Perlin::new(seed),
            config,
        }
    }

    /// The world seed.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// The generator's parameters.
    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Column height before the biome offset and clamping.
    pub fn base_height(&self, wx: i32, wz: i32) -> i32 {
        let divisor = self.config.frequency_divisor;
        let sample = self
            .noise
            .get([wx as f64 / divisor, wz as f64 / divisor])
            .clamp(-1.0, 1.0);

        let min = self.config.min_base_height as f64;
        let span = (self.config.max_base_height - self.config.min_base_height) as f64;
        (min + (sample + 1.0) / 2.0 * span).floor() as i32
    }

    /// Surface height of the world column `(wx, wz)` in `biome`.
    pub fn column_height(&self, wx: i32, wz: i32, biome: Biome) -> i32 {
        (self.base_height(wx, wz) + self.config.height_offset(biome)).clamp(1, WORLD_HEIGHT)
    }

    /// The block a biome uses for its surface cell.
    pub fn surface_block(biome: Biome) -> BlockType {
        match biome {
            Biome::DESERT => BlockType::SAND,
            Biome::PLAINS | Biome::MOUNTAINS | Biome::FOREST => BlockType::GRASS,
        }
    }

    /// Full vertical layering of the world column `(wx, wz)` in `biome`.
    pub fn column_profile(&self, wx: i32, wz: i32, biome: Biome) -> ColumnProfile {
        ColumnProfile {
            height: self.column_height(wx, wz, biome),
            surface: Self::surface_block(biome),
            dirt_depth: self.config.dirt_depth,
        }
    }

    /// Rewrites every cell of `chunk` with terrain for `biome`.
    pub(crate) fn populate(&self, chunk: &mut Chunk, biome: Biome) {
        let coord = chunk.coord();
        let mut heights: HeightMap = [[0; SIZE]; SIZE];

        for lz in 0..SIZE {
            for lx in 0..SIZE {
                let (wx, wz) = local_to_world(coord, lx, lz);
                let profile = self.column_profile(wx, wz, biome);
                chunk.fill_column(lx, lz, &profile);
                heights[lx][lz] = profile.height;
            }
        }

        if biome.has_trees() {
            self.plant_trees(chunk, &heights);
        }
    }

    fn plant_trees(&self, chunk: &mut Chunk, heights: &HeightMap) {
        let mut rng = fastrand::Rng::with_seed(chunk_seed(self.seed, chunk.coord()));
        let radius = self.config.leaf_radius;

        for _ in 0..self.config.tree_attempts {
            let lx = rng.usize(0..SIZE);
            let lz = rng.usize(0..SIZE);
            let surface = heights[lx][lz];
            if surface >= WORLD_HEIGHT {
                continue;
            }

            let top = (surface + self.config.trunk_height).min(WORLD_HEIGHT);
            for y in surface + 1..=top {
                chunk.place_if_air(lx, y, lz, BlockType::WOOD);
            }

            for dy in 0..self.config.leaf_layers {
                let y = top + dy;
                if !in_vertical_bounds(y) {
                    continue;
                }
                for dz in -radius..=radius {
                    for dx in -radius..=radius {
                        let x = lx as i32 + dx;
                        let z = lz as i32 + dz;
                        if !(0..CHUNK_SIZE).contains(&x) || !(0..CHUNK_SIZE).contains(&z) {
                            continue;
                        }
                        if rng.f64() < self.config.leaf_probability {
                            chunk.place_if_air(x as usize, y, z as usize, BlockType::LEAVES);
                        }
                    }
                }
            }
        }
    }
}

/// Seed of the per-chunk random sequence, derived only from the world seed and the
/// chunk coordinate.
pub fn chunk_seed(seed: u32, coord: ChunkCoord) -> u64 {
    let packed = (u64::from(coord.x as u32) << 32) | u64::from(coord.z as u32);
    splitmix64(splitmix64(u64::from(seed)) ^ packed)
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(seed: u32) -> TerrainGenerator {
        TerrainGenerator::new(seed, TerrainConfig::default())
    }

    fn generated(seed: u32, coord: ChunkCoord, biome: Biome) -> Chunk {
        let mut chunk = Chunk::new(coord).unwrap();
        chunk.generate(biome, &generator(seed));
        chunk
    }

    #[test]
    fn base_heights_stay_in_range() {
        let generator = generator(3);
        for wx in (-500..500).step_by(7) {
            for wz in (-500..500).step_by(11) {
                let height = generator.base_height(wx, wz);
                assert!((40..=80).contains(&height), "{height} at ({wx}, {wz})");
            }
        }
    }

    #[test]
    fn plains_columns_are_layered() {
        let generator = generator(11);
        let coord = ChunkCoord::new(3, -4);
        let chunk = generated(11, coord, Biome::PLAINS);

        for lz in 0..SIZE {
            for lx in 0..SIZE {
                let (wx, wz) = local_to_world(coord, lx, lz);
                let height = generator.column_height(wx, wz, Biome::PLAINS);
                assert_eq!(height, generator.base_height(wx, wz));

                assert_eq!(chunk.get_block(lx, height, lz), BlockType::GRASS);
                for y in height - 3..height {
                    assert_eq!(chunk.get_block(lx, y, lz), BlockType::DIRT);
                }
                for y in 1..height - 3 {
                    assert_eq!(chunk.get_block(lx, y, lz), BlockType::STONE);
                }
                for y in height + 1..=WORLD_HEIGHT {
                    assert_eq!(chunk.get_block(lx, y, lz), BlockType::AIR);
                }
            }
        }
    }

    #[test]
    fn desert_is_lower_and_sandy() {
        let generator = generator(11);
        let coord = ChunkCoord::new(-7, 2);
        let chunk = generated(11, coord, Biome::DESERT);

        for lz in 0..SIZE {
            for lx in 0..SIZE {
                let (wx, wz) = local_to_world(coord, lx, lz);
                let height = generator.base_height(wx, wz) - 10;
                assert_eq!(generator.column_height(wx, wz, Biome::DESERT), height);
                assert_eq!(chunk.get_block(lx, height, lz), BlockType::SAND);
                assert_eq!(chunk.get_block(lx, height + 1, lz), BlockType::AIR);
                assert_eq!(chunk.get_block(lx, height - 1, lz), BlockType::DIRT);
            }
        }
    }

    #[test]
    fn mountains_are_raised() {
        let generator = generator(8);
        for wx in -40..40 {
            assert_eq!(
                generator.column_height(wx, 17, Biome::MOUNTAINS),
                generator.base_height(wx, 17) + 20
            );
        }
    }

    #[test]
    fn heights_clamp_to_world() {
        let config = TerrainConfig {
            min_base_height: 200,
            max_base_height: 300,
            ..TerrainConfig::default()
        };
        let high = TerrainGenerator::new(1, config);
        assert_eq!(high.column_height(5, 5, Biome::PLAINS), WORLD_HEIGHT);

        let config = TerrainConfig {
            min_base_height: -50,
            max_base_height: -20,
            ..TerrainConfig::default()
        };
        let low = TerrainGenerator::new(1, config);
        assert_eq!(low.column_height(5, 5, Biome::DESERT), 1);
    }

    #[test]
    fn generation_is_deterministic_per_seed_and_coordinate() {
        for biome in [Biome::PLAINS, Biome::FOREST, Biome::DESERT, Biome::MOUNTAINS] {
            let a = generated(77, ChunkCoord::new(-5, 12), biome);
            let b = generated(77, ChunkCoord::new(-5, 12), biome);
            assert_eq!(a.as_bytes(), b.as_bytes(), "{biome} differs");
        }

        let a = generated(77, ChunkCoord::new(0, 0), Biome::FOREST);
        let b = generated(78, ChunkCoord::new(0, 0), Biome::FOREST);
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn forest_decoration_only_fills_air() {
        let coord = ChunkCoord::new(9, 9);
        let plains = generated(21, coord, Biome::PLAINS);
        let forest = generated(21, coord, Biome::FOREST);

        let mut wood = 0;
        for (index, (&base, &decorated)) in
            plains.as_bytes().iter().zip(forest.as_bytes()).enumerate()
        {
            if base != decorated {
                assert_eq!(base, BlockType::AIR as u8, "overwrote cell {index}");
                assert!(
                    decorated == BlockType::WOOD as u8 || decorated == BlockType::LEAVES as u8,
                    "unexpected block {decorated} at {index}"
                );
                if decorated == BlockType::WOOD as u8 {
                    wood += 1;
                }
            }
        }
        assert!(wood > 0, "no trunks planted");
    }

    #[test]
    fn trunks_stand_on_the_surface() {
        let generator = generator(4);
        let coord = ChunkCoord::new(-1, -1);
        let forest = generated(4, coord, Biome::FOREST);

        for (position, block_type) in forest.solid_blocks() {
            if block_type != BlockType::WOOD {
                continue;
            }
            let (wx, wz) = local_to_world(coord, position.x, position.z);
            let surface = generator.column_height(wx, wz, Biome::FOREST);
            let y = position.y as i32;
            assert!(y > surface && y <= surface + 4, "trunk cell at {y}, surface {surface}");
        }
    }

    #[test]
    fn chunk_seeds_differ_by_coordinate() {
        let base = chunk_seed(1, ChunkCoord::new(0, 0));
        assert_ne!(base, chunk_seed(1, ChunkCoord::new(0, 1)));
        assert_ne!(base, chunk_seed(1, ChunkCoord::new(1, 0)));
        assert_ne!(base, chunk_seed(2, ChunkCoord::new(0, 0)));
        assert_ne!(
            chunk_seed(1, ChunkCoord::new(1, 2)),
            chunk_seed(1, ChunkCoord::new(2, 1))
        );
        assert_eq!(base, chunk_seed(1, ChunkCoord::new(0, 0)));
    }
}
