//! # Coordinate System
//!
//! Pure conversions between world block coordinates, chunk coordinates and
//! coordinates local to a chunk.
//!
//! Chunks are full-height columns, so only the horizontal axes are chunked. The
//! conversions use floor division and a non-negative modulo so that negative world
//! coordinates land in the correct chunk: world x = -1 belongs to chunk x = -1 at
//! local x = `CHUNK_SIZE - 1`, not to chunk 0.
//!
//! Only chunks between `MIN_CHUNK` and `MAX_CHUNK` on both axes contain world columns
//! that fit in an `i32`; nothing outside that range is ever built.

use std::fmt;

use crate::engine_state::voxels::chunk::CHUNK_SIZE;

/// Lowest chunk index whose columns are all representable world coordinates.
pub const MIN_CHUNK: i32 = i32::MIN.div_euclid(CHUNK_SIZE);
/// Highest chunk index whose columns are all representable world coordinates.
pub const MAX_CHUNK: i32 = i32::MAX.div_euclid(CHUNK_SIZE);

/// Identifies a chunk column by its horizontal chunk coordinates.
///
/// Used as the key of the world store's chunk map.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// Chunk index along the world x axis.
    pub x: i32,
    /// Chunk index along the world z axis.
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a chunk coordinate.
    pub const fn new(x: i32, z: i32) -> Self {
        ChunkCoord { x, z }
    }

    /// World x/z of the chunk's local (0, 0) column.
    pub fn origin(&self) -> (i32, i32) {
        local_to_world(*self, 0, 0)
    }

    /// Distance to `other` in whole chunks, measured the way the streaming window is
    /// shaped (a square, so the larger axis difference wins).
    pub fn chebyshev_distance(&self, other: ChunkCoord) -> i32 {
        let distance = self.x.abs_diff(other.x).max(self.z.abs_diff(other.z));
        i32::try_from(distance).unwrap_or(i32::MAX)
    }

    /// Whether every column of this chunk has a representable world coordinate.
    pub fn in_world(&self) -> bool {
        (MIN_CHUNK..=MAX_CHUNK).contains(&self.x) && (MIN_CHUNK..=MAX_CHUNK).contains(&self.z)
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Maps a world block column to the chunk containing it.
#[inline]
pub fn world_to_chunk(wx: i32, wz: i32) -> ChunkCoord {
    ChunkCoord::new(wx.div_euclid(CHUNK_SIZE), wz.div_euclid(CHUNK_SIZE))
}

/// Maps a world block column to its offset inside the containing chunk.
///
/// Both components are always in `0..CHUNK_SIZE`.
#[inline]
pub fn world_to_local(wx: i32, wz: i32) -> (usize, usize) {
    (
        wx.rem_euclid(CHUNK_SIZE) as usize,
        wz.rem_euclid(CHUNK_SIZE) as usize,
    )
}

/// Reconstructs the world block column from a chunk and a local offset.
///
/// `coord` must satisfy `ChunkCoord::in_world`.
#[inline]
pub fn local_to_world(coord: ChunkCoord, lx: usize, lz: usize) -> (i32, i32) {
    (
        coord.x * CHUNK_SIZE + lx as i32,
        coord.z * CHUNK_SIZE + lz as i32,
    )
}
