//! # World Errors
//!
//! All errors that can surface from the voxel world core.
//!
//! The query path is built to never fail: reads outside the vertical bounds resolve to
//! `BlockType::AIR` and writes there are ignored. What remains are caller contract
//! violations at the boundary (unknown block or biome ids), allocation failure while
//! building a chunk, and configuration or thread-pool start-up problems.

use std::io;

use thiserror::Error;

use crate::engine_state::voxels::coords::ChunkCoord;

/// Errors that can occur in the voxel world.
#[derive(Debug, Error)]
pub enum WorldError {
    /// A raw block type id that matches no `BlockType` variant.
    #[error("invalid block type id: {0}")]
    InvalidBlockType(u8),

    /// A block type name that matches no `BlockType` variant.
    #[error("unknown block type name: {0:?}")]
    UnknownBlockName(String),

    /// A raw biome id that matches no `Biome` variant.
    #[error("invalid biome id: {0}")]
    InvalidBiome(u8),

    /// The block array for a chunk could not be allocated.
    #[error("could not allocate {bytes} bytes of block storage for chunk {coord}")]
    ResourceExhausted {
        /// The chunk being built.
        coord: ChunkCoord,
        /// Size of the failed allocation.
        bytes: usize,
    },

    /// A chunk coordinate whose columns lie beyond the `i32` world coordinate range.
    #[error("chunk {0} lies outside the world")]
    OutOfWorld(ChunkCoord),

    /// A chunk was handed to the world store before terrain generation ran on it.
    #[error("chunk {0} was published before it was generated")]
    NotGenerated(ChunkCoord),

    /// A configuration value is out of its allowed range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration document could not be parsed.
    #[error("could not parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Reading the configuration file failed.
    #[error("could not read configuration: {0}")]
    Io(#[from] io::Error),

    /// A generation worker thread could not be started.
    #[error("could not spawn generation worker: {source}")]
    WorkerSpawn {
        /// The underlying spawn failure.
        source: io::Error,
    },
}
