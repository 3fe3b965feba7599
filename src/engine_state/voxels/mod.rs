//! # Voxel World Core
//!
//! This module contains the chunked block storage and the streaming logic that keeps
//! a bounded working set of chunks resident around an observer.
//!
//! ## Architecture
//!
//! The voxel system is organized into several key components, leaf first:
//!
//! * **Coords**: Conversions between world, chunk and chunk-local coordinates
//! * **Block**: Block types and the compact cell stored in chunk arrays
//! * **Chunk**: Fixed-footprint, full-height block columns with dirty/generated flags
//! * **Biome**: Low-frequency noise classification of chunks
//! * **Terrain**: Deterministic heightmap generation and forest decoration
//! * **World**: The owning registry of resident chunks and the world-space block API
//! * **Streaming**: Loads and evicts chunks to match the observer's window
//! * **Tasks**: Chunk generation on worker threads
//!
//! ## Data Flow
//!
//! 1. The streaming manager asks the world for every chunk in the observer's window
//! 2. The world classifies, generates and stores any chunk it does not have
//! 3. The streaming manager evicts resident chunks outside the window
//! 4. Block reads and writes from outside go through the world's world-space API
//!
//! ## Determinism
//!
//! A chunk's content depends only on the world seed and its coordinate, so an evicted
//! chunk comes back identical when the observer returns.

pub mod biome;
pub mod block;
pub mod chunk;
pub mod coords;
pub mod streaming;
pub mod tasks;
pub mod terrain;
pub mod world;
