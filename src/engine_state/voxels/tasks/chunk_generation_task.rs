//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask`, which builds a chunk on a worker
//! thread. The finished chunk is only handed to the world store once it is fully
//! generated, so no accessor ever sees a partially built chunk.

use std::collections::HashSet;
use std::sync::Arc;

use log::trace;

use crate::{
    core::MtResource,
    engine_state::{
        error::WorldError,
        task_management::task::{Task, TaskResult},
        voxels::{
            biome::BiomeClassifier,
            chunk::Chunk,
            coords::ChunkCoord,
            terrain::TerrainGenerator,
            world::{build_chunk, WorldStore},
        },
    },
};

/// A task that generates one chunk off the owning thread.
///
/// 1. Classifies and generates the chunk on a worker
/// 2. Publishes it to the world on the owning thread
/// 3. Clears its coordinate from the shared in-flight set, whether or not it
///    succeeded, so the streaming manager can schedule it again if needed
/// 4. Hands a generation failure back to the manager's caller
pub struct ChunkGenerationTask {
    classifier: Arc<BiomeClassifier>,
    generator: Arc<TerrainGenerator>,
    /// Coordinates with a generation task outstanding
    in_flight: MtResource<HashSet<ChunkCoord>>,
    /// The position of the chunk to generate (in chunk coordinates)
    coord: ChunkCoord,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    pub fn new(
        classifier: Arc<BiomeClassifier>,
        generator: Arc<TerrainGenerator>,
        in_flight: MtResource<HashSet<ChunkCoord>>,
        coord: ChunkCoord,
    ) -> Self {
        ChunkGenerationTask {
            classifier,
            generator,
            in_flight,
            coord,
        }
    }
}

impl Task for ChunkGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        Box::new(ChunkGenerationTaskResult {
            coord: self.coord,
            chunk: build_chunk(self.coord, &self.classifier, &self.generator),
            in_flight: self.in_flight.clone(),
        })
    }
}

/// The result of a chunk generation task.
pub struct ChunkGenerationTaskResult {
    coord: ChunkCoord,
    chunk: Result<Chunk, WorldError>,
    in_flight: MtResource<HashSet<ChunkCoord>>,
}

impl TaskResult for ChunkGenerationTaskResult {
    fn handle_result(
        self: Box<Self>,
        world: &MtResource<WorldStore>,
    ) -> Result<Vec<Box<dyn Task + Send>>, WorldError> {
        let ChunkGenerationTaskResult {
            coord,
            chunk,
            in_flight,
        } = *self;
        in_flight.get_mut().remove(&coord);

        if world.get_mut().publish(chunk?)? {
            trace!("Published chunk {coord}");
        } else {
            trace!("Chunk {coord} was already resident");
        }
        Ok(Vec::new())
    }
}
