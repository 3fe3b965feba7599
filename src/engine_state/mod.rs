//! # Engine State Module
//!
//! The top-level state of the voxel world core and the modules it is built from.
//!
//! ## Key Components
//!
//! * `EngineState` - Owns the world, the streaming manager and the generation workers
//! * `config` - Tunable world parameters
//! * `error` - The crate's error type
//! * `task_management` - Worker threads for chunk generation
//! * `voxels` - Chunk storage, terrain generation and streaming
//!
//! ## Tick Model
//!
//! The embedding application calls `EngineState::tick` once per simulation step with
//! the observer's position. Without workers a tick generates every missing chunk
//! before it returns. With workers a tick publishes whatever generation finished since
//! the previous tick and schedules what is still missing.

use log::info;

use crate::core::MtResource;

use config::WorldConfig;
use error::WorldError;
use task_management::TaskManager;
use voxels::{
    streaming::{ReconcileReport, StreamingManager},
    world::WorldStore,
};

pub mod config;
pub mod error;
pub mod task_management;
pub mod voxels;

/// The main state container for the voxel world.
///
/// # Examples
///
/// ```
/// use voxel_world::engine_state::{config::WorldConfig, EngineState};
///
/// let mut engine = EngineState::new(WorldConfig {
///     render_distance: 1,
///     ..WorldConfig::default()
/// })
/// .unwrap();
///
/// let report = engine.tick(0, 0).unwrap();
/// assert_eq!(report.resident, 9);
/// ```
pub struct EngineState {
    /// The voxel world containing all resident chunks
    pub world: MtResource<WorldStore>,
    /// Keeps the resident set matched to the observer
    pub streaming: StreamingManager,
    /// Generation workers, if the configuration asks for any
    pub task_manager: Option<TaskManager>,
    config: WorldConfig,
}

impl EngineState {
    /// Validates `config` and builds the world, streaming manager and workers.
    pub fn new(config: WorldConfig) -> Result<Self, WorldError> {
        config.validate()?;

        let world = MtResource::new(WorldStore::new(&config));
        let task_manager = match config.generation_workers {
            0 => None,
            workers => Some(TaskManager::new(workers, world.clone())?),
        };

        info!(
            "World ready: seed {}, render distance {}, {} generation workers",
            config.seed, config.render_distance, config.generation_workers
        );

        Ok(Self {
            world,
            streaming: StreamingManager::new(config.render_distance),
            task_manager,
            config,
        })
    }

    /// The configuration the world was built with.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Advances streaming by one step for an observer at world column
    /// `(observer_x, observer_z)`.
    ///
    /// # Errors
    /// Returns the first chunk generation failure, inline or from a worker. With
    /// workers the failed chunk is scheduled again by a later tick.
    pub fn tick(
        &mut self,
        observer_x: i32,
        observer_z: i32,
    ) -> Result<ReconcileReport, WorldError> {
        match &mut self.task_manager {
            Some(task_manager) => {
                task_manager.process_completed_tasks()?;
                let report = self.streaming.reconcile_parallel(
                    &self.world,
                    task_manager,
                    observer_x,
                    observer_z,
                );
                task_manager.process_queued_tasks();
                Ok(report)
            }
            None => self
                .streaming
                .reconcile(&mut self.world.get_mut(), observer_x, observer_z),
        }
    }

    /// `true` once no generation work is queued or running.
    pub fn is_settled(&self) -> bool {
        self.task_manager
            .as_ref()
            .map_or(true, TaskManager::is_idle)
    }
}
