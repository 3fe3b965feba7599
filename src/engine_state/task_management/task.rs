//! # Task System Core Traits
//!
//! This module defines the fundamental building blocks of the task system,
//! which executes chunk generation across worker threads.
//!
//! ## Core Components
//! - `Task`: Represents a unit of work that can be executed asynchronously
//! - `TaskResult`: Represents the result of a completed task
//!
//! ## Task Lifecycle
//! 1. A `Task` is created and scheduled via `TaskManager::publish_task()`
//! 2. The task's `process()` method is called on a worker thread
//! 3. The task returns a boxed `TaskResult`
//! 4. The result's `handle_result()` is called on the thread that owns the manager
//! 5. The result can apply itself to the world, spawn new tasks or report a failure

use crate::{
    core::MtResource,
    engine_state::{error::WorldError, voxels::world::WorldStore},
};

/// A unit of work that can be executed on a worker thread.
///
/// Tasks own everything they need. They must not touch the world store directly;
/// anything that changes the world happens in the result's `handle_result`.
pub trait Task: Send {
    /// Performs the work and returns a result to be handled by the manager's owner.
    fn process(&self) -> Box<dyn TaskResult + Send>;
}

/// The result of processing a `Task`.
pub trait TaskResult: Send {
    /// Applies the result on the thread that owns the `TaskManager`.
    ///
    /// Returns follow-up tasks to schedule, which may be empty.
    ///
    /// # Errors
    /// Returns the error the work failed with; the manager passes it on to its caller.
    fn handle_result(
        self: Box<Self>,
        world: &MtResource<WorldStore>,
    ) -> Result<Vec<Box<dyn Task + Send>>, WorldError>;
}
