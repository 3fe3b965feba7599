//! # Voxel Task System
//!
//! Tasks related to voxel world generation, run on the task manager's workers so
//! generation does not stall the thread driving the world.

pub mod chunk_generation_task;
