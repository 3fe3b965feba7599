#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World
//!
//! The storage and streaming core of a block-based voxel world: chunked block
//! storage, deterministic terrain generation and a streaming manager that keeps a
//! bounded set of chunks resident around a moving observer.
//!
//! Rendering, input and entity behaviour are left to the embedding application;
//! they read and write blocks through `WorldStore` and pick up changed chunks through
//! their dirty flags.
//!
//! ## Key Modules
//!
//! * `core` - The thread-safe resource handle shared across the crate
//! * `engine_state` - The world, its configuration, errors, generation workers and
//!   streaming
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::Point3;
//! use voxel_world::engine_state::{config::WorldConfig, EngineState};
//! use voxel_world::engine_state::voxels::block::block_type::BlockType;
//!
//! let mut engine = EngineState::new(WorldConfig {
//!     render_distance: 1,
//!     ..WorldConfig::default()
//! })
//! .unwrap();
//! engine.tick(0, 0).unwrap();
//!
//! let mut world = engine.world.get_mut();
//! assert_eq!(world.get_block(Point3::new(0, 1, 0)).unwrap(), BlockType::STONE);
//! assert_eq!(world.get_block(Point3::new(0, 0, 0)).unwrap(), BlockType::AIR);
//! ```
//!
//! ## Performance Considerations
//!
//! * Dense per-chunk arrays give constant-time block access
//! * Only chunks inside the streaming window stay in memory
//! * Chunk generation can run on worker threads

use log::{error, info};

use engine_state::{config::WorldConfig, error::WorldError, EngineState};

pub mod core;
pub mod engine_state;

/// Number of ticks the demo observer walks for.
const DEMO_TICKS: i32 = 64;
/// World columns the demo observer moves per tick.
const DEMO_STEP: i32 = 8;

/// Initializes logging and walks an observer across a default world, logging what
/// the streaming manager does along the way.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let workers = std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1).max(1))
        .unwrap_or(1);
    let config = WorldConfig {
        generation_workers: workers,
        ..WorldConfig::default()
    };

    if let Err(err) = walk_observer(config) {
        error!("World demo failed: {err}");
    }
}

fn walk_observer(config: WorldConfig) -> Result<(), WorldError> {
    let mut engine = EngineState::new(config)?;

    let mut observer_x = 0;
    for _ in 0..DEMO_TICKS {
        let report = engine.tick(observer_x, 0)?;
        info!(
            "Observer at x={observer_x}: {} resident, {} scheduled, {} evicted",
            report.resident, report.scheduled, report.evicted
        );
        observer_x += DEMO_STEP;
    }

    while !engine.is_settled() {
        std::thread::sleep(std::time::Duration::from_millis(1));
        engine.tick(observer_x, 0)?;
    }
    let report = engine.tick(observer_x, 0)?;

    let surface = engine.world.get_mut().surface_height(observer_x, 0)?;
    info!(
        "Settled with {} resident chunks around {}; surface under the observer at {:?}",
        report.resident, report.center, surface
    );
    Ok(())
}
