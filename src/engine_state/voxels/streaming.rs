//! # Streaming Manager
//!
//! Keeps the set of resident chunks matched to a square window around a moving
//! observer.
//!
//! Each reconciliation computes the required window once, loads whatever in it is
//! missing and evicts whatever resident chunk lies outside it. Because both steps
//! work from the same window, a coordinate is never loaded and evicted in the same
//! pass. This is the only component that evicts chunks.
//!
//! Two flavours are provided:
//! - `reconcile` generates missing chunks inline, so the window is complete when it
//!   returns.
//! - `reconcile_parallel` schedules missing chunks on a `TaskManager` and lets them
//!   arrive over the following ticks.

use std::collections::HashSet;

use log::{debug, info};
use web_time::Instant;

use crate::core::MtResource;
use crate::engine_state::{
    error::WorldError,
    task_management::TaskManager,
    voxels::tasks::chunk_generation_task::ChunkGenerationTask,
};

use super::coords::{world_to_chunk, ChunkCoord, MAX_CHUNK, MIN_CHUNK};
use super::world::WorldStore;

/// Outcome of one reconciliation pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// The chunk containing the observer.
    pub center: ChunkCoord,
    /// Chunks generated inline during this pass.
    pub loaded: usize,
    /// Chunks handed to generation workers during this pass.
    pub scheduled: usize,
    /// Chunks evicted during this pass.
    pub evicted: usize,
    /// Chunks resident once the pass finished.
    pub resident: usize,
}

/// Reconciles the resident chunk set against the observer's window.
pub struct StreamingManager {
    render_distance: i32,
    center: Option<ChunkCoord>,
    /// Coordinates with a generation task outstanding
    in_flight: MtResource<HashSet<ChunkCoord>>,
}

impl StreamingManager {
    /// Creates a manager keeping `render_distance` chunks loaded on each side of the
    /// observer's chunk. Negative distances are treated as zero.
    pub fn new(render_distance: i32) -> Self {
        StreamingManager {
            render_distance: render_distance.max(0),
            center: None,
            in_flight: MtResource::new(HashSet::new()),
        }
    }

    /// Half-width of the window, in chunks.
    pub fn render_distance(&self) -> i32 {
        self.render_distance
    }

    /// The observer's chunk as of the last reconciliation.
    pub fn center(&self) -> Option<ChunkCoord> {
        self.center
    }

    /// Number of chunks scheduled on workers that have not been published yet.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.get().len()
    }

    /// Every coordinate within `render_distance` of `center` on both axes, nearest
    /// rings first.
    ///
    /// The window is cut off at the edge of the world, so near `MIN_CHUNK` or
    /// `MAX_CHUNK` it holds fewer than `(2 * render_distance + 1)²` chunks.
    pub fn required_window(&self, center: ChunkCoord) -> Vec<ChunkCoord> {
        let r = self.render_distance;
        let span = |c: i32| {
            c.saturating_sub(r).max(MIN_CHUNK)..=c.saturating_add(r).min(MAX_CHUNK)
        };
        let (xs, zs) = (span(center.x), span(center.z));

        let width = xs.clone().count();
        let mut window = Vec::with_capacity(width * zs.clone().count());
        for z in zs {
            for x in xs.clone() {
                window.push(ChunkCoord::new(x, z));
            }
        }
        window.sort_by_key(|coord| (coord.chebyshev_distance(center), coord.z, coord.x));
        window
    }

    /// Loads every missing chunk in the window around the observer, generating
    /// inline, then evicts every resident chunk outside it.
    ///
    /// # Errors
    /// Returns `WorldError::ResourceExhausted` if a chunk cannot be allocated. Chunks
    /// loaded before the failure stay resident and no eviction happens in that pass.
    pub fn reconcile(
        &mut self,
        world: &mut WorldStore,
        observer_x: i32,
        observer_z: i32,
    ) -> Result<ReconcileReport, WorldError> {
        let started = Instant::now();
        let center = self.enter(observer_x, observer_z);
        let window = self.required_window(center);

        let mut loaded = 0;
        for &coord in &window {
            if !world.is_resident(coord) {
                world.get_chunk(coord)?;
                loaded += 1;
            }
        }

        let required: HashSet<ChunkCoord> = window.into_iter().collect();
        let evicted = evict_outside(world, &required);

        let report = ReconcileReport {
            center,
            loaded,
            scheduled: 0,
            evicted,
            resident: world.resident_count(),
        };
        debug!("Reconciled {report:?} in {:?}", started.elapsed());
        Ok(report)
    }

    /// Schedules every missing chunk in the window on `task_manager`, then evicts every
    /// resident chunk outside the window.
    ///
    /// A coordinate is scheduled at most once while its task is outstanding. Chunks
    /// become resident as `TaskManager::process_completed_tasks` publishes them; one
    /// that arrives after the observer has moved on is evicted by the next pass.
    pub fn reconcile_parallel(
        &mut self,
        world: &MtResource<WorldStore>,
        task_manager: &mut TaskManager,
        observer_x: i32,
        observer_z: i32,
    ) -> ReconcileReport {
        let started = Instant::now();
        let center = self.enter(observer_x, observer_z);
        let window = self.required_window(center);

        let (classifier, generator) = {
            let world = world.get();
            (world.classifier(), world.generator())
        };

        let mut scheduled = 0;
        for &coord in &window {
            let resident = world.get().is_resident(coord);
            if resident || !self.in_flight.get_mut().insert(coord) {
                continue;
            }
            task_manager.publish_task(Box::new(ChunkGenerationTask::new(
                classifier.clone(),
                generator.clone(),
                self.in_flight.clone(),
                coord,
            )));
            scheduled += 1;
        }

        let required: HashSet<ChunkCoord> = window.into_iter().collect();
        let mut world = world.get_mut();
        let evicted = evict_outside(&mut world, &required);

        let report = ReconcileReport {
            center,
            loaded: 0,
            scheduled,
            evicted,
            resident: world.resident_count(),
        };
        debug!("Reconciled {report:?} in {:?}", started.elapsed());
        report
    }

    /// Records the observer's chunk, logging when it changes.
    fn enter(&mut self, observer_x: i32, observer_z: i32) -> ChunkCoord {
        let center = world_to_chunk(observer_x, observer_z);
        if self.center != Some(center) {
            info!("Observer entered chunk {center}");
            self.center = Some(center);
        }
        center
    }
}

fn evict_outside(world: &mut WorldStore, required: &HashSet<ChunkCoord>) -> usize {
    let stale: Vec<ChunkCoord> = world
        .resident_coords()
        .filter(|coord| !required.contains(coord))
        .collect();

    stale.into_iter().filter(|&coord| world.evict(coord)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::config::WorldConfig;
    use crate::engine_state::voxels::block::block_type::BlockType;
    use std::time::Duration;

    fn world() -> WorldStore {
        WorldStore::new(&WorldConfig {
            seed: 99,
            ..WorldConfig::default()
        })
    }

    #[test]
    fn window_is_square_and_nearest_first() {
        let manager = StreamingManager::new(2);
        let window = manager.required_window(ChunkCoord::new(10, -10));

        assert_eq!(window.len(), 25);
        assert_eq!(window[0], ChunkCoord::new(10, -10));
        assert!(window[1..9]
            .iter()
            .all(|coord| coord.chebyshev_distance(ChunkCoord::new(10, -10)) == 1));
        assert!(window.contains(&ChunkCoord::new(12, -8)));
        assert!(!window.contains(&ChunkCoord::new(13, -10)));

        let unique: HashSet<_> = window.iter().collect();
        assert_eq!(unique.len(), 25);
    }

    #[test]
    fn zero_distance_keeps_only_the_observer_chunk() {
        let mut world = world();
        let mut manager = StreamingManager::new(0);
        let report = manager.reconcile(&mut world, -1, 40).unwrap();

        assert_eq!(report.center, ChunkCoord::new(-1, 2));
        assert_eq!(report.loaded, 1);
        assert_eq!(world.resident_count(), 1);
        assert!(world.is_resident(ChunkCoord::new(-1, 2)));
    }

    #[test]
    fn moving_one_chunk_loads_and_evicts_a_strip() {
        let mut world = world();
        let mut manager = StreamingManager::new(1);
        manager.reconcile(&mut world, 0, 0).unwrap();

        let report = manager.reconcile(&mut world, 16, 0).unwrap();
        assert_eq!(report.loaded, 3);
        assert_eq!(report.evicted, 3);
        assert_eq!(report.resident, 9);
        for z in -1..=1 {
            assert!(world.is_resident(ChunkCoord::new(2, z)));
            assert!(!world.is_resident(ChunkCoord::new(-1, z)));
        }
    }

    #[test]
    fn staying_put_is_a_no_op() {
        let mut world = world();
        let mut manager = StreamingManager::new(1);
        manager.reconcile(&mut world, 5, 5).unwrap();

        let report = manager.reconcile(&mut world, 6, 7).unwrap();
        assert_eq!(report.loaded, 0);
        assert_eq!(report.evicted, 0);
        assert_eq!(report.resident, 9);
    }

    #[test]
    fn window_is_cut_off_at_the_world_edges() {
        let mut world = world();
        let mut manager = StreamingManager::new(4);

        let report = manager.reconcile(&mut world, i32::MAX, 0).unwrap();
        assert_eq!(report.center, ChunkCoord::new(MAX_CHUNK, 0));
        assert_eq!(report.resident, 5 * 9);
        assert!(world.resident_coords().all(|coord| coord.in_world()));
        assert!(world.is_resident(ChunkCoord::new(MAX_CHUNK - 4, 4)));

        let report = manager.reconcile(&mut world, i32::MIN, i32::MIN).unwrap();
        assert_eq!(report.center, ChunkCoord::new(MIN_CHUNK, MIN_CHUNK));
        assert_eq!(report.evicted, 45);
        assert_eq!(report.resident, 5 * 5);
        assert!(world.is_resident(ChunkCoord::new(MIN_CHUNK + 4, MIN_CHUNK + 4)));

        let corner = world
            .get_block(cgmath::Point3::new(i32::MIN, 1, i32::MIN))
            .unwrap();
        assert_eq!(corner, BlockType::STONE);
    }

    #[test]
    fn directly_accessed_chunks_outside_the_window_are_evicted() {
        let mut world = world();
        let mut manager = StreamingManager::new(1);
        world.get_chunk(ChunkCoord::new(50, 50)).unwrap();

        let report = manager.reconcile(&mut world, 0, 0).unwrap();
        assert_eq!(report.evicted, 1);
        assert!(!world.is_resident(ChunkCoord::new(50, 50)));
    }

    #[test]
    fn parallel_reconcile_converges_on_the_window() {
        let world = MtResource::new(world());
        let mut task_manager = TaskManager::new(2, world.clone()).unwrap();
        let mut manager = StreamingManager::new(1);

        let first = manager.reconcile_parallel(&world, &mut task_manager, 0, 0);
        assert_eq!(first.scheduled, 9);
        assert_eq!(manager.in_flight_count(), 9);

        let again = manager.reconcile_parallel(&world, &mut task_manager, 0, 0);
        assert_eq!(again.scheduled, 0, "in-flight chunks were scheduled twice");

        let deadline = std::time::Instant::now() + Duration::from_secs(10);
        while !task_manager.is_idle() {
            assert!(std::time::Instant::now() < deadline, "generation never finished");
            task_manager.process_completed_tasks().unwrap();
            task_manager.process_queued_tasks();
            std::thread::sleep(Duration::from_millis(1));
        }

        assert_eq!(manager.in_flight_count(), 0);
        let mut resident: Vec<_> = world.get().resident_coords().collect();
        resident.sort();
        let mut expected = manager.required_window(ChunkCoord::new(0, 0));
        expected.sort();
        assert_eq!(resident, expected);

        let mut inline_world = self::world();
        for coord in &expected {
            let inline = inline_world.get_chunk(*coord).unwrap();
            let parallel = world.get().get_loaded_chunk(*coord).unwrap();
            assert_eq!(inline.get().as_bytes(), parallel.get().as_bytes());
        }
    }
}
