/*
 * World Module
 *
 * The World owns every boid and a set of named controllers, answers
 * neighbour queries and drives one simulation tick at a time.
 *
 * A tick runs in two passes:
 * 1. Every controller, in registration order. Controllers may move shared
 *    world state such as the flocking center.
 * 2. Every boid, against a snapshot of all boids taken after the controllers
 *    ran. Neighbour queries therefore see the positions from the end of the
 *    previous tick no matter which boid is updated first, which also makes
 *    the boid pass safe to run in parallel.
 *
 * The default neighbour search is a linear scan (O(n^2) per tick). That is the
 * scaling bottleneck; NeighborSearch::Grid swaps in a hashed grid.
 */

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use glam::Vec3;
use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, info, trace};

use crate::boid::{Boid, BoidState, BoidTag, Neighbor, Neighborhood};
use crate::error::WorldError;
use crate::params::{BoidParams, FlockParams, NeighborSearch, FLOCKING_CENTER};
use crate::spatial_grid::SpatialGrid;

// World-level state controllers may change before the boids move
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Environment {
    pub flocking_center: Vec3,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            flocking_center: FLOCKING_CENTER,
        }
    }
}

// Anything ticked once per world update, before the boids
pub trait Controller {
    fn update(&mut self, delta: f32, environment: &mut Environment);
}

// Lets a caller keep a handle on a controller the world ticks
impl<C: Controller + ?Sized> Controller for Rc<RefCell<C>> {
    fn update(&mut self, delta: f32, environment: &mut Environment) {
        self.borrow_mut().update(delta, environment);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControllerName {
    Camera,
    // Assigned by the world when no name is given
    Auto(u32),
}

impl fmt::Display for ControllerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Camera => write!(f, "camera"),
            Self::Auto(n) => write!(f, "{n}"),
        }
    }
}

// Frozen copy of every boid, taken once per tick
pub struct FlockSnapshot {
    neighbors: Vec<Neighbor>,
    grid: Option<SpatialGrid>,
    environment: Environment,
}

impl FlockSnapshot {
    pub fn capture(boids: &[Boid], environment: Environment, search: NeighborSearch) -> Self {
        let neighbors: Vec<Neighbor> = boids.iter().map(Boid::as_neighbor).collect();

        let grid = match search {
            NeighborSearch::BruteForce => None,
            NeighborSearch::Grid { cell_size } => {
                let mut grid = SpatialGrid::new(cell_size);
                grid.rebuild(neighbors.iter().map(|neighbor| neighbor.position));
                Some(grid)
            }
        };

        Self {
            neighbors,
            grid,
            environment,
        }
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }
}

impl Neighborhood for FlockSnapshot {
    fn find_nearby(&self, from: BoidTag, position: Vec3, cutoff_distance: f32) -> Vec<Neighbor> {
        let within = |neighbor: &&Neighbor| {
            neighbor.tag != from && neighbor.position.distance(position) < cutoff_distance
        };

        match &self.grid {
            Some(grid) => grid
                .get_nearby_indices(position, cutoff_distance)
                .into_iter()
                .map(|index| &self.neighbors[index])
                .filter(within)
                .copied()
                .collect(),
            None => self.neighbors.iter().filter(within).copied().collect(),
        }
    }

    fn flocking_center(&self) -> Vec3 {
        self.environment.flocking_center
    }
}

pub struct World {
    boids: Vec<Boid>,
    index: HashMap<BoidTag, usize>,
    controllers: Vec<(ControllerName, Box<dyn Controller>)>,
    next_controller_name: u32,
    environment: Environment,
    neighbor_search: NeighborSearch,
    enable_parallel: bool,
    tick: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            boids: Vec::new(),
            index: HashMap::new(),
            controllers: Vec::new(),
            next_controller_name: 0,
            environment: Environment::default(),
            neighbor_search: NeighborSearch::BruteForce,
            enable_parallel: false,
            tick: 0,
        }
    }

    pub fn with_params(params: &FlockParams) -> Self {
        let mut world = Self::new();
        world.neighbor_search = params.neighbor_search;
        world.enable_parallel = params.enable_parallel;
        world
    }

    pub fn add_boid(&mut self, boid: Boid) -> Result<(), WorldError> {
        let tag = boid.tag();
        if self.index.contains_key(&tag) {
            return Err(WorldError::DuplicateTag(tag));
        }

        self.index.insert(tag, self.boids.len());
        self.boids.push(boid);
        Ok(())
    }

    // Add `flock.num_boids` randomly placed boids with fresh tags
    pub fn spawn_flock<R: Rng + ?Sized>(
        &mut self,
        flock: &FlockParams,
        params: BoidParams,
        rng: &mut R,
    ) -> Result<(), WorldError> {
        let mut flock = *flock;
        flock.sanitize();
        let mut params = params;
        params.sanitize();

        let first_tag = match self.index.keys().map(|tag| tag.0).max() {
            Some(highest) => highest.checked_add(1).ok_or(WorldError::TagSpaceExhausted)?,
            None => 0,
        };
        // The whole flock has to fit before any boid is added
        if flock.num_boids > 0 {
            let extra = u32::try_from(flock.num_boids - 1).map_err(|_| WorldError::TagSpaceExhausted)?;
            first_tag.checked_add(extra).ok_or(WorldError::TagSpaceExhausted)?;
        }
        self.boids.reserve(flock.num_boids);

        for offset in 0..flock.num_boids as u32 {
            let tag = BoidTag(first_tag + offset);
            self.add_boid(Boid::with_random_position_and_direction(rng, &flock, params, tag))?;
        }

        info!(
            boids = flock.num_boids,
            total = self.boids.len(),
            "spawned flock"
        );
        Ok(())
    }

    // Register a controller; without a name the next Auto number is used.
    // Re-using a name replaces the old controller in place.
    pub fn add_controller<C>(&mut self, controller: C, name: Option<ControllerName>) -> ControllerName
    where
        C: Controller + 'static,
    {
        let name = name.unwrap_or_else(|| {
            self.next_controller_name += 1;
            ControllerName::Auto(self.next_controller_name)
        });

        let controller: Box<dyn Controller> = Box::new(controller);
        match self.controllers.iter().position(|(existing, _)| *existing == name) {
            Some(slot) => self.controllers[slot].1 = controller,
            None => self.controllers.push((name, controller)),
        }

        debug!(%name, "registered controller");
        name
    }

    pub fn controller_names(&self) -> impl Iterator<Item = ControllerName> + '_ {
        self.controllers.iter().map(|(name, _)| *name)
    }

    pub fn update(&mut self, delta: f32) {
        if !(delta > 0.0) || !delta.is_finite() {
            debug!(delta, "skipping world tick with unusable delta");
            return;
        }

        for (_, controller) in &mut self.controllers {
            controller.update(delta, &mut self.environment);
        }

        let snapshot = FlockSnapshot::capture(&self.boids, self.environment, self.neighbor_search);

        if self.enable_parallel {
            self.boids
                .par_iter_mut()
                .for_each(|boid| boid.update(delta, &snapshot));
        } else {
            for boid in &mut self.boids {
                boid.update(delta, &snapshot);
            }
        }

        self.tick += 1;
        trace!(
            tick = self.tick,
            returning = self.returning_count(),
            "world ticked"
        );
    }

    pub fn get_boid(&self, tag: BoidTag) -> Option<&Boid> {
        self.index.get(&tag).map(|&index| &self.boids[index])
    }

    // Boids strictly within `cutoff_distance` of `from`, excluding `from` itself
    pub fn find_nearby_boids(&self, from: BoidTag, cutoff_distance: f32) -> Vec<&Boid> {
        let Some(origin) = self.get_boid(from) else {
            return Vec::new();
        };
        let position = origin.position();

        self.boids
            .iter()
            .filter(|other| other.tag() != from && other.position().distance(position) < cutoff_distance)
            .collect()
    }

    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    pub fn len(&self) -> usize {
        self.boids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.environment
    }

    pub fn neighbor_search(&self) -> NeighborSearch {
        self.neighbor_search
    }

    pub fn set_neighbor_search(&mut self, search: NeighborSearch) {
        self.neighbor_search = search;
    }

    pub fn set_parallel(&mut self, enable_parallel: bool) {
        self.enable_parallel = enable_parallel;
    }

    pub fn returning_count(&self) -> usize {
        self.boids
            .iter()
            .filter(|boid| boid.state() == BoidState::Returning)
            .count()
    }
}

// Live view of the world, for callers outside a tick
impl Neighborhood for World {
    fn find_nearby(&self, from: BoidTag, position: Vec3, cutoff_distance: f32) -> Vec<Neighbor> {
        self.boids
            .iter()
            .filter(|other| other.tag() != from && other.position().distance(position) < cutoff_distance)
            .map(Boid::as_neighbor)
            .collect()
    }

    fn flocking_center(&self) -> Vec3 {
        self.environment.flocking_center
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const DELTA: f32 = 1.0 / 60.0;

    fn boid(tag: u32, position: Vec3, direction: Vec3, speed: f32) -> Boid {
        Boid::new(position, direction, speed, BoidTag(tag), BoidParams::default())
    }

    fn seeded_world(seed: u64, count: usize) -> World {
        let mut world = World::new();
        let flock = FlockParams {
            num_boids: count,
            spawn_min: -3.0,
            spawn_max: 3.0,
            ..FlockParams::default()
        };
        let mut rng = StdRng::seed_from_u64(seed);
        world
            .spawn_flock(&flock, BoidParams::default(), &mut rng)
            .expect("fresh world has no tags yet");
        world
    }

    struct RecordingController {
        name: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Controller for RecordingController {
        fn update(&mut self, _delta: f32, _environment: &mut Environment) {
            self.log.borrow_mut().push(self.name);
        }
    }

    struct MoveCenter(Vec3);

    impl Controller for MoveCenter {
        fn update(&mut self, _delta: f32, environment: &mut Environment) {
            environment.flocking_center = self.0;
        }
    }

    #[test]
    fn duplicate_tags_are_rejected() {
        let mut world = World::new();
        world.add_boid(boid(1, Vec3::ZERO, Vec3::X, 1.0)).unwrap();

        let err = world.add_boid(boid(1, Vec3::ONE, Vec3::X, 1.0)).unwrap_err();
        assert!(matches!(err, WorldError::DuplicateTag(BoidTag(1))));
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn lookup_by_tag() {
        let mut world = World::new();
        world.add_boid(boid(7, Vec3::new(1.0, 2.0, 3.0), Vec3::X, 1.0)).unwrap();

        assert_eq!(world.get_boid(BoidTag(7)).map(Boid::position), Some(Vec3::new(1.0, 2.0, 3.0)));
        assert!(world.get_boid(BoidTag(8)).is_none());
    }

    #[test]
    fn nearby_query_excludes_self_and_respects_radius() {
        let world = seeded_world(11, 120);
        let radius = 1.0;

        for a in world.boids() {
            let found = world.find_nearby_boids(a.tag(), radius);
            assert!(found.iter().all(|b| b.tag() != a.tag()));

            for b in world.boids() {
                if b.tag() == a.tag() {
                    continue;
                }
                let inside = a.position().distance(b.position()) < radius;
                let listed = found.iter().any(|f| f.tag() == b.tag());
                assert_eq!(inside, listed);
            }
        }
    }

    #[test]
    fn unknown_origin_has_no_neighbours() {
        let world = seeded_world(3, 10);
        assert!(world.find_nearby_boids(BoidTag(999), 100.0).is_empty());
    }

    #[test]
    fn grid_search_matches_linear_scan() {
        let world = seeded_world(5, 150);
        let env = *world.environment();
        let linear = FlockSnapshot::capture(world.boids(), env, NeighborSearch::BruteForce);
        let grid = FlockSnapshot::capture(world.boids(), env, NeighborSearch::Grid { cell_size: 1.0 });
        let coarse = FlockSnapshot::capture(world.boids(), env, NeighborSearch::Grid { cell_size: 0.3 });

        for b in world.boids() {
            let expected = linear.find_nearby(b.tag(), b.position(), 1.0);
            assert_eq!(grid.find_nearby(b.tag(), b.position(), 1.0), expected);
            assert_eq!(coarse.find_nearby(b.tag(), b.position(), 1.0), expected);
        }
    }

    #[test]
    fn unnamed_controllers_get_increasing_numbers() {
        let mut world = World::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let first = world.add_controller(RecordingController { name: "a", log: log.clone() }, None);
        let second = world.add_controller(RecordingController { name: "b", log: log.clone() }, None);
        let camera = world.add_controller(
            RecordingController { name: "c", log: log.clone() },
            Some(ControllerName::Camera),
        );

        assert_eq!(first, ControllerName::Auto(1));
        assert_eq!(second, ControllerName::Auto(2));
        assert_eq!(camera, ControllerName::Camera);

        world.update(DELTA);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn reusing_a_name_replaces_the_controller() {
        let mut world = World::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        world.add_controller(RecordingController { name: "old", log: log.clone() }, Some(ControllerName::Camera));
        world.add_controller(RecordingController { name: "new", log: log.clone() }, Some(ControllerName::Camera));

        world.update(DELTA);
        assert_eq!(world.controller_names().count(), 1);
        assert_eq!(*log.borrow(), vec!["new"]);
    }

    #[test]
    fn controllers_run_before_boids_in_the_same_tick() {
        let mut world = World::new();
        world.add_boid(boid(0, FLOCKING_CENTER, Vec3::X, 1.0)).unwrap();
        world.add_controller(MoveCenter(FLOCKING_CENTER + Vec3::new(100.0, 0.0, 0.0)), None);

        world.update(DELTA);

        let boid = world.get_boid(BoidTag(0)).unwrap();
        assert_eq!(boid.state(), BoidState::Returning);
    }

    #[test]
    fn neighbours_are_taken_from_the_previous_tick() {
        let mut world = World::new();
        // The first boid leaves the pair's friend radius during the tick
        world.add_boid(boid(0, FLOCKING_CENTER, -Vec3::X, 1.5)).unwrap();
        world
            .add_boid(boid(1, FLOCKING_CENTER + Vec3::new(0.99, 0.0, 0.0), Vec3::X, 1.5))
            .unwrap();

        world.update(0.1);

        let first = world.get_boid(BoidTag(0)).unwrap();
        let second = world.get_boid(BoidTag(1)).unwrap();
        assert!(first.position().distance(second.position()) > 1.0);
        assert_eq!(first.friends(), &[BoidTag(1)]);
        assert_eq!(second.friends(), &[BoidTag(0)]);
    }

    #[test]
    fn unusable_delta_skips_the_tick() {
        let mut world = seeded_world(2, 5);
        let log = Rc::new(RefCell::new(Vec::new()));
        world.add_controller(RecordingController { name: "x", log: log.clone() }, None);
        let before: Vec<Vec3> = world.boids().iter().map(Boid::position).collect();

        world.update(0.0);
        world.update(-1.0);
        world.update(f32::NAN);

        let after: Vec<Vec3> = world.boids().iter().map(Boid::position).collect();
        assert_eq!(before, after);
        assert_eq!(world.tick(), 0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn parallel_update_matches_sequential() {
        let mut sequential = seeded_world(42, 80);
        let mut parallel = seeded_world(42, 80);
        parallel.set_parallel(true);

        for _ in 0..30 {
            sequential.update(DELTA);
            parallel.update(DELTA);
        }

        for (a, b) in sequential.boids().iter().zip(parallel.boids()) {
            assert_eq!(a.position(), b.position());
            assert_eq!(a.friends(), b.friends());
        }
    }

    #[test]
    fn spawn_continues_after_existing_tags() {
        let mut world = World::new();
        world.add_boid(boid(4, Vec3::ZERO, Vec3::X, 1.0)).unwrap();

        let flock = FlockParams {
            num_boids: 3,
            ..FlockParams::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        world.spawn_flock(&flock, BoidParams::default(), &mut rng).unwrap();

        let tags: Vec<BoidTag> = world.boids().iter().map(Boid::tag).collect();
        assert_eq!(tags, vec![BoidTag(4), BoidTag(5), BoidTag(6), BoidTag(7)]);
    }

    #[test]
    fn spawn_after_the_last_tag_is_rejected() {
        let flock = FlockParams {
            num_boids: 2,
            ..FlockParams::default()
        };
        let mut rng = StdRng::seed_from_u64(1);

        let mut full = World::new();
        full.add_boid(boid(u32::MAX, Vec3::ZERO, Vec3::X, 1.0)).unwrap();
        let err = full.spawn_flock(&flock, BoidParams::default(), &mut rng).unwrap_err();
        assert!(matches!(err, WorldError::TagSpaceExhausted));
        assert_eq!(full.len(), 1);

        // Room for one more tag but not for two leaves the world untouched
        let mut nearly_full = World::new();
        nearly_full.add_boid(boid(u32::MAX - 1, Vec3::ZERO, Vec3::X, 1.0)).unwrap();
        let err = nearly_full.spawn_flock(&flock, BoidParams::default(), &mut rng).unwrap_err();
        assert!(matches!(err, WorldError::TagSpaceExhausted));
        assert_eq!(nearly_full.len(), 1);
    }
}
