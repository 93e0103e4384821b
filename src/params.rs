/*
 * Simulation Parameters Module
 *
 * This module defines the parameter structs for the flock. BoidParams holds the
 * per-boid tunables that are fixed when a boid is created, FlockParams holds
 * the population and performance settings used when seeding a World.
 */

use glam::Vec3;

// Default point the flock is kept around
pub const FLOCKING_CENTER: Vec3 = Vec3::new(0.0, 10.0, 0.0);

// Per-boid tunables, fixed at construction
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoidParams {
    pub max_speed: f32,
    pub min_speed: f32,
    pub max_force: f32,
    pub mass: f32,
    // Radius of the neighbour query
    pub friend_distance: f32,
    // Leave the flock once further than this from the flocking center
    pub max_distance: f32,
    // Rejoin the flock once closer than this; must stay below max_distance
    pub start_flocking_again_distance: f32,
    pub cohesion_divisor: f32,
    pub separation_strength: f32,
    pub separation_divisor: f32,
    pub velocity_matching_divisor: f32,
}

impl Default for BoidParams {
    fn default() -> Self {
        Self {
            max_speed: 1.5,
            min_speed: 0.7,
            max_force: 0.1,
            mass: 1.0,
            friend_distance: 1.0,
            max_distance: 50.0,
            start_flocking_again_distance: 45.0,
            cohesion_divisor: 100.0,
            separation_strength: 0.7,
            separation_divisor: 150.0,
            velocity_matching_divisor: 320.0,
        }
    }
}

impl BoidParams {
    // Pull every value back into a range the integrator can cope with
    pub fn sanitize(&mut self) {
        let defaults = Self::default();

        self.max_speed = clamp_finite(self.max_speed, 0.0, 1_000.0, defaults.max_speed);
        self.min_speed = clamp_finite(self.min_speed, 0.0, self.max_speed, defaults.min_speed.min(self.max_speed));
        self.max_force = clamp_finite(self.max_force, 0.0, 1_000.0, defaults.max_force);
        self.mass = clamp_finite(self.mass, 1.0e-3, 1_000.0, defaults.mass);
        self.friend_distance = clamp_finite(self.friend_distance, 0.0, 1_000.0, defaults.friend_distance);
        self.max_distance = clamp_finite(self.max_distance, 0.0, 1.0e6, defaults.max_distance);
        self.start_flocking_again_distance = clamp_finite(
            self.start_flocking_again_distance,
            0.0,
            self.max_distance,
            defaults.start_flocking_again_distance.min(self.max_distance),
        );
        self.cohesion_divisor = clamp_finite(self.cohesion_divisor, 1.0e-3, 1.0e6, defaults.cohesion_divisor);
        self.separation_strength = clamp_finite(self.separation_strength, 0.0, 100.0, defaults.separation_strength);
        self.separation_divisor = clamp_finite(self.separation_divisor, 1.0e-3, 1.0e6, defaults.separation_divisor);
        self.velocity_matching_divisor = clamp_finite(
            self.velocity_matching_divisor,
            1.0e-3,
            1.0e6,
            defaults.velocity_matching_divisor,
        );
    }
}

// How World answers neighbour queries
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum NeighborSearch {
    // Linear scan over every boid, O(n^2) per tick
    #[default]
    BruteForce,
    // Hashed uniform grid; queries visit every cell the radius can reach
    Grid { cell_size: f32 },
}

// Parameters for seeding and stepping a world
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlockParams {
    pub num_boids: usize,
    pub spawn_min: f32,
    pub spawn_max: f32,
    pub spawn_height: f32,
    pub initial_speed: f32,
    // Performance settings
    pub neighbor_search: NeighborSearch,
    pub enable_parallel: bool,
}

impl Default for FlockParams {
    fn default() -> Self {
        Self {
            num_boids: 200,
            spawn_min: -20.0,
            spawn_max: 20.0,
            spawn_height: FLOCKING_CENTER.y,
            initial_speed: 1.0,
            neighbor_search: NeighborSearch::default(),
            enable_parallel: false,
        }
    }
}

impl FlockParams {
    pub fn sanitize(&mut self) {
        let defaults = Self::default();

        self.num_boids = self.num_boids.min(*Self::get_num_boids_range().end());
        self.spawn_min = clamp_finite(self.spawn_min, -1.0e4, 1.0e4, defaults.spawn_min);
        self.spawn_max = clamp_finite(self.spawn_max, -1.0e4, 1.0e4, defaults.spawn_max);
        if self.spawn_max <= self.spawn_min {
            self.spawn_max = self.spawn_min + 1.0;
        }
        self.spawn_height = clamp_finite(self.spawn_height, -1.0e4, 1.0e4, defaults.spawn_height);
        self.initial_speed = clamp_finite(self.initial_speed, 0.0, 1_000.0, defaults.initial_speed);
        if let NeighborSearch::Grid { cell_size } = self.neighbor_search {
            self.neighbor_search = NeighborSearch::Grid {
                cell_size: clamp_finite(cell_size, 1.0e-3, 1.0e4, 1.0),
            };
        }
    }

    // Get parameter ranges for UI sliders
    pub fn get_num_boids_range() -> std::ops::RangeInclusive<usize> {
        0..=5_000
    }

    pub fn get_spawn_range() -> std::ops::RangeInclusive<f32> {
        -100.0..=100.0
    }
}

fn clamp_finite(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if !value.is_finite() {
        return fallback;
    }
    value.clamp(min, max)
}
