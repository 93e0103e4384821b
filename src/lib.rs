/*
 * Boid Flocking Simulation - Module Definitions
 *
 * This file defines the module structure for the flocking simulation.
 * The simulation core (boid, world, steering) has no rendering dependency;
 * the nannou viewer lives behind the `viewer` feature.
 */

// Re-export key components for easier access
pub use boid::{Boid, BoidState, BoidTag, Neighbor, Neighborhood};
pub use camera::{Camera, CameraController, ZoomState};
pub use debug::{DebugConfig, DebugInfo};
pub use error::{PersistenceError, WorldError};
pub use params::{BoidParams, FlockParams, NeighborSearch, FLOCKING_CENTER};
pub use persistence::ConfigStore;
pub use spatial_grid::SpatialGrid;
pub use steering::{flee, seek, SteeringStrategy, Vehicle};
pub use world::{Controller, ControllerName, Environment, FlockSnapshot, World};

// Define modules
pub mod boid;
pub mod camera;
pub mod debug;
pub mod error;
pub mod input;
pub mod math;
pub mod params;
pub mod persistence;
pub mod spatial_grid;
pub mod steering;
pub mod world;

#[cfg(feature = "viewer")]
pub mod app;
#[cfg(feature = "viewer")]
pub mod renderer;
#[cfg(feature = "viewer")]
pub mod ui;

// Constants
pub const BOID_SIZE: f32 = 0.3;
pub const FLOOR_SIZE: f32 = 100.0;
