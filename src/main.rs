/*
 * Boid Flocking Simulation
 *
 * A flock of boids in 3D space. Each boid steers by three rules applied to
 * the friends within a short radius:
 * 1. Cohesion: steer towards the friends' center
 * 2. Separation: push away from friends that are too close
 * 3. Velocity matching: adjust towards the friends' mean velocity
 * Boids that stray too far from the flocking center return to it before
 * joining the flock again.
 *
 * Set RUST_LOG (e.g. RUST_LOG=flock=debug) to see the simulation logs.
 */

use flock::app;
use tracing::info;

fn main() {
    app::init_tracing();
    info!("starting flock viewer");

    nannou::app(app::model).update(app::update).run();
}
