/*
 * Debug Information Module
 *
 * This module defines the DebugConfig toggles for the debug lines drawn by the
 * viewer, and the DebugInfo struct with per-frame statistics displayed in the UI.
 *
 * The simulation never reads DebugConfig; only the view layer does.
 */

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::boid::BoidState;
use crate::world::World;

// Which debug lines the viewer draws; persisted between runs
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub show_force_line: bool,
    pub show_repel_line: bool,
    pub show_attract_line: bool,
    pub show_follow_line: bool,
    pub show_friend_lines: bool,
    pub show_axis: bool,
}

impl DebugConfig {
    pub fn toggle_force_line(&mut self) {
        self.show_force_line = !self.show_force_line;
    }

    pub fn toggle_repel_line(&mut self) {
        self.show_repel_line = !self.show_repel_line;
    }

    pub fn toggle_attract_line(&mut self) {
        self.show_attract_line = !self.show_attract_line;
    }

    pub fn toggle_follow_line(&mut self) {
        self.show_follow_line = !self.show_follow_line;
    }

    pub fn toggle_friend_lines(&mut self) {
        self.show_friend_lines = !self.show_friend_lines;
    }

    pub fn toggle_axis(&mut self) {
        self.show_axis = !self.show_axis;
    }
}

// Debug information to display
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DebugInfo {
    pub fps: f32,
    pub frame_time: Duration,
    pub boid_count: usize,
    pub returning_count: usize,
    pub mean_friends: f32,
    pub tick: u64,
}

impl DebugInfo {
    // Refresh the flock statistics from the world's last tick
    pub fn sample(&mut self, world: &World) {
        let boids = world.boids();

        self.boid_count = boids.len();
        self.returning_count = boids
            .iter()
            .filter(|boid| boid.state() == BoidState::Returning)
            .count();
        self.mean_friends = if boids.is_empty() {
            0.0
        } else {
            let total: usize = boids.iter().map(|boid| boid.friends().len()).sum();
            total as f32 / boids.len() as f32
        };
        self.tick = world.tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boid::{Boid, BoidTag};
    use crate::params::{BoidParams, FLOCKING_CENTER};
    use glam::Vec3;

    #[test]
    fn toggles_flip_only_their_own_flag() {
        let mut config = DebugConfig::default();
        config.toggle_friend_lines();
        assert!(config.show_friend_lines);
        assert!(!config.show_force_line && !config.show_axis);

        config.toggle_friend_lines();
        assert_eq!(config, DebugConfig::default());
    }

    #[test]
    fn sample_counts_friends_and_stragglers() {
        let mut world = World::new();
        let params = BoidParams::default();
        world
            .add_boid(Boid::new(FLOCKING_CENTER, Vec3::X, 1.0, BoidTag(0), params))
            .unwrap();
        world
            .add_boid(Boid::new(FLOCKING_CENTER + Vec3::new(0.5, 0.0, 0.0), Vec3::X, 1.0, BoidTag(1), params))
            .unwrap();
        world
            .add_boid(Boid::new(FLOCKING_CENTER + Vec3::new(80.0, 0.0, 0.0), Vec3::X, 1.0, BoidTag(2), params))
            .unwrap();

        world.update(1.0 / 60.0);

        let mut info = DebugInfo::default();
        info.sample(&world);

        assert_eq!(info.boid_count, 3);
        assert_eq!(info.returning_count, 1);
        assert!((info.mean_friends - 2.0 / 3.0).abs() < 1.0e-6);
        assert_eq!(info.tick, 1);
    }
}
