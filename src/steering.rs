/*
 * Steering Module
 *
 * Pure seek/flee steering functions plus a stand-alone Vehicle that
 * pursues or flees a fixed target using one of them.
 *
 * Both functions return the desired displacement for one tick, i.e. a
 * direction scaled by speed * delta.
 */

use glam::Vec3;

use crate::math::{clamp_length, normalize_or_zero};
use crate::world::{Controller, Environment};

// Displacement towards the target; zero when already on it
pub fn seek(current_position: Vec3, target_position: Vec3, speed: f32, delta: f32) -> Vec3 {
    normalize_or_zero(target_position - current_position) * (speed * delta)
}

// Displacement away from the target; zero when on it
pub fn flee(current_position: Vec3, target_position: Vec3, speed: f32, delta: f32) -> Vec3 {
    normalize_or_zero(current_position - target_position) * (speed * delta)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SteeringStrategy {
    #[default]
    Seek,
    Flee,
}

impl SteeringStrategy {
    pub fn desired_velocity(self, current: Vec3, target: Vec3, speed: f32, delta: f32) -> Vec3 {
        match self {
            Self::Seek => seek(current, target, speed, delta),
            Self::Flee => flee(current, target, speed, delta),
        }
    }
}

// An agent steering towards (or away from) a single target point
#[derive(Clone, Debug)]
pub struct Vehicle {
    pub position: Vec3,
    pub direction: Vec3,
    pub speed: f32,
    pub target: Vec3,
    pub strategy: SteeringStrategy,
    pub max_speed: f32,
    pub max_force: f32,
    pub mass: f32,
}

impl Vehicle {
    pub fn new(position: Vec3, direction: Vec3, speed: f32, target: Vec3) -> Self {
        Self {
            position,
            direction: normalize_or_zero(direction),
            speed,
            target,
            strategy: SteeringStrategy::Seek,
            max_speed: 5.0,
            max_force: 0.2,
            mass: 1.0,
        }
    }

    pub fn with_strategy(mut self, strategy: SteeringStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn velocity(&self) -> Vec3 {
        self.direction * self.speed
    }

    pub fn update(&mut self, delta: f32) {
        if !(delta > 0.0) || !delta.is_finite() {
            return;
        }

        let desired = self
            .strategy
            .desired_velocity(self.position, self.target, self.max_speed, delta);
        let steering = desired - self.direction * (self.speed * delta);

        self.integrate(steering, delta);
    }

    fn integrate(&mut self, steering_direction: Vec3, delta: f32) {
        let steering_force = clamp_length(steering_direction, 0.0, self.max_force * delta);
        let acceleration = steering_force / self.mass;

        let velocity = clamp_length(
            self.direction * (self.speed * delta) + acceleration,
            0.0,
            self.max_speed * delta,
        );

        self.position += velocity;
        self.speed = velocity.length() / delta;

        // A vehicle that came to rest keeps facing the same way
        let heading = normalize_or_zero(velocity);
        if heading != Vec3::ZERO {
            self.direction = heading;
        }
    }
}

impl Controller for Vehicle {
    fn update(&mut self, delta: f32, _environment: &mut Environment) {
        Vehicle::update(self, delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seek_points_at_target_with_scaled_length() {
        let step = seek(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), 2.0, 0.5);
        assert!((step - Vec3::new(1.0, 0.0, 0.0)).length() < 1.0e-6);
    }

    #[test]
    fn flee_mirrors_seek() {
        let from = Vec3::new(1.0, 2.0, 3.0);
        let target = Vec3::new(-4.0, 0.5, 9.0);
        let towards = seek(from, target, 1.5, 0.1);
        let away = flee(from, target, 1.5, 0.1);
        assert!((towards + away).length() < 1.0e-6);
    }

    #[test]
    fn coincident_positions_steer_nowhere() {
        let p = Vec3::new(3.0, 3.0, 3.0);
        assert_eq!(seek(p, p, 4.0, 1.0), Vec3::ZERO);
        assert_eq!(flee(p, p, 4.0, 1.0), Vec3::ZERO);
    }

    #[test]
    fn naive_seek_integration_closes_in_on_target() {
        let target = Vec3::new(5.0, -2.0, 7.0);
        let speed = 1.0;
        let delta = 0.1;
        let step_length = speed * delta;
        let mut position = Vec3::ZERO;
        let mut previous_distance = position.distance(target);

        for _ in 0..1_000 {
            if previous_distance <= step_length {
                break;
            }
            position += seek(position, target, speed, delta);
            let distance = position.distance(target);
            assert!(distance < previous_distance);
            previous_distance = distance;
        }

        assert!(previous_distance <= step_length + 1.0e-4);
    }

    #[test]
    fn seeking_vehicle_approaches_target() {
        let target = Vec3::new(0.0, 0.0, -20.0);
        let mut vehicle = Vehicle::new(Vec3::ZERO, Vec3::X, 1.0, target);
        let start = vehicle.position.distance(target);

        for _ in 0..600 {
            vehicle.update(1.0 / 60.0);
        }

        assert!(vehicle.position.distance(target) < start);
        assert!((vehicle.direction.length() - 1.0).abs() < 1.0e-4);
        assert!(vehicle.speed <= vehicle.max_speed + 1.0e-4);
    }

    #[test]
    fn fleeing_vehicle_moves_away() {
        let target = Vec3::new(1.0, 0.0, 0.0);
        let mut vehicle = Vehicle::new(Vec3::ZERO, Vec3::Z, 0.5, target)
            .with_strategy(SteeringStrategy::Flee);
        let start = vehicle.position.distance(target);

        for _ in 0..300 {
            vehicle.update(1.0 / 60.0);
        }

        assert!(vehicle.position.distance(target) > start);
    }

    #[test]
    fn zero_delta_leaves_vehicle_untouched() {
        let mut vehicle = Vehicle::new(Vec3::ZERO, Vec3::X, 1.0, Vec3::Y);
        vehicle.update(0.0);
        assert_eq!(vehicle.position, Vec3::ZERO);
        assert_eq!(vehicle.speed, 1.0);
    }
}
