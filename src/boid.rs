/*
 * Boid Module
 *
 * This module defines the Boid struct and its behavior.
 * While flocking, each boid follows three rules against the neighbours
 * within its friend distance:
 * 1. Separation: Avoid crowding neighbors
 * 2. Velocity matching: Steer towards the average velocity of neighbors
 * 3. Cohesion: Steer towards the average position of neighbors
 *
 * A boid that strays too far from the flocking center switches to returning,
 * where it only keeps its separation and seeks back to the center until it is
 * comfortably inside the boundary again.
 */

use std::fmt;

use glam::Vec3;
use rand::Rng;

use crate::math::{clamp_length, limit_length, normalize_or_zero, set_length, EPSILON};
use crate::params::{BoidParams, FlockParams};
use crate::steering::seek;

// Stable identity of a boid within a world
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoidTag(pub u32);

impl fmt::Display for BoidTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BoidState {
    #[default]
    Flocking,
    Returning,
}

// What a boid can see of another boid during a tick
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    pub tag: BoidTag,
    pub position: Vec3,
    pub velocity: Vec3,
}

// Read-only view of the world a boid steers against
pub trait Neighborhood {
    // Every boid other than `from` strictly closer than `cutoff_distance` to `position`
    fn find_nearby(&self, from: BoidTag, position: Vec3, cutoff_distance: f32) -> Vec<Neighbor>;

    fn flocking_center(&self) -> Vec3;
}

#[derive(Clone, Debug)]
pub struct Boid {
    tag: BoidTag,
    position: Vec3,
    direction: Vec3,
    speed: f32,
    params: BoidParams,
    state: BoidState,
    // Neighbours found this tick, by tag; never kept across ticks
    friends: Vec<BoidTag>,
    force_to_center: Vec3,
    force_away: Vec3,
    force_to_match_velocity: Vec3,
}

impl Boid {
    pub fn new(position: Vec3, direction: Vec3, speed: f32, tag: BoidTag, params: BoidParams) -> Self {
        let mut params = params;
        params.sanitize();

        let mut direction = normalize_or_zero(direction);
        if direction == Vec3::ZERO {
            direction = Vec3::NEG_Z;
        }

        Self {
            tag,
            position,
            direction,
            speed: speed.max(0.0),
            params,
            state: BoidState::Flocking,
            friends: Vec::new(),
            force_to_center: Vec3::ZERO,
            force_away: Vec3::ZERO,
            force_to_match_velocity: Vec3::ZERO,
        }
    }

    // Random spot on the spawn plane, heading somewhere in the horizontal plane
    pub fn with_random_position_and_direction<R: Rng + ?Sized>(
        rng: &mut R,
        flock: &FlockParams,
        params: BoidParams,
        tag: BoidTag,
    ) -> Self {
        let x = rng.gen_range(flock.spawn_min..flock.spawn_max);
        let z = rng.gen_range(flock.spawn_min..flock.spawn_max);
        let position = Vec3::new(x, flock.spawn_height, z);

        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        let direction = Vec3::new(angle.cos(), 0.0, angle.sin());

        Self::new(position, direction, flock.initial_speed, tag, params)
    }

    pub fn with_state(mut self, state: BoidState) -> Self {
        self.state = state;
        self
    }

    pub fn tag(&self) -> BoidTag {
        self.tag
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn velocity(&self) -> Vec3 {
        self.direction * self.speed
    }

    pub fn params(&self) -> &BoidParams {
        &self.params
    }

    pub fn state(&self) -> BoidState {
        self.state
    }

    pub fn friends(&self) -> &[BoidTag] {
        &self.friends
    }

    pub fn force_to_center(&self) -> Vec3 {
        self.force_to_center
    }

    pub fn force_away(&self) -> Vec3 {
        self.force_away
    }

    pub fn force_to_match_velocity(&self) -> Vec3 {
        self.force_to_match_velocity
    }

    pub fn as_neighbor(&self) -> Neighbor {
        Neighbor {
            tag: self.tag,
            position: self.position,
            velocity: self.velocity(),
        }
    }

    // One simulation step: look around, pick a behaviour, steer, move
    pub fn update<N: Neighborhood + ?Sized>(&mut self, delta: f32, world: &N) {
        // A zero-length tick has no displacement to derive a speed from
        if !(delta > 0.0) || !delta.is_finite() {
            return;
        }

        let friends = world.find_nearby(self.tag, self.position, self.params.friend_distance);
        let center = world.flocking_center();

        self.state = self.select_state(center);

        let total_steering_force = match self.state {
            BoidState::Flocking => {
                self.force_to_center = self.force_toward_center_of_friends(&friends);
                self.force_away = self.force_away_from_nearby(&friends);
                self.force_to_match_velocity = self.force_to_match_velocity_of(&friends);
                self.force_to_center + self.force_away + self.force_to_match_velocity
            }
            BoidState::Returning => {
                self.force_to_center = Vec3::ZERO;
                self.force_away = self.force_away_from_nearby(&friends);
                self.force_to_match_velocity = Vec3::ZERO;
                self.force_away + seek(self.position, center, self.speed, delta)
            }
        };

        self.friends.clear();
        self.friends.extend(friends.iter().map(|friend| friend.tag));

        self.integrate(total_steering_force, delta);
    }

    fn select_state(&self, center: Vec3) -> BoidState {
        let distance_to_center = self.position.distance(center);

        match self.state {
            BoidState::Flocking if distance_to_center > self.params.max_distance => BoidState::Returning,
            BoidState::Returning if distance_to_center < self.params.start_flocking_again_distance => {
                BoidState::Flocking
            }
            state => state,
        }
    }

    fn integrate(&mut self, steering_direction: Vec3, delta: f32) {
        let steering_force = limit_length(steering_direction, self.params.max_force * delta);
        let acceleration = steering_force / self.params.mass;

        let mut velocity = self.direction * (self.speed * delta) + acceleration;

        // Forces cancelled all motion: restart along the current heading
        if velocity.length_squared() <= EPSILON * EPSILON {
            velocity = self.direction * (self.params.min_speed * delta);
        }

        let velocity = clamp_length(
            velocity,
            self.params.min_speed * delta,
            self.params.max_speed * delta,
        );

        self.position += velocity;
        self.speed = velocity.length() / delta;

        let heading = normalize_or_zero(velocity);
        if heading != Vec3::ZERO {
            self.direction = heading;
        }
    }

    fn force_toward_center_of_friends(&self, friends: &[Neighbor]) -> Vec3 {
        if friends.is_empty() {
            return Vec3::ZERO;
        }

        let sum: Vec3 = friends.iter().map(|friend| friend.position).sum();
        let local_center = sum / friends.len() as f32;

        (local_center - self.position) / self.params.cohesion_divisor
    }

    fn force_away_from_nearby(&self, friends: &[Neighbor]) -> Vec3 {
        let mut result = Vec3::ZERO;

        for friend in friends {
            let away_from_friend = self.position - friend.position;
            let distance = away_from_friend.length();
            // Closer friends push harder
            let strength = (self.params.friend_distance - distance) * self.params.separation_strength;
            result += set_length(away_from_friend, strength);
        }

        result / self.params.separation_divisor
    }

    fn force_to_match_velocity_of(&self, friends: &[Neighbor]) -> Vec3 {
        if friends.is_empty() {
            return Vec3::ZERO;
        }

        let sum: Vec3 = friends.iter().map(|friend| friend.velocity).sum();
        let average_velocity = sum / friends.len() as f32;

        (average_velocity - self.velocity()) / self.params.velocity_matching_divisor
    }
}
