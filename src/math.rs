/*
 * Math Module
 *
 * Small vector helpers on top of glam's Vec3 used by the steering code.
 * Every helper treats a (near) zero-length input as having no direction,
 * so degenerate cases produce a zero vector instead of NaN.
 */

use glam::Vec3;

pub const EPSILON: f32 = 1.0e-6;

// Unit vector in the same direction, or zero when there is no direction
pub fn normalize_or_zero(v: Vec3) -> Vec3 {
    let length_sq = v.length_squared();
    if length_sq <= EPSILON * EPSILON {
        return Vec3::ZERO;
    }
    v / length_sq.sqrt()
}

// Rescale to the given length; a negative length flips the vector
pub fn set_length(v: Vec3, length: f32) -> Vec3 {
    normalize_or_zero(v) * length
}

// Clamp the magnitude into [min, max]. A zero vector stays zero.
pub fn clamp_length(v: Vec3, min: f32, max: f32) -> Vec3 {
    let length = v.length();
    if length <= EPSILON {
        return Vec3::ZERO;
    }
    // max/min instead of clamp so a NaN bound is ignored rather than panicking
    let clamped = length.max(min).min(max.max(min));
    v * (clamped / length)
}

pub fn limit_length(v: Vec3, max: f32) -> Vec3 {
    clamp_length(v, 0.0, max)
}
