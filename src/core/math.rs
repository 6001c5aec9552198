// Math utilities and helper functions
//
// World convention: Z is up, a heading of 0 degrees faces +Y, and positive
// headings turn counter-clockwise when seen from above.

use glam::{Quat, Vec3};

/// Clamp a value between min and max
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Linear interpolation
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Unit vector along local +Y for a heading given in degrees
pub fn forward_from_heading(heading_deg: f32) -> Vec3 {
    let h = heading_deg.to_radians();
    Vec3::new(-h.sin(), h.cos(), 0.0)
}

/// Heading (degrees) that makes local +Y point from `from` towards `to`,
/// ignoring height. Returns `None` when the two points share an XY position.
pub fn heading_towards(from: Vec3, to: Vec3) -> Option<f32> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx.abs() < f32::EPSILON && dy.abs() < f32::EPSILON {
        return None;
    }
    Some((-dx).atan2(dy).to_degrees())
}

/// Wrap an angle in degrees into (-180, 180]. Angles already in range come
/// back bit-for-bit unchanged.
pub fn wrap_degrees(angle: f32) -> f32 {
    if angle > -180.0 && angle <= 180.0 {
        return angle;
    }
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Rotation for a heading/pitch/roll triple in degrees.
///
/// Roll is applied first (about local Y), then pitch (about local X), then
/// heading (about world Z).
pub fn rotation_from_hpr(heading: f32, pitch: f32, roll: f32) -> Quat {
    Quat::from_rotation_z(heading.to_radians())
        * Quat::from_rotation_x(pitch.to_radians())
        * Quat::from_rotation_y(roll.to_radians())
}
