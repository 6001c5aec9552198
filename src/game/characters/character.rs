// Character transform and identity

use glam::{Quat, Vec3};

use crate::core::math::{forward_from_heading, rotation_from_hpr, wrap_degrees};
use crate::engine::physics::EntityId;

use super::animation::ActorAnimation;

/// Position on the terrain plus a heading about +Z in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub heading: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 0.0)
    }
}

impl Transform {
    pub fn new(position: Vec3, heading: f32) -> Self {
        Self { position, heading }
    }

    pub fn rotation(&self) -> Quat {
        rotation_from_hpr(self.heading, 0.0, 0.0)
    }

    /// Unit vector along local +Y
    pub fn forward(&self) -> Vec3 {
        forward_from_heading(self.heading)
    }

    /// Move along local +Y by `distance` (negative moves backwards)
    pub fn advance(&mut self, distance: f32) {
        self.position += self.forward() * distance;
    }

    pub fn turn(&mut self, degrees: f32) {
        self.heading = wrap_degrees(self.heading + degrees);
    }

    /// Convert a point from the local frame to world space
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation() * local
    }
}

/// An animated body in the world: the player or an enemy
pub struct Character {
    pub id: EntityId,
    pub name: String,
    pub transform: Transform,
    pub actor: Box<dyn ActorAnimation>,
}

impl Character {
    pub fn new(
        id: EntityId,
        name: impl Into<String>,
        transform: Transform,
        actor: Box<dyn ActorAnimation>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            transform,
            actor,
        }
    }
}

impl std::fmt::Debug for Character {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Character")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("transform", &self.transform)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_advance_follows_heading() {
        let mut transform = Transform::default();
        transform.advance(0.6);
        assert_relative_eq!(transform.position.y, 0.6, epsilon = 1e-6);

        transform.heading = 90.0;
        transform.advance(1.0);
        assert_relative_eq!(transform.position.x, -1.0, epsilon = 1e-6);
        assert_relative_eq!(transform.position.y, 0.6, epsilon = 1e-6);
    }

    #[test]
    fn test_negative_advance_backs_up() {
        let mut transform = Transform::default();
        transform.advance(-0.3);
        assert_relative_eq!(transform.position.y, -0.3, epsilon = 1e-6);
    }

    #[test]
    fn test_turn_wraps() {
        let mut transform = Transform::new(Vec3::ZERO, 179.5);
        transform.turn(0.7);
        assert_relative_eq!(transform.heading, -179.8, epsilon = 1e-4);
    }

    #[test]
    fn test_turn_in_range_is_exact() {
        let mut transform = Transform::default();
        transform.turn(0.7);
        assert_eq!(transform.heading, 0.7);

        for _ in 1..100 {
            transform.turn(0.7);
        }
        assert_relative_eq!(transform.heading, 70.0, epsilon = 1e-4);
    }

    #[test]
    fn test_to_world_rotates_offsets() {
        let transform = Transform::new(Vec3::new(10.0, 0.0, 0.0), 90.0);
        let hand = transform.to_world(Vec3::new(0.0, 1.0, 2.0));
        assert_relative_eq!(hand.x, 9.0, epsilon = 1e-5);
        assert_relative_eq!(hand.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(hand.z, 2.0, epsilon = 1e-5);
    }
}
