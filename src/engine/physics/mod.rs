// Collision detection built on rapier3d's collider storage and parry queries

mod collision;
mod probe;
mod world;

pub use collision::{CollisionCategory, CollisionEvent, CollisionPattern};
pub use probe::{ProbeBuilder, ProbeResponse};
pub use world::CollisionWorld;

use glam::{Quat, Vec3};
use rapier3d::prelude::{nalgebra, point, vector, Isometry, Point, Real, Vector};

/// Identity of anything that owns colliders: terrain, characters, projectiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a probe registered in a `CollisionWorld`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProbeHandle(pub u32);

pub fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

pub fn to_point(v: Vec3) -> Point<Real> {
    point![v.x, v.y, v.z]
}

pub fn from_vector(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

pub fn from_point(p: &Point<Real>) -> Vec3 {
    Vec3::new(p.x, p.y, p.z)
}

/// Convert a glam transform into the isometry rapier works with
pub fn to_isometry(position: Vec3, rotation: Quat) -> Isometry<Real> {
    let rotation = nalgebra::UnitQuaternion::new_normalize(nalgebra::Quaternion::new(
        rotation.w, rotation.x, rotation.y, rotation.z,
    ));
    Isometry::from_parts(
        nalgebra::Translation3::new(position.x, position.y, position.z),
        rotation,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_isometry_conversion_matches_glam() {
        let position = Vec3::new(1.0, 2.0, 3.0);
        let rotation = Quat::from_rotation_z(0.7) * Quat::from_rotation_y(0.3);
        let local = Vec3::new(0.5, -1.0, 2.0);

        let expected = position + rotation * local;
        let actual = from_point(&(to_isometry(position, rotation) * to_point(local)));

        assert_relative_eq!(expected.x, actual.x, epsilon = 1e-5);
        assert_relative_eq!(expected.y, actual.y, epsilon = 1e-5);
        assert_relative_eq!(expected.z, actual.z, epsilon = 1e-5);
    }

    #[test]
    fn test_entity_display() {
        assert_eq!(EntityId(12).to_string(), "#12");
    }
}
