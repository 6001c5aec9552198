use glam::Vec3;
use rapier3d::prelude::{InteractionGroups, Real, SharedShape};

use super::collision::{mask, probe_groups, CollisionCategory};
use super::EntityId;

/// Length used for ray probes. Rays are unbounded in principle; this only
/// needs to exceed any drop the level contains.
pub const RAY_REACH: Real = 1_000.0;

/// Built-in reaction the collision world computes for a probe's contacts
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeResponse {
    /// Only raise events
    Event,
    /// Keep the owner standing on the highest floor contact, falling at most
    /// `max_velocity` units per second
    Floor { max_velocity: f32 },
    /// Push the owner horizontally out of whatever it overlaps
    Pusher,
}

/// Probe geometry in the owner's local frame
#[derive(Clone)]
pub(crate) enum ProbeGeometry {
    /// Ray or segment: tested by casting from `origin` along `direction`
    Cast {
        origin: Vec3,
        direction: Vec3,
        reach: Real,
    },
    /// Volume: tested by contact against the geometry
    Solid { shape: SharedShape, offset: Vec3 },
}

/// A massless shape carried by an entity that only detects overlap
#[derive(Clone)]
pub struct Probe {
    pub(crate) name: &'static str,
    pub(crate) owner: EntityId,
    pub(crate) groups: InteractionGroups,
    pub(crate) geometry: ProbeGeometry,
    pub(crate) response: ProbeResponse,
    pub(crate) active: bool,
}

impl std::fmt::Debug for Probe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Probe")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("response", &self.response)
            .field("active", &self.active)
            .finish()
    }
}

/// Builder for probes with the common shapes
pub struct ProbeBuilder {
    name: &'static str,
    geometry: ProbeGeometry,
    detects: Vec<CollisionCategory>,
    response: ProbeResponse,
    active: bool,
}

impl ProbeBuilder {
    fn new(name: &'static str, geometry: ProbeGeometry) -> Self {
        Self {
            name,
            geometry,
            detects: Vec::new(),
            response: ProbeResponse::Event,
            active: true,
        }
    }

    /// Half-line starting at `origin`
    pub fn ray(name: &'static str, origin: Vec3, direction: Vec3) -> Self {
        Self::new(
            name,
            ProbeGeometry::Cast {
                origin,
                direction: direction.normalize_or_zero(),
                reach: RAY_REACH,
            },
        )
    }

    /// Finite segment from `a` to `b`
    pub fn segment(name: &'static str, a: Vec3, b: Vec3) -> Self {
        let delta = b - a;
        Self::new(
            name,
            ProbeGeometry::Cast {
                origin: a,
                direction: delta.normalize_or_zero(),
                reach: delta.length(),
            },
        )
    }

    pub fn sphere(name: &'static str, center: Vec3, radius: f32) -> Self {
        Self::solid(name, SharedShape::ball(radius), center)
    }

    /// Any volume (capsule, box, ...) centered at `offset` from the owner
    pub fn solid(name: &'static str, shape: SharedShape, offset: Vec3) -> Self {
        Self::new(name, ProbeGeometry::Solid { shape, offset })
    }

    /// Categories this probe reacts to (its from-mask)
    pub fn detects(mut self, categories: &[CollisionCategory]) -> Self {
        self.detects.extend_from_slice(categories);
        self
    }

    pub fn response(mut self, response: ProbeResponse) -> Self {
        self.response = response;
        self
    }

    /// Start the probe switched off
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn build(self, owner: EntityId) -> Probe {
        Probe {
            name: self.name,
            owner,
            groups: probe_groups(mask(&self.detects)),
            geometry: self.geometry,
            response: self.response,
            active: self.active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::physics::collision::{detects, geometry_groups};

    #[test]
    fn test_segment_reach_matches_length() {
        let probe = ProbeBuilder::segment("seg", Vec3::Z, -Vec3::Z).build(EntityId(1));
        match probe.geometry {
            ProbeGeometry::Cast {
                direction, reach, ..
            } => {
                assert_eq!(direction, -Vec3::Z);
                assert_eq!(reach, 2.0);
            }
            ProbeGeometry::Solid { .. } => panic!("segment should be a cast probe"),
        }
    }

    #[test]
    fn test_ray_uses_long_reach() {
        let probe = ProbeBuilder::ray("ray", Vec3::Z, Vec3::new(0.0, 0.0, -5.0)).build(EntityId(1));
        match probe.geometry {
            ProbeGeometry::Cast {
                direction, reach, ..
            } => {
                assert_eq!(direction, -Vec3::Z);
                assert_eq!(reach, RAY_REACH);
            }
            ProbeGeometry::Solid { .. } => panic!("ray should be a cast probe"),
        }
    }

    #[test]
    fn test_builder_sets_from_mask() {
        let probe = ProbeBuilder::sphere("sphere", Vec3::ZERO, 1.0)
            .detects(&[CollisionCategory::Wall])
            .response(ProbeResponse::Pusher)
            .build(EntityId(3));

        assert_eq!(probe.owner, EntityId(3));
        assert_eq!(probe.response, ProbeResponse::Pusher);
        assert!(probe.active);
        assert!(detects(probe.groups, geometry_groups(CollisionCategory::Wall)));
        assert!(!detects(probe.groups, geometry_groups(CollisionCategory::Floor)));
    }

    #[test]
    fn test_inactive_builder() {
        let probe = ProbeBuilder::solid("box", SharedShape::cuboid(1.0, 1.0, 1.0), Vec3::ZERO)
            .inactive()
            .build(EntityId(0));
        assert!(!probe.active);
    }
}
