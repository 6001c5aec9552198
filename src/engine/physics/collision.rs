use std::fmt;

use glam::Vec3;
use rapier3d::prelude::{Group, InteractionGroups};

use super::{EntityId, ProbeHandle};

/// Physical category a piece of collision geometry belongs to.
///
/// Each category owns exactly one bit, so a probe's from-mask can select any
/// combination without two categories ever aliasing each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionCategory {
    Floor = 0b0000_0010,
    Wall = 0b0000_0100,
    EnemyHead = 0b0000_1000,
    EnemyTorso = 0b0001_0000,
    EnemyLegs = 0b0010_0000,
}

impl CollisionCategory {
    /// Every part of an enemy body
    pub const ENEMY: [CollisionCategory; 3] = [
        CollisionCategory::EnemyHead,
        CollisionCategory::EnemyTorso,
        CollisionCategory::EnemyLegs,
    ];

    pub fn bits(self) -> u32 {
        self as u32
    }

    pub fn group(self) -> Group {
        Group::from_bits_truncate(self.bits())
    }

    /// Tag used in collision pattern names
    pub fn tag(self) -> &'static str {
        match self {
            Self::Floor => "floor",
            Self::Wall => "walls",
            Self::EnemyHead => "enemy-head",
            Self::EnemyTorso => "enemy-torso",
            Self::EnemyLegs => "enemy-legs",
        }
    }
}

/// Build a mask covering every listed category
pub fn mask(categories: &[CollisionCategory]) -> Group {
    categories
        .iter()
        .fold(Group::empty(), |acc, category| acc | category.group())
}

/// Groups for a probe: it detects `from`, and nothing ever detects it
pub fn probe_groups(from: Group) -> InteractionGroups {
    InteractionGroups::new(Group::empty(), from)
}

/// Groups for geometry: it is detected as `category` and detects nothing
pub fn geometry_groups(category: CollisionCategory) -> InteractionGroups {
    InteractionGroups::new(category.group(), Group::empty())
}

/// True when a probe with these groups should be tested against geometry
/// with those groups. Only the probe's from-mask and the geometry's
/// into-mask take part.
pub fn detects(probe: InteractionGroups, geometry: InteractionGroups) -> bool {
    probe.filter.intersects(geometry.memberships)
}

/// Key identifying a named probe touching a category of geometry,
/// e.g. `pieSeg-into-floor`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CollisionPattern {
    pub from: &'static str,
    pub into: CollisionCategory,
}

impl CollisionPattern {
    pub fn new(from: &'static str, into: CollisionCategory) -> Self {
        Self { from, into }
    }
}

impl fmt::Display for CollisionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-into-{}", self.from, self.into.tag())
    }
}

/// One probe in contact with one piece of geometry during a traversal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    /// The probe that detected the contact
    pub probe: ProbeHandle,
    /// Name the probe was registered under
    pub probe_name: &'static str,
    /// Entity carrying the probe
    pub prober: EntityId,
    /// Entity owning the geometry that was touched
    pub into: EntityId,
    pub category: CollisionCategory,
    /// Contact point on the geometry, world space
    pub point: Vec3,
    /// Unit direction that moves the prober out of the geometry
    pub normal: Vec3,
    /// Penetration depth along `normal` (zero for ray and segment probes)
    pub depth: f32,
}

impl CollisionEvent {
    pub fn pattern(&self) -> CollisionPattern {
        CollisionPattern::new(self.probe_name, self.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [CollisionCategory; 5] = [
        CollisionCategory::Floor,
        CollisionCategory::Wall,
        CollisionCategory::EnemyHead,
        CollisionCategory::EnemyTorso,
        CollisionCategory::EnemyLegs,
    ];

    #[test]
    fn test_category_bits_are_unique() {
        for (i, a) in ALL.iter().enumerate() {
            for (j, b) in ALL.iter().enumerate() {
                if i != j {
                    assert_eq!(a.bits() & b.bits(), 0, "{a:?} overlaps {b:?}");
                }
            }
        }
    }

    #[test]
    fn test_probe_detects_only_its_mask() {
        let floor_ray = probe_groups(mask(&[CollisionCategory::Floor]));
        assert!(detects(floor_ray, geometry_groups(CollisionCategory::Floor)));
        assert!(!detects(floor_ray, geometry_groups(CollisionCategory::Wall)));
        assert!(!detects(floor_ray, geometry_groups(CollisionCategory::EnemyHead)));
    }

    #[test]
    fn test_probes_never_detect_each_other() {
        let a = probe_groups(mask(&ALL));
        let b = probe_groups(mask(&ALL));
        assert!(!detects(a, b));
    }

    #[test]
    fn test_geometry_detects_nothing() {
        let wall = geometry_groups(CollisionCategory::Wall);
        for category in ALL {
            assert!(!detects(wall, geometry_groups(category)));
        }
    }

    #[test]
    fn test_pattern_display() {
        let pattern = CollisionPattern::new("pieSeg", CollisionCategory::Floor);
        assert_eq!(pattern.to_string(), "pieSeg-into-floor");
    }
}
