use std::collections::{BTreeMap, HashMap};

use glam::{Quat, Vec3};
use rapier3d::parry::query::{self, RayCast};
use rapier3d::prelude::*;

use super::collision::{detects, geometry_groups, CollisionCategory, CollisionEvent};
use super::probe::{Probe, ProbeGeometry, ProbeResponse};
use super::{from_point, from_vector, to_isometry, to_point, to_vector, EntityId, ProbeHandle};

/// Handle to a piece of collision geometry
pub type GeometryHandle = ColliderHandle;

/// Bookkeeping for geometry we own inside the collider set
#[derive(Debug, Clone)]
struct GeometryInfo {
    owner: EntityId,
    name: String,
    category: CollisionCategory,
    local: Isometry<Real>,
}

/// Position change the collision world asks an owner to apply
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustment {
    pub owner: EntityId,
    pub translation: Vec3,
}

/// Holds all collision geometry and probes, and runs the per-tick traversal
pub struct CollisionWorld {
    /// Geometry that probes can detect
    collider_set: ColliderSet,

    /// Required by `ColliderSet::remove`; geometry never has a parent body
    island_manager: IslandManager,
    rigid_body_set: RigidBodySet,

    geometry: HashMap<ColliderHandle, GeometryInfo>,

    /// Ordered so traversal, and therefore event order, is deterministic
    probes: BTreeMap<ProbeHandle, Probe>,
    next_probe: u32,

    /// Current world transform of every entity that owns colliders
    owners: HashMap<EntityId, Isometry<Real>>,
}

impl CollisionWorld {
    pub fn new() -> Self {
        Self {
            collider_set: ColliderSet::new(),
            island_manager: IslandManager::new(),
            rigid_body_set: RigidBodySet::new(),
            geometry: HashMap::new(),
            probes: BTreeMap::new(),
            next_probe: 0,
            owners: HashMap::new(),
        }
    }

    /// Add a named piece of geometry, placed relative to its owner
    pub fn add_geometry(
        &mut self,
        owner: EntityId,
        name: &str,
        category: CollisionCategory,
        shape: SharedShape,
        local: Isometry<Real>,
    ) -> GeometryHandle {
        let owner_pose = self.owner_pose(owner);
        let collider = ColliderBuilder::new(shape)
            .position(owner_pose * local)
            .collision_groups(geometry_groups(category))
            .sensor(true)
            .user_data(owner.0 as u128)
            .build();
        let handle = self.collider_set.insert(collider);
        self.geometry.insert(
            handle,
            GeometryInfo {
                owner,
                name: name.to_string(),
                category,
                local,
            },
        );
        handle
    }

    /// Register a probe and return its handle
    pub fn add_probe(&mut self, probe: Probe) -> ProbeHandle {
        let handle = ProbeHandle(self.next_probe);
        self.next_probe += 1;
        self.probes.insert(handle, probe);
        handle
    }

    /// Switch a probe on or off; inactive probes are skipped by traversal
    pub fn set_probe_active(&mut self, handle: ProbeHandle, active: bool) {
        if let Some(probe) = self.probes.get_mut(&handle) {
            probe.active = active;
        }
    }

    /// Move an owner, carrying its geometry and probes along
    pub fn set_owner_transform(&mut self, owner: EntityId, position: Vec3, rotation: Quat) {
        let pose = to_isometry(position, rotation);
        self.owners.insert(owner, pose);

        for (handle, info) in &self.geometry {
            if info.owner == owner {
                if let Some(collider) = self.collider_set.get_mut(*handle) {
                    collider.set_position(pose * info.local);
                }
            }
        }
    }

    /// World position of an owner as last reported
    pub fn owner_position(&self, owner: EntityId) -> Option<Vec3> {
        self.owners
            .get(&owner)
            .map(|pose| from_vector(&pose.translation.vector))
    }

    fn owner_pose(&self, owner: EntityId) -> Isometry<Real> {
        self.owners
            .get(&owner)
            .copied()
            .unwrap_or_else(Isometry::identity)
    }

    /// Remove everything an entity owns. Safe to call more than once.
    pub fn remove_owner(&mut self, owner: EntityId) {
        let handles: Vec<_> = self
            .geometry
            .iter()
            .filter(|(_, info)| info.owner == owner)
            .map(|(handle, _)| *handle)
            .collect();

        for handle in handles {
            if let Some(info) = self.geometry.get(&handle) {
                log::debug!("Removing {} ({}) of {owner}", info.name, info.category.tag());
            }
            self.collider_set.remove(
                handle,
                &mut self.island_manager,
                &mut self.rigid_body_set,
                false,
            );
            self.geometry.remove(&handle);
        }

        self.probes.retain(|_, probe| probe.owner != owner);
        self.owners.remove(&owner);
    }

    /// Test every active probe against every geometry its from-mask selects.
    ///
    /// Contacts are level-triggered: a pair that stays in contact produces
    /// one event on every traversal. A probe never detects geometry owned by
    /// its own entity.
    pub fn traverse(&self) -> Vec<CollisionEvent> {
        let mut events = Vec::new();

        for (handle, probe) in &self.probes {
            if !probe.active {
                continue;
            }
            let owner_pose = self.owner_pose(probe.owner);

            for (collider_handle, collider) in self.collider_set.iter() {
                let Some(info) = self.geometry.get(&collider_handle) else {
                    continue;
                };
                if info.owner == probe.owner || !detects(probe.groups, collider.collision_groups())
                {
                    continue;
                }

                if let Some(event) = Self::test_pair(*handle, probe, &owner_pose, collider, info) {
                    events.push(event);
                }
            }
        }

        events
    }

    fn test_pair(
        handle: ProbeHandle,
        probe: &Probe,
        owner_pose: &Isometry<Real>,
        collider: &Collider,
        info: &GeometryInfo,
    ) -> Option<CollisionEvent> {
        let (point, normal, depth) = match &probe.geometry {
            ProbeGeometry::Cast {
                origin,
                direction,
                reach,
            } => {
                let ray = Ray::new(
                    owner_pose * to_point(*origin),
                    owner_pose * to_vector(*direction),
                );
                let toi = collider
                    .shape()
                    .cast_ray(collider.position(), &ray, *reach, true)?;
                let direction = from_vector(&ray.dir);
                (from_point(&ray.point_at(toi)), -direction, 0.0)
            }
            ProbeGeometry::Solid { shape, offset } => {
                let probe_pose = owner_pose * Isometry::translation(offset.x, offset.y, offset.z);
                let contact = match query::contact(
                    &probe_pose,
                    &**shape,
                    collider.position(),
                    collider.shape(),
                    0.0,
                ) {
                    Ok(contact) => contact?,
                    Err(_) => {
                        log::debug!(
                            "Unsupported shape pair for probe {} against {}",
                            probe.name,
                            info.name
                        );
                        return None;
                    }
                };
                let normal = -from_vector(&contact.normal1);
                (from_point(&contact.point2), normal, (-contact.dist).max(0.0))
            }
        };

        Some(CollisionEvent {
            probe: handle,
            probe_name: probe.name,
            prober: probe.owner,
            into: info.owner,
            category: info.category,
            point,
            normal,
            depth,
        })
    }

    /// Turn this traversal's contacts into position corrections for the
    /// owners of floor-following and pushing probes.
    pub fn resolve(&self, events: &[CollisionEvent], dt: f32) -> Vec<Adjustment> {
        let mut floors: BTreeMap<ProbeHandle, (EntityId, f32, f32)> = BTreeMap::new();
        let mut pushes: BTreeMap<EntityId, Vec3> = BTreeMap::new();

        for event in events {
            let Some(probe) = self.probes.get(&event.probe) else {
                continue;
            };
            match probe.response {
                ProbeResponse::Event => {}
                ProbeResponse::Floor { max_velocity } => {
                    let entry = floors
                        .entry(event.probe)
                        .or_insert((probe.owner, f32::NEG_INFINITY, max_velocity));
                    entry.1 = entry.1.max(event.point.z);
                }
                ProbeResponse::Pusher => {
                    let horizontal = Vec3::new(event.normal.x, event.normal.y, 0.0);
                    if let Some(direction) = horizontal.try_normalize() {
                        *pushes.entry(probe.owner).or_insert(Vec3::ZERO) += direction * event.depth;
                    }
                }
            }
        }

        let mut adjustments: BTreeMap<EntityId, Vec3> = pushes;

        for (owner, floor_z, max_velocity) in floors.into_values() {
            let Some(current) = self.owner_position(owner) else {
                continue;
            };
            let dz = if current.z <= floor_z {
                floor_z - current.z
            } else {
                -(current.z - floor_z).min(max_velocity * dt)
            };
            adjustments.entry(owner).or_insert(Vec3::ZERO).z += dz;
        }

        adjustments
            .into_iter()
            .filter(|(_, translation)| *translation != Vec3::ZERO)
            .map(|(owner, translation)| Adjustment { owner, translation })
            .collect()
    }
}

impl Default for CollisionWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl CollisionWorld {
    /// Probe registered by `owner` under `name`
    pub fn find_probe(&self, owner: EntityId, name: &str) -> Option<&Probe> {
        self.probes
            .values()
            .find(|probe| probe.owner == owner && probe.name == name)
    }

    /// Find the first geometry registered under a name
    pub fn find_geometry(&self, name: &str) -> Option<GeometryHandle> {
        self.geometry
            .iter()
            .find(|(_, info)| info.name == name)
            .map(|(handle, _)| *handle)
    }

    /// World-space center, half extents and category of a named box
    pub fn geometry_box(&self, name: &str) -> Option<(Vec3, Vec3, CollisionCategory)> {
        let handle = self.find_geometry(name)?;
        let collider = self.collider_set.get(handle)?;
        let cuboid = collider.shape().as_cuboid()?;
        Some((
            from_vector(&collider.position().translation.vector),
            from_vector(&cuboid.half_extents),
            self.geometry[&handle].category,
        ))
    }

    pub fn geometry_count(&self) -> usize {
        self.geometry.len()
    }

    pub fn probe_count(&self) -> usize {
        self.probes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::physics::ProbeBuilder;
    use approx::assert_relative_eq;

    const TERRAIN: EntityId = EntityId(0);
    const HERO: EntityId = EntityId(1);

    /// Flat floor with its top at z = 0 and a wall whose face is at x = 4.5
    fn arena() -> CollisionWorld {
        let mut world = CollisionWorld::new();
        world.add_geometry(
            TERRAIN,
            "collision_floors",
            CollisionCategory::Floor,
            SharedShape::cuboid(50.0, 50.0, 0.5),
            Isometry::translation(0.0, 0.0, -0.5),
        );
        world.add_geometry(
            TERRAIN,
            "collision_walls",
            CollisionCategory::Wall,
            SharedShape::cuboid(0.5, 10.0, 10.0),
            Isometry::translation(5.0, 0.0, 5.0),
        );
        world
    }

    fn add_floor_ray(world: &mut CollisionWorld) -> ProbeHandle {
        world.add_probe(
            ProbeBuilder::ray("playerRay", Vec3::Z, -Vec3::Z)
                .detects(&[CollisionCategory::Floor])
                .response(ProbeResponse::Floor { max_velocity: 40.0 })
                .build(HERO),
        )
    }

    fn add_wall_sphere(world: &mut CollisionWorld) -> ProbeHandle {
        world.add_probe(
            ProbeBuilder::sphere("playerSphere", Vec3::new(0.0, 0.0, 3.0), 1.0)
                .detects(&[CollisionCategory::Wall])
                .response(ProbeResponse::Pusher)
                .build(HERO),
        )
    }

    #[test]
    fn test_ray_hits_floor_below() {
        let mut world = arena();
        let probe = add_floor_ray(&mut world);
        world.set_owner_transform(HERO, Vec3::new(0.0, 0.0, 5.0), Quat::IDENTITY);

        let events = world.traverse();
        assert_eq!(events.len(), 1);
        let event = events[0];
        assert_eq!(event.probe, probe);
        assert_eq!(event.category, CollisionCategory::Floor);
        assert_eq!(event.into, TERRAIN);
        assert_relative_eq!(event.point.z, 0.0, epsilon = 1e-4);
        assert_eq!(event.pattern().to_string(), "playerRay-into-floor");
    }

    #[test]
    fn test_events_are_level_triggered() {
        let mut world = arena();
        add_floor_ray(&mut world);
        world.set_owner_transform(HERO, Vec3::ZERO, Quat::IDENTITY);

        assert_eq!(world.traverse().len(), 1);
        assert_eq!(world.traverse().len(), 1);
    }

    #[test]
    fn test_sphere_mask_ignores_floor() {
        let mut world = arena();
        add_wall_sphere(&mut world);
        // Sphere centre at z = 0.5 overlaps the floor, but only detects walls
        world.set_owner_transform(HERO, Vec3::new(0.0, 0.0, -2.5), Quat::IDENTITY);

        assert!(world.traverse().is_empty());
    }

    #[test]
    fn test_wall_push_out() {
        let mut world = arena();
        add_wall_sphere(&mut world);
        world.set_owner_transform(HERO, Vec3::new(4.0, 0.0, 0.0), Quat::IDENTITY);

        let events = world.traverse();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].category, CollisionCategory::Wall);
        assert_relative_eq!(events[0].depth, 0.5, epsilon = 1e-4);

        let adjustments = world.resolve(&events, 1.0 / 60.0);
        assert_eq!(adjustments.len(), 1);
        assert_eq!(adjustments[0].owner, HERO);
        assert_relative_eq!(adjustments[0].translation.x, -0.5, epsilon = 1e-4);
        assert_relative_eq!(adjustments[0].translation.z, 0.0);
    }

    #[test]
    fn test_capsule_touches_wall() {
        let mut world = arena();
        world.add_probe(
            ProbeBuilder::solid("body", SharedShape::capsule_z(1.0, 0.5), Vec3::new(0.0, 0.0, 2.0))
                .detects(&[CollisionCategory::Wall])
                .build(HERO),
        );
        world.set_owner_transform(HERO, Vec3::new(3.0, 0.0, 0.0), Quat::IDENTITY);
        assert!(world.traverse().is_empty());

        world.set_owner_transform(HERO, Vec3::new(4.25, 0.0, 0.0), Quat::IDENTITY);
        let events = world.traverse();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].pattern().to_string(), "body-into-wall");
    }

    #[test]
    fn test_floor_snaps_up_from_below() {
        let mut world = arena();
        add_floor_ray(&mut world);
        world.set_owner_transform(HERO, Vec3::new(0.0, 0.0, -0.4), Quat::IDENTITY);

        let events = world.traverse();
        let adjustments = world.resolve(&events, 1.0 / 60.0);
        assert_eq!(adjustments.len(), 1);
        assert_relative_eq!(adjustments[0].translation.z, 0.4, epsilon = 1e-4);
    }

    #[test]
    fn test_floor_fall_is_capped_by_max_velocity() {
        let mut world = arena();
        add_floor_ray(&mut world);
        world.set_owner_transform(HERO, Vec3::new(0.0, 0.0, 10.0), Quat::IDENTITY);

        let dt = 1.0 / 60.0;
        let events = world.traverse();
        let adjustments = world.resolve(&events, dt);
        assert_relative_eq!(adjustments[0].translation.z, -40.0 * dt, epsilon = 1e-4);
    }

    #[test]
    fn test_standing_on_floor_needs_no_adjustment() {
        let mut world = arena();
        add_floor_ray(&mut world);
        world.set_owner_transform(HERO, Vec3::ZERO, Quat::IDENTITY);

        let events = world.traverse();
        assert!(world.resolve(&events, 1.0 / 60.0).is_empty());
    }

    #[test]
    fn test_inactive_probe_is_skipped() {
        let mut world = arena();
        let probe = add_floor_ray(&mut world);
        world.set_owner_transform(HERO, Vec3::ZERO, Quat::IDENTITY);
        world.set_probe_active(probe, false);

        assert!(world.traverse().is_empty());
    }

    #[test]
    fn test_geometry_follows_owner() {
        let mut world = arena();
        let enemy = EntityId(7);
        world.add_geometry(
            enemy,
            "torso",
            CollisionCategory::EnemyTorso,
            SharedShape::ball(1.0),
            Isometry::translation(0.0, 0.0, 2.0),
        );
        let probe = world.add_probe(
            ProbeBuilder::sphere("pieSphere", Vec3::ZERO, 0.75)
                .detects(&CollisionCategory::ENEMY)
                .build(HERO),
        );
        world.set_owner_transform(HERO, Vec3::new(20.0, 0.0, 2.0), Quat::IDENTITY);
        assert!(world.traverse().is_empty());

        world.set_owner_transform(enemy, Vec3::new(20.0, 0.5, 0.0), Quat::IDENTITY);
        let events = world.traverse();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].probe, probe);
        assert_eq!(events[0].into, enemy);
        assert_eq!(events[0].category, CollisionCategory::EnemyTorso);
    }

    #[test]
    fn test_probe_ignores_own_geometry() {
        let mut world = CollisionWorld::new();
        world.add_geometry(
            HERO,
            "self",
            CollisionCategory::Wall,
            SharedShape::ball(2.0),
            Isometry::identity(),
        );
        add_wall_sphere(&mut world);
        assert!(world.traverse().is_empty());
    }

    #[test]
    fn test_remove_owner_is_idempotent() {
        let mut world = arena();
        add_floor_ray(&mut world);
        world.set_owner_transform(HERO, Vec3::ZERO, Quat::IDENTITY);

        world.remove_owner(HERO);
        world.remove_owner(HERO);
        assert_eq!(world.probe_count(), 0);
        assert_eq!(world.geometry_count(), 2);

        world.remove_owner(TERRAIN);
        assert_eq!(world.geometry_count(), 0);
        assert!(world.find_geometry("collision_floors").is_none());
    }

    #[test]
    fn test_find_geometry_by_name() {
        let world = arena();
        let handle = world.find_geometry("collision_walls").unwrap();
        assert_eq!(world.geometry[&handle].category, CollisionCategory::Wall);
        assert!(world.find_geometry("collision_ceiling").is_none());
    }
}
