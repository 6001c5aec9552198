// Enemy spawning: archetype selection, placement and body colliders

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rapier3d::prelude::{Isometry, SharedShape};

use crate::core::math::heading_towards;
use crate::engine::physics::{CollisionCategory, CollisionWorld, EntityId};
use crate::game::characters::animation::ActorAnimation;
use crate::game::characters::{Character, Transform};
use crate::game::config::{EnemyTuning, SpawnTuning};

use super::archetype::{archetype, EnemyArchetype, ARCHETYPE_COUNT};
use super::health::HealthIndicator;
use super::state::{Enemy, EnemyEffect};
use super::SpawnError;

/// Attempts at finding a spawn point far enough from the player
const PLACEMENT_ATTEMPTS: usize = 16;

pub struct Spawner {
    rng: StdRng,
    tuning: SpawnTuning,
}

impl Spawner {
    pub fn new(tuning: SpawnTuning) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            tuning,
        }
    }

    /// Deterministic spawner for tests and replays
    pub fn seeded(tuning: SpawnTuning, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            tuning,
        }
    }

    /// Uniform draw over every archetype index
    pub fn pick_index(&mut self) -> usize {
        self.rng.gen_range(0..ARCHETYPE_COUNT)
    }

    /// Random ground point within the spawn radius of `center`, preferring
    /// points at least the minimum distance from `player`
    pub fn pick_location(&mut self, center: Vec3, player: Vec3) -> Vec3 {
        let radius = self.tuning.spawn_radius.max(0.0);
        let mut candidate = center;

        for _ in 0..PLACEMENT_ATTEMPTS {
            let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
            let distance = radius * self.rng.gen::<f32>().sqrt();
            candidate = center + Vec3::new(angle.cos(), angle.sin(), 0.0) * distance;
            if candidate.truncate().distance(player.truncate()) >= self.tuning.min_player_distance {
                return candidate;
            }
        }

        // Crowded arena: use the point opposite the player
        let away = (center - player).truncate().try_normalize();
        match away {
            Some(dir) => center + dir.extend(0.0) * radius,
            None => candidate,
        }
    }

    /// Number of enemies to spawn so `alive` reaches the configured count
    pub fn deficit(&self, alive: usize) -> usize {
        self.tuning.enemy_count.saturating_sub(alive)
    }

    /// Build enemy `index` at `position`, facing `face`, register its body
    /// colliders and start its entrance. Fails without touching the world
    /// when the index is out of range.
    #[allow(clippy::too_many_arguments)]
    pub fn spawn(
        &mut self,
        index: usize,
        id: EntityId,
        position: Vec3,
        face: Vec3,
        tuning: EnemyTuning,
        actor: Box<dyn ActorAnimation>,
        indicator: Box<dyn HealthIndicator>,
        collisions: &mut CollisionWorld,
    ) -> Result<(Enemy, Vec<EnemyEffect>), SpawnError> {
        let archetype = archetype(index)?;
        let heading = heading_towards(position, face).unwrap_or(0.0);
        let transform = Transform::new(position, heading);

        collisions.set_owner_transform(id, transform.position, transform.rotation());
        add_body_colliders(collisions, id, archetype, tuning.body_radius);

        let character = Character::new(id, archetype.name, transform, actor);
        let mut enemy = Enemy::new(character, archetype, indicator, tuning.max_health, tuning);
        let effects = enemy.enter();

        log::info!("Spawned {} ({}) as {}", archetype.name, index, id);
        Ok((enemy, effects))
    }
}

/// Head, torso and legs, sized by the archetype's scale
fn add_body_colliders(
    collisions: &mut CollisionWorld,
    owner: EntityId,
    archetype: &EnemyArchetype,
    radius: f32,
) {
    let s = archetype.scale;
    let parts = [
        (
            "legs",
            CollisionCategory::EnemyLegs,
            SharedShape::capsule_z(0.9 * s, 0.6 * radius * s),
            1.5 * s,
        ),
        (
            "torso",
            CollisionCategory::EnemyTorso,
            SharedShape::capsule_z(0.8 * s, radius * s),
            4.0 * s,
        ),
        (
            "head",
            CollisionCategory::EnemyHead,
            SharedShape::ball(0.8 * radius * s),
            6.2 * s,
        ),
    ];

    for (part, category, shape, height) in parts {
        collisions.add_geometry(
            owner,
            &format!("enemy-{}-{part}", owner.0),
            category,
            shape,
            Isometry::translation(0.0, 0.0, height),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::characters::animation::AnimationPlayer;
    use crate::game::config::{ENEMY, SPAWN};
    use crate::game::enemy::health::NullIndicator;
    use crate::game::enemy::state::EnemyState;

    fn spawn_index(
        spawner: &mut Spawner,
        index: usize,
        collisions: &mut CollisionWorld,
    ) -> Result<(Enemy, Vec<EnemyEffect>), SpawnError> {
        spawner.spawn(
            index,
            EntityId(3),
            Vec3::new(0.0, 30.0, 0.0),
            Vec3::ZERO,
            ENEMY,
            Box::new(AnimationPlayer::suit()),
            Box::new(NullIndicator),
            collisions,
        )
    }

    #[test]
    fn test_pick_index_is_uniform_over_all_archetypes() {
        let mut spawner = Spawner::seeded(SPAWN, 42);
        let mut counts = [0usize; ARCHETYPE_COUNT];
        let draws = 32_000;
        for _ in 0..draws {
            counts[spawner.pick_index()] += 1;
        }

        let expected = draws / ARCHETYPE_COUNT;
        for (index, count) in counts.iter().enumerate() {
            assert!(
                count.abs_diff(expected) < expected / 4,
                "index {index} drawn {count} times"
            );
        }
    }

    #[test]
    fn test_spawn_registers_body_and_enters() {
        let mut spawner = Spawner::seeded(SPAWN, 1);
        let mut collisions = CollisionWorld::new();

        let (enemy, effects) = spawn_index(&mut spawner, 25, &mut collisions).unwrap();
        assert_eq!(enemy.archetype.name, "Flunky");
        assert_eq!(enemy.state(), EnemyState::EntranceDescent);
        assert_eq!(enemy.health().current(), 5);
        assert!(!effects.is_empty());
        assert_eq!(collisions.geometry_count(), 3);
        assert!(collisions.find_geometry("enemy-3-head").is_some());
        // Facing the origin from +Y
        assert!((enemy.transform().heading.abs() - 180.0).abs() < 1e-3);
    }

    #[test]
    fn test_out_of_range_spawn_leaves_world_untouched() {
        let mut spawner = Spawner::seeded(SPAWN, 1);
        let mut collisions = CollisionWorld::new();

        let result = spawn_index(&mut spawner, ARCHETYPE_COUNT, &mut collisions);
        assert_eq!(
            result.err(),
            Some(SpawnError::Configuration { index: 32 })
        );
        assert_eq!(collisions.geometry_count(), 0);
    }

    #[test]
    fn test_locations_keep_away_from_player() {
        let mut spawner = Spawner::seeded(SPAWN, 7);
        for _ in 0..100 {
            let spot = spawner.pick_location(Vec3::ZERO, Vec3::ZERO);
            let distance = spot.truncate().length();
            assert!(distance <= SPAWN.spawn_radius + 1e-3);
            assert!(distance >= SPAWN.min_player_distance - 1e-3);
            assert_eq!(spot.z, 0.0);
        }
    }

    #[test]
    fn test_deficit() {
        let spawner = Spawner::new(SPAWN);
        assert_eq!(spawner.deficit(0), SPAWN.enemy_count);
        assert_eq!(spawner.deficit(SPAWN.enemy_count + 2), 0);
    }
}
