// Gameplay tuning
//
// Every number the simulation depends on lives here as a const preset, so a
// test can build a world with exactly the values it expects.

use glam::Vec3;

/// Player movement, applied once per simulation tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocomotionTuning {
    /// Distance moved along local forward per tick when running forward
    pub forward_speed: f32,
    /// Distance moved along local forward per tick when backing up (negative)
    pub backward_speed: f32,
    /// Degrees turned per tick; right turns negate it
    pub turn_rate: f32,
}

pub const LOCOMOTION: LocomotionTuning = LocomotionTuning {
    forward_speed: 0.6,
    backward_speed: -0.3,
    turn_rate: 0.7,
};

/// The throw sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrowTuning {
    /// Seconds between the attack press and the pie leaving the hand
    pub release_delay: f64,
    /// Offset of the right hand from the thrower's origin, local frame
    pub hand_offset: Vec3,
}

pub const THROW: ThrowTuning = ThrowTuning {
    release_delay: 2.7,
    hand_offset: Vec3::new(-0.6, 0.4, 3.0),
};

/// Pie flight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileTuning {
    /// Launch speed along the pie's local up axis
    pub launch_speed: f32,
    /// Downward acceleration
    pub gravity: f32,
    /// Seconds before a flight ends on its own
    pub flight_duration: f64,
    /// Added to the thrower's heading for the launch orientation
    pub heading_bias: f32,
    pub pitch_bias: f32,
    pub roll_bias: f32,
    /// Radius of the wall/enemy sphere probe
    pub sphere_radius: f32,
    /// Floor segment runs from `+segment_half` to `-segment_half` on local Z
    pub segment_half: f32,
    /// Where the pie waits while nobody holds or throws it
    pub stow_position: Vec3,
}

pub const PROJECTILE: ProjectileTuning = ProjectileTuning {
    launch_speed: 75.0,
    gravity: 32.174,
    flight_duration: 5.0,
    heading_bias: 90.0,
    pitch_bias: 0.0,
    roll_bias: 80.0,
    sphere_radius: 0.75,
    segment_half: 1.0,
    stow_position: Vec3::new(0.0, 0.0, -1_000.0),
};

/// Enemy behaviour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyTuning {
    pub max_health: i32,
    /// Damage dealt by one pie
    pub pie_damage: i32,
    /// Height above the ground an enemy drops in from
    pub spawn_altitude: f32,
    /// Seconds spent dropping to the ground
    pub descent_duration: f64,
    /// Units per second while walking
    pub walk_speed: f32,
    /// Walking enemies hold position once this close to the player
    pub stop_distance: f32,
    /// Healthy blink interval for the critical band, in seconds
    pub blink_interval: f64,
    /// Blink interval once the health ratio drops below `fast_blink_ratio`
    pub fast_blink_interval: f64,
    pub fast_blink_ratio: f32,
    /// Radius of the body part colliders
    pub body_radius: f32,
}

pub const ENEMY: EnemyTuning = EnemyTuning {
    max_health: 5,
    pie_damage: 1,
    spawn_altitude: 40.0,
    descent_duration: 2.0,
    walk_speed: 6.0,
    stop_distance: 5.0,
    blink_interval: 1.0,
    fast_blink_interval: 0.5,
    fast_blink_ratio: 0.025,
    body_radius: 1.2,
};

/// How many enemies the arena keeps alive and where they appear
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnTuning {
    pub enemy_count: usize,
    /// Seconds between a destruction and the replacement spawn
    pub respawn_delay: f64,
    /// Enemies spawn within this distance of the arena centre
    pub spawn_radius: f32,
    /// Minimum spawn distance from the player
    pub min_player_distance: f32,
}

pub const SPAWN: SpawnTuning = SpawnTuning {
    enemy_count: 3,
    respawn_delay: 4.0,
    spawn_radius: 60.0,
    min_player_distance: 20.0,
};

/// Player collision probes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionTuning {
    pub wall_sphere_radius: f32,
    pub wall_sphere_height: f32,
    /// The floor ray starts this far above the feet so it finds steps
    pub floor_ray_height: f32,
    /// Fastest the floor handler lets a character drop, units per second
    pub floor_max_velocity: f32,
}

pub const COLLISION: CollisionTuning = CollisionTuning {
    wall_sphere_radius: 1.0,
    wall_sphere_height: 3.0,
    floor_ray_height: 1.0,
    floor_max_velocity: 40.0,
};

/// All tunables together
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameConfig {
    pub locomotion: LocomotionTuning,
    pub throw: ThrowTuning,
    pub projectile: ProjectileTuning,
    pub enemy: EnemyTuning,
    pub spawn: SpawnTuning,
    pub collision: CollisionTuning,
}

pub const DEFAULT_CONFIG: GameConfig = GameConfig {
    locomotion: LOCOMOTION,
    throw: THROW,
    projectile: PROJECTILE,
    enemy: ENEMY,
    spawn: SPAWN,
    collision: COLLISION,
};

impl Default for GameConfig {
    fn default() -> Self {
        DEFAULT_CONFIG
    }
}

impl Default for LocomotionTuning {
    fn default() -> Self {
        LOCOMOTION
    }
}

impl Default for ThrowTuning {
    fn default() -> Self {
        THROW
    }
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        PROJECTILE
    }
}

impl Default for EnemyTuning {
    fn default() -> Self {
        ENEMY
    }
}

impl Default for SpawnTuning {
    fn default() -> Self {
        SPAWN
    }
}

impl Default for CollisionTuning {
    fn default() -> Self {
        COLLISION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.locomotion.forward_speed, 0.6);
        assert_eq!(config.locomotion.backward_speed, -0.3);
        assert_eq!(config.throw.release_delay, 2.7);
        assert_eq!(config.projectile.launch_speed, 75.0);
        assert_eq!(config.enemy.max_health, 5);
    }

    #[test]
    fn test_fast_blink_is_faster() {
        let enemy = EnemyTuning::default();
        assert!(enemy.fast_blink_interval < enemy.blink_interval);
    }

    #[test]
    fn test_stowed_pie_is_far_below_the_arena() {
        assert!(PROJECTILE.stow_position.z < -100.0);
    }
}
