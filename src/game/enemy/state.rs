// Enemy lifecycle state machine
//
// Spawning -> EntranceDescent -> Landing -> Walking <-> Hit -> Destroyed
//
// Enemies never touch the scheduler themselves. Every transition returns the
// task changes it needs as `EnemyEffect`s, and the world applies them in
// order.

use glam::Vec3;

use crate::core::math::{heading_towards, lerp};
use crate::engine::physics::EntityId;
use crate::engine::scheduler::TaskStatus;
use crate::game::characters::animation::clips;
use crate::game::characters::Character;
use crate::game::config::EnemyTuning;

use super::archetype::EnemyArchetype;
use super::health::{HealthBand, HealthIndicator, HealthMeter};

/// Used when an actor cannot report a clip's length
const FALLBACK_CLIP_SECS: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyState {
    Spawning,
    EntranceDescent,
    Landing,
    Walking,
    Hit,
    Destroyed,
}

impl EnemyState {
    pub fn is_alive(&self) -> bool {
        !matches!(self, Self::Destroyed)
    }

    /// States in which a pie can do damage
    pub fn can_take_damage(&self) -> bool {
        matches!(
            self,
            Self::EntranceDescent | Self::Landing | Self::Walking | Self::Hit
        )
    }
}

/// Timed work an enemy asks the scheduler to run for it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyTask {
    /// Every tick while dropping in
    Descend,
    /// Once, when the landing clip ends
    FinishLanding,
    /// Every tick while walking
    Walk,
    /// Once, when the hit reaction ends
    Recover,
    /// Repeating while health is critical
    Blink,
    /// Once, when the destruction clip ends
    Remove,
}

impl EnemyTask {
    pub fn name(self) -> &'static str {
        match self {
            Self::Descend => "descend",
            Self::FinishLanding => "land",
            Self::Walk => "walk",
            Self::Recover => "recover",
            Self::Blink => "blink",
            Self::Remove => "remove",
        }
    }

    /// Scheduler task name, unique per enemy
    pub fn task_name(self, enemy: EntityId) -> String {
        format!("enemy-{}-{}", enemy.0, self.name())
    }
}

/// Scheduler change requested by a transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnemyEffect {
    /// Run `task` every tick
    Repeat(EnemyTask),
    /// Run `task` once after `delay` seconds
    After(EnemyTask, f64),
    Cancel(EnemyTask),
    /// Cancel every task this enemy owns
    CancelAll,
    /// Take the enemy out of the world
    Remove,
}

pub struct Enemy {
    pub character: Character,
    pub archetype: &'static EnemyArchetype,
    indicator: Box<dyn HealthIndicator>,
    health: HealthMeter,
    state: EnemyState,
    tuning: EnemyTuning,
    ground_z: f32,
    descent_elapsed: f64,
}

impl Enemy {
    /// A new enemy standing at `ground`, not yet dropped in
    pub fn new(
        character: Character,
        archetype: &'static EnemyArchetype,
        indicator: Box<dyn HealthIndicator>,
        max_health: i32,
        tuning: EnemyTuning,
    ) -> Self {
        let ground_z = character.transform.position.z;
        Self {
            character,
            archetype,
            indicator,
            health: HealthMeter::new(max_health),
            state: EnemyState::Spawning,
            tuning,
            ground_z,
            descent_elapsed: 0.0,
        }
    }

    pub fn id(&self) -> EntityId {
        self.character.id
    }

    pub fn state(&self) -> EnemyState {
        self.state
    }

    /// Start the drop from spawn altitude
    pub fn enter(&mut self) -> Vec<EnemyEffect> {
        if self.state != EnemyState::Spawning {
            return Vec::new();
        }
        self.state = EnemyState::EntranceDescent;
        self.descent_elapsed = 0.0;
        self.character.transform.position.z = self.ground_z + self.tuning.spawn_altitude;
        self.character.actor.pose(clips::LANDING, 0);
        self.health.refresh(self.indicator.as_mut());
        self.indicator.show_indicator();

        log::info!(
            "{} {} dropping in at {:.1?}",
            self.archetype.name,
            self.id(),
            self.character.transform.position
        );
        vec![EnemyEffect::Repeat(EnemyTask::Descend)]
    }

    /// Run one of this enemy's scheduled tasks. `target` is where the
    /// player currently stands.
    pub fn run_task(
        &mut self,
        task: EnemyTask,
        dt: f64,
        target: Vec3,
    ) -> (TaskStatus, Vec<EnemyEffect>) {
        match task {
            EnemyTask::Descend => self.descend(dt),
            EnemyTask::FinishLanding => (TaskStatus::Done, self.finish_landing()),
            EnemyTask::Walk => (self.walk(dt, target), Vec::new()),
            EnemyTask::Recover => (TaskStatus::Done, self.recover()),
            EnemyTask::Blink => (self.blink(), Vec::new()),
            EnemyTask::Remove => (TaskStatus::Done, vec![EnemyEffect::Remove]),
        }
    }

    fn descend(&mut self, dt: f64) -> (TaskStatus, Vec<EnemyEffect>) {
        if self.state != EnemyState::EntranceDescent {
            return (TaskStatus::Done, Vec::new());
        }

        self.descent_elapsed += dt;
        let t = if self.tuning.descent_duration > 0.0 {
            (self.descent_elapsed / self.tuning.descent_duration).min(1.0) as f32
        } else {
            1.0
        };
        self.character.transform.position.z =
            lerp(self.ground_z + self.tuning.spawn_altitude, self.ground_z, t);

        if t < 1.0 {
            return (TaskStatus::Continue, Vec::new());
        }

        self.state = EnemyState::Landing;
        self.character.actor.play(clips::LANDING, None);
        let delay = self.clip_secs(clips::LANDING);
        (
            TaskStatus::Done,
            vec![EnemyEffect::After(EnemyTask::FinishLanding, delay)],
        )
    }

    fn finish_landing(&mut self) -> Vec<EnemyEffect> {
        if self.state != EnemyState::Landing {
            return Vec::new();
        }
        self.start_walking()
    }

    fn start_walking(&mut self) -> Vec<EnemyEffect> {
        self.state = EnemyState::Walking;
        self.character.actor.loop_clip(clips::WALK, None);
        vec![EnemyEffect::Repeat(EnemyTask::Walk)]
    }

    fn walk(&mut self, dt: f64, target: Vec3) -> TaskStatus {
        if self.state != EnemyState::Walking {
            return TaskStatus::Done;
        }

        let transform = &mut self.character.transform;
        if let Some(heading) = heading_towards(transform.position, target) {
            transform.heading = heading;
        }

        let offset = target - transform.position;
        let distance = Vec3::new(offset.x, offset.y, 0.0).length();
        if distance > self.tuning.stop_distance {
            let step = (self.tuning.walk_speed * dt as f32).min(distance - self.tuning.stop_distance);
            transform.advance(step);
            self.character.actor.loop_clip(clips::WALK, None);
        } else {
            self.character.actor.loop_clip(clips::FINGER_WAG, None);
        }
        TaskStatus::Continue
    }

    fn recover(&mut self) -> Vec<EnemyEffect> {
        if self.state != EnemyState::Hit {
            return Vec::new();
        }
        if self.health.is_depleted() {
            return self.destroy();
        }
        self.start_walking()
    }

    fn blink(&mut self) -> TaskStatus {
        if !self.state.is_alive() {
            return TaskStatus::Done;
        }
        match self.health.blink_interval(
            self.tuning.blink_interval,
            self.tuning.fast_blink_interval,
            self.tuning.fast_blink_ratio,
        ) {
            Some(interval) => {
                self.health.toggle_blink(self.indicator.as_mut());
                TaskStatus::Again(interval)
            }
            None => {
                self.health.refresh(self.indicator.as_mut());
                TaskStatus::Done
            }
        }
    }

    /// Take damage. Any live state moves to `Hit`; the follow-up decides
    /// between walking again and destruction.
    pub fn damage(&mut self, amount: i32) -> Vec<EnemyEffect> {
        if !self.state.can_take_damage() {
            log::debug!("{} {} ignores damage in {:?}", self.archetype.name, self.id(), self.state);
            return Vec::new();
        }

        let band = self.health.damage(amount);
        log::debug!(
            "{} {} hit for {amount}: {}/{} ({band:?})",
            self.archetype.name,
            self.id(),
            self.health.current(),
            self.health.max()
        );

        let mut effects = vec![
            EnemyEffect::Cancel(EnemyTask::Descend),
            EnemyEffect::Cancel(EnemyTask::FinishLanding),
            EnemyEffect::Cancel(EnemyTask::Walk),
            EnemyEffect::Cancel(EnemyTask::Recover),
        ];

        // Hit in mid-air: finish the drop at once
        self.character.transform.position.z = self.ground_z;

        if band != HealthBand::Depleted {
            self.health.refresh(self.indicator.as_mut());
            if let Some(interval) = self.health.blink_interval(
                self.tuning.blink_interval,
                self.tuning.fast_blink_interval,
                self.tuning.fast_blink_ratio,
            ) {
                effects.push(EnemyEffect::Cancel(EnemyTask::Blink));
                effects.push(EnemyEffect::After(EnemyTask::Blink, interval));
            }
        }

        self.state = EnemyState::Hit;
        self.character.actor.play(clips::HIT_REACT, None);
        effects.push(EnemyEffect::After(
            EnemyTask::Recover,
            self.clip_secs(clips::HIT_REACT),
        ));
        effects
    }

    fn destroy(&mut self) -> Vec<EnemyEffect> {
        self.state = EnemyState::Destroyed;
        self.indicator.hide_indicator();
        self.character.actor.play(clips::LOSE, None);
        log::info!("{} {} destroyed", self.archetype.name, self.id());

        vec![
            EnemyEffect::CancelAll,
            EnemyEffect::After(EnemyTask::Remove, self.clip_secs(clips::LOSE)),
        ]
    }

    fn clip_secs(&self, clip: &str) -> f64 {
        self.character
            .actor
            .clip_duration(clip)
            .unwrap_or(FALLBACK_CLIP_SECS) as f64
    }
}

impl std::fmt::Debug for Enemy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enemy")
            .field("id", &self.id())
            .field("archetype", &self.archetype.name)
            .field("state", &self.state)
            .field("health", &self.health.current())
            .finish()
    }
}

#[cfg(test)]
impl Enemy {
    pub fn health(&self) -> &HealthMeter {
        &self.health
    }

    pub fn transform(&self) -> &crate::game::characters::Transform {
        &self.character.transform
    }
}
