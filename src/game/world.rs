// Game world and the per-tick simulation
//
// `WorldContext` owns the shared services (collision world, task scheduler,
// entity ids). `Game` owns the entities and runs one tick in a fixed order:
//
//   1. input edges -> player locomotion and throw
//   2. locomotion step
//   3. due scheduled tasks (throw, pie release and flight, enemies, respawns)
//   4. animation playback and transform sync into the collision world
//   5. collision traversal and floor/wall corrections
//   6. collision dispatch -> game events -> damage and flight termination

use std::collections::BTreeMap;

use glam::Vec3;

use crate::engine::events::EventDispatcher;
use crate::engine::input::GameInput;
use crate::engine::physics::{
    CollisionCategory, CollisionEvent, CollisionPattern, CollisionWorld, EntityId,
};
use crate::engine::scheduler::{Scheduler, TaskStatus};

use super::characters::animation::{ActorAnimation, AnimationPlayer};
use super::characters::player::Player;
use super::characters::throw::ThrowProgress;
use super::characters::{InputOutcome, Transform};
use super::config::GameConfig;
use super::enemy::health::NullIndicator;
use super::enemy::state::EnemyTask;
use super::enemy::{Enemy, EnemyArchetype, EnemyEffect, HealthIndicator, SpawnError, Spawner};
use super::projectile::{Projectile, PIE_SEGMENT, PIE_SPHERE};
use super::terrain::{Terrain, TerrainBuilder};

/// Owner of all level geometry
pub const TERRAIN_ID: EntityId = EntityId(0);

const THROW_TASK: &str = "throw-sequence";
const RELEASE_TASK: &str = "throw pie";
const FLIGHT_TASK: &str = "pie-flight";
const RESPAWN_TASK: &str = "respawn";

/// Work the scheduler runs on the game's behalf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameTask {
    /// Advance the throw animation, every tick while throwing
    ThrowStep,
    /// Hand the held pie to flight, once
    ReleasePie,
    /// Move the flying pie, every tick while it flies
    PieFlight,
    Enemy(EntityId, EnemyTask),
    Respawn,
}

/// What collision handlers report back
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// The pie touched floor or wall
    TerrainHit {
        category: CollisionCategory,
        point: Vec3,
    },
    /// The pie touched part of an enemy
    EnemyHit {
        enemy: EntityId,
        part: CollisionCategory,
    },
}

/// Shared services passed to anything that creates or queries entities
pub struct WorldContext {
    pub collisions: CollisionWorld,
    pub tasks: Scheduler<GameTask>,
    next_entity: u32,
}

impl WorldContext {
    pub fn new() -> Self {
        Self {
            collisions: CollisionWorld::new(),
            tasks: Scheduler::new(),
            next_entity: TERRAIN_ID.0 + 1,
        }
    }

    pub fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        id
    }
}

impl Default for WorldContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates the external collaborators each character is driven through
pub trait ActorFactory {
    fn player_actor(&mut self) -> Box<dyn ActorAnimation>;
    fn enemy_actor(&mut self, archetype: &EnemyArchetype) -> Box<dyn ActorAnimation>;
    fn health_indicator(&mut self, enemy: EntityId) -> Box<dyn HealthIndicator>;
}

/// Headless actors: clip timing only, no visible indicator
#[derive(Debug, Default)]
pub struct HeadlessActors;

impl ActorFactory for HeadlessActors {
    fn player_actor(&mut self) -> Box<dyn ActorAnimation> {
        Box::new(AnimationPlayer::toon())
    }

    fn enemy_actor(&mut self, archetype: &EnemyArchetype) -> Box<dyn ActorAnimation> {
        log::debug!("Dressing {archetype}");
        Box::new(AnimationPlayer::suit())
    }

    fn health_indicator(&mut self, _enemy: EntityId) -> Box<dyn HealthIndicator> {
        Box::new(NullIndicator)
    }
}

type CollisionDispatcher = EventDispatcher<CollisionPattern, CollisionEvent, GameEvent>;

pub struct Game {
    config: GameConfig,
    context: WorldContext,
    terrain: Terrain,
    player: Player,
    pie: Projectile,
    enemies: BTreeMap<EntityId, Enemy>,
    spawner: Spawner,
    dispatcher: CollisionDispatcher,
    actors: Box<dyn ActorFactory>,
}

impl Game {
    pub fn with_parts(
        config: GameConfig,
        terrain: TerrainBuilder,
        spawner: Spawner,
        mut actors: Box<dyn ActorFactory>,
    ) -> Self {
        let mut context = WorldContext::new();
        let terrain = terrain.build(&mut context.collisions);

        let player_id = context.allocate_id();
        let player = Player::spawn(
            player_id,
            Transform::new(terrain.player_start, 0.0),
            actors.player_actor(),
            &config,
            &mut context.collisions,
        );

        let pie_id = context.allocate_id();
        let pie = Projectile::new(pie_id, config.projectile, &mut context.collisions);

        Self {
            config,
            context,
            terrain,
            player,
            pie,
            enemies: BTreeMap::new(),
            spawner,
            dispatcher: collision_handlers(),
            actors,
        }
    }

    /// Spawn until the configured number of enemies is alive
    pub fn populate(&mut self) {
        let alive = self.enemies.values().filter(|e| e.state().is_alive()).count();
        for _ in 0..self.spawner.deficit(alive) {
            self.spawn_random();
        }
    }

    /// Spawn a random archetype at a random spot
    pub fn spawn_random(&mut self) -> Option<EntityId> {
        let index = self.spawner.pick_index();
        let position = self
            .spawner
            .pick_location(self.terrain.spawn_center, self.player.transform().position);
        match self.spawn_enemy(index, position) {
            Ok(id) => Some(id),
            Err(err) => {
                log::warn!("Spawn rejected: {err}");
                None
            }
        }
    }

    /// Spawn archetype `index` at `position`, facing the player
    pub fn spawn_enemy(&mut self, index: usize, position: Vec3) -> Result<EntityId, SpawnError> {
        let archetype = super::enemy::archetype(index)?;
        let id = self.context.allocate_id();
        let (enemy, effects) = self.spawner.spawn(
            index,
            id,
            position,
            self.player.transform().position,
            self.config.enemy,
            self.actors.enemy_actor(archetype),
            self.actors.health_indicator(id),
            &mut self.context.collisions,
        )?;
        self.enemies.insert(id, enemy);
        self.apply_enemy_effects(id, effects);
        Ok(id)
    }

    /// Run one fixed simulation step. Returns the game events raised by
    /// collisions during the step.
    pub fn tick(&mut self, inputs: &[GameInput], dt: f32) -> Vec<GameEvent> {
        self.context.tasks.advance(dt as f64);

        for input in inputs {
            self.handle_input(*input);
        }

        self.player.step();

        while let Some(task) = self.context.tasks.pop_due() {
            let status = self.run_task(task.payload, dt);
            self.context.tasks.finish(task, status);
        }

        self.sync(dt);

        let contacts = self.context.collisions.traverse();
        for adjustment in self.context.collisions.resolve(&contacts, dt) {
            if adjustment.owner == self.player.id() {
                self.player.character.transform.position += adjustment.translation;
            }
        }
        self.player.sync(&mut self.context.collisions);

        let events = self
            .dispatcher
            .dispatch_all(contacts.iter().map(|contact| (contact.pattern(), contact)));
        for event in &events {
            self.handle_event(*event);
        }
        events
    }

    /// Route one input edge. A new throw waits until the last pie has
    /// landed or expired.
    fn handle_input(&mut self, input: GameInput) -> InputOutcome {
        if input == GameInput::AttackDown && self.pie.is_in_flight() {
            log::debug!("{input:?} ignored: pie still in flight");
            return InputOutcome::DuplicateEventIgnored;
        }

        let outcome = self.player.handle_input(input);
        if input == GameInput::AttackDown && outcome.is_applied() {
            self.begin_throw();
        }
        outcome
    }

    fn begin_throw(&mut self) {
        let hand = self.player.hand_position();
        self.pie.attach_to_hand(hand, &mut self.context.collisions);
        self.context.tasks.add(THROW_TASK, GameTask::ThrowStep);
        self.context.tasks.do_later(
            self.player.throw.release_delay(),
            RELEASE_TASK,
            GameTask::ReleasePie,
        );
    }

    fn run_task(&mut self, task: GameTask, dt: f32) -> TaskStatus {
        match task {
            GameTask::ThrowStep => {
                let player = &mut self.player;
                match player
                    .throw
                    .advance(dt, &player.locomotion, player.character.actor.as_mut())
                {
                    ThrowProgress::Running => TaskStatus::Continue,
                    ThrowProgress::Finished => TaskStatus::Done,
                }
            }
            GameTask::ReleasePie => {
                if self.player.throw.release()
                    && self
                        .pie
                        .launch(self.player.transform().heading, &mut self.context.collisions)
                {
                    self.context.tasks.add(FLIGHT_TASK, GameTask::PieFlight);
                    log::debug!("Pie released at {:.2}s", self.context.tasks.now());
                }
                TaskStatus::Done
            }
            GameTask::PieFlight => match self.pie.advance(dt as f64, &mut self.context.collisions) {
                None if self.pie.is_in_flight() => TaskStatus::Continue,
                None => TaskStatus::Done,
                Some(end) => {
                    log::info!("Pie flight ended: {end:?}");
                    TaskStatus::Done
                }
            },
            GameTask::Enemy(id, enemy_task) => {
                let target = self.player.transform().position;
                let Some(enemy) = self.enemies.get_mut(&id) else {
                    return TaskStatus::Done;
                };
                let (status, effects) = enemy.run_task(enemy_task, dt as f64, target);
                self.apply_enemy_effects(id, effects);
                status
            }
            GameTask::Respawn => {
                self.populate();
                TaskStatus::Done
            }
        }
    }

    fn apply_enemy_effects(&mut self, id: EntityId, effects: Vec<EnemyEffect>) {
        let tasks = &mut self.context.tasks;
        for effect in effects {
            match effect {
                EnemyEffect::Repeat(task) => {
                    tasks.add(task.task_name(id), GameTask::Enemy(id, task));
                }
                EnemyEffect::After(task, delay) => {
                    tasks.do_later(delay, task.task_name(id), GameTask::Enemy(id, task));
                }
                EnemyEffect::Cancel(task) => {
                    tasks.remove(&task.task_name(id));
                }
                EnemyEffect::CancelAll => {
                    tasks.remove_matching(|task| matches!(task, GameTask::Enemy(owner, _) if *owner == id));
                }
                EnemyEffect::Remove => {
                    tasks.remove_matching(|task| matches!(task, GameTask::Enemy(owner, _) if *owner == id));
                    self.enemies.remove(&id);
                    self.context.collisions.remove_owner(id);
                    log::info!("Enemy {id} removed");
                    // One pending respawn refills every gap
                    if !tasks.has(RESPAWN_TASK) {
                        let delay = self.config.spawn.respawn_delay;
                        tasks.do_later(delay, RESPAWN_TASK, GameTask::Respawn);
                        log::info!("Respawn in {delay}s");
                    }
                }
            }
        }
    }

    /// Advance animation playback and push every transform to the collision
    /// world
    fn sync(&mut self, dt: f32) {
        self.player.character.actor.update(dt);
        self.player.sync(&mut self.context.collisions);

        let hand = self.player.hand_position();
        let scale = self.player.throw.held_scale();
        self.pie.follow_hand(hand, scale, &mut self.context.collisions);

        for enemy in self.enemies.values_mut() {
            enemy.character.actor.update(dt);
            let transform = &enemy.character.transform;
            self.context.collisions.set_owner_transform(
                enemy.character.id,
                transform.position,
                transform.rotation(),
            );
        }
    }

    fn handle_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::TerrainHit { category, point } => {
                if let Some(end) = self.pie.end_flight(&mut self.context.collisions) {
                    self.context.tasks.remove(FLIGHT_TASK);
                    log::info!("Pie flight ended: {end:?} on {} at {point:.1?}", category.tag());
                }
            }
            GameEvent::EnemyHit { enemy, part } => {
                if !self.pie.strike(enemy) {
                    return;
                }
                let damage = self.config.enemy.pie_damage;
                let Some(target) = self.enemies.get_mut(&enemy) else {
                    return;
                };
                log::debug!("Pie struck {} {} on the {}", target.archetype.name, enemy, part.tag());
                let effects = target.damage(damage);
                self.apply_enemy_effects(enemy, effects);
            }
        }
    }
}

#[cfg(test)]
impl Game {
    pub fn context(&self) -> &WorldContext {
        &self.context
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn pie(&self) -> &Projectile {
        &self.pie
    }

    pub fn enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.values()
    }

    pub fn enemy(&self, id: EntityId) -> Option<&Enemy> {
        self.enemies.get(&id)
    }
}

/// Subscribe the pie's collision patterns. Player probes are handled by the
/// collision world's floor and pusher responses and need no handler.
fn collision_handlers() -> CollisionDispatcher {
    let mut dispatcher = CollisionDispatcher::new();

    let terrain_hit = |event: &CollisionEvent| {
        Some(GameEvent::TerrainHit {
            category: event.category,
            point: event.point,
        })
    };
    dispatcher.accept(
        CollisionPattern::new(PIE_SEGMENT, CollisionCategory::Floor),
        terrain_hit,
    );
    dispatcher.accept(
        CollisionPattern::new(PIE_SPHERE, CollisionCategory::Wall),
        terrain_hit,
    );

    for part in CollisionCategory::ENEMY {
        dispatcher.accept(CollisionPattern::new(PIE_SPHERE, part), |event| {
            Some(GameEvent::EnemyHit {
                enemy: event.into,
                part: event.category,
            })
        });
    }

    dispatcher
}
