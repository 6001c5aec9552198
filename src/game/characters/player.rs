// The player character: locomotion, throwing and collision probes

use glam::Vec3;

use crate::engine::input::GameInput;
use crate::engine::physics::{
    CollisionCategory, CollisionWorld, EntityId, ProbeBuilder, ProbeResponse,
};
use crate::game::config::GameConfig;

use super::animation::ActorAnimation;
use super::character::{Character, Transform};
use super::locomotion::{InputOutcome, Locomotion, MoveDirection, TurnDirection};
use super::throw::ThrowSequencer;

pub const PLAYER_SPHERE: &str = "playerSphere";
pub const PLAYER_RAY: &str = "playerRay";

#[derive(Debug)]
pub struct Player {
    pub character: Character,
    pub locomotion: Locomotion,
    pub throw: ThrowSequencer,
    hand_offset: Vec3,
}

impl Player {
    /// Create the player and register its wall and floor probes
    pub fn spawn(
        id: EntityId,
        transform: Transform,
        actor: Box<dyn ActorAnimation>,
        config: &GameConfig,
        collisions: &mut CollisionWorld,
    ) -> Self {
        let tuning = config.collision;
        collisions.add_probe(
            ProbeBuilder::sphere(
                PLAYER_SPHERE,
                Vec3::new(0.0, 0.0, tuning.wall_sphere_height),
                tuning.wall_sphere_radius,
            )
            .detects(&[CollisionCategory::Wall])
            .response(ProbeResponse::Pusher)
            .build(id),
        );
        collisions.add_probe(
            ProbeBuilder::ray(
                PLAYER_RAY,
                Vec3::new(0.0, 0.0, tuning.floor_ray_height),
                -Vec3::Z,
            )
            .detects(&[CollisionCategory::Floor])
            .response(ProbeResponse::Floor {
                max_velocity: tuning.floor_max_velocity,
            })
            .build(id),
        );

        collisions.set_owner_transform(id, transform.position, transform.rotation());

        Self {
            character: Character::new(id, "player", transform, actor),
            locomotion: Locomotion::new(config.locomotion),
            throw: ThrowSequencer::new(config.throw),
            hand_offset: config.throw.hand_offset,
        }
    }

    pub fn id(&self) -> EntityId {
        self.character.id
    }

    pub fn transform(&self) -> &Transform {
        &self.character.transform
    }

    /// Feed one input edge to locomotion or the throw sequence
    pub fn handle_input(&mut self, input: GameInput) -> InputOutcome {
        let actor = self.character.actor.as_mut();
        let outcome = match input {
            GameInput::MoveForwardDown => self.locomotion.move_start(MoveDirection::Forward, actor),
            GameInput::MoveForwardUp => self.locomotion.move_end(MoveDirection::Forward, actor),
            GameInput::MoveBackwardDown => {
                self.locomotion.move_start(MoveDirection::Backward, actor)
            }
            GameInput::MoveBackwardUp => self.locomotion.move_end(MoveDirection::Backward, actor),
            GameInput::TurnLeftDown => self.locomotion.turn_start(TurnDirection::Left, actor),
            GameInput::TurnLeftUp => self.locomotion.turn_end(TurnDirection::Left, actor),
            GameInput::TurnRightDown => self.locomotion.turn_start(TurnDirection::Right, actor),
            GameInput::TurnRightUp => self.locomotion.turn_end(TurnDirection::Right, actor),
            GameInput::AttackDown => self.throw.start(&self.locomotion, actor),
        };

        if !outcome.is_applied() {
            log::debug!("{input:?} ignored: {outcome:?}");
        }
        outcome
    }

    /// Apply one tick of locomotion
    pub fn step(&mut self) {
        self.locomotion.step(&mut self.character.transform);
    }

    /// World position of the throwing hand
    pub fn hand_position(&self) -> Vec3 {
        self.character.transform.to_world(self.hand_offset)
    }

    pub fn sync(&self, collisions: &mut CollisionWorld) {
        let transform = &self.character.transform;
        collisions.set_owner_transform(self.id(), transform.position, transform.rotation());
    }
}
