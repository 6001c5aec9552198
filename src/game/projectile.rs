// The pie
//
// One pie exists for the whole session. It is stowed out of play, held in
// the thrower's hand during a throw, or flying on a ballistic arc. Its two
// probes travel with it and only switch on while it flies.

use std::collections::HashSet;

use glam::{Quat, Vec3};

use crate::core::math::rotation_from_hpr;
use crate::engine::physics::{
    CollisionCategory, CollisionWorld, EntityId, ProbeBuilder, ProbeHandle, ProbeResponse,
};

use super::config::ProjectileTuning;

/// Probe that stops on walls and strikes enemies
pub const PIE_SPHERE: &str = "pieSphere";
/// Probe that finds the floor under the pie
pub const PIE_SEGMENT: &str = "pieSeg";

/// Why a flight ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightEnd {
    /// Ran for the full flight duration
    Expired,
    /// Touched the floor or a wall
    TerrainHit,
}

/// Constant-gravity arc from a launch point
#[derive(Debug, Clone)]
pub struct Flight {
    origin: Vec3,
    velocity: Vec3,
    acceleration: Vec3,
    elapsed: f64,
    duration: f64,
    /// Enemies this flight has already damaged
    struck: HashSet<EntityId>,
}

impl Flight {
    pub fn new(origin: Vec3, velocity: Vec3, gravity: f32, duration: f64) -> Self {
        Self {
            origin,
            velocity,
            acceleration: Vec3::new(0.0, 0.0, -gravity),
            elapsed: 0.0,
            duration,
            struck: HashSet::new(),
        }
    }

    /// Position `t` seconds after launch
    pub fn position_at(&self, t: f64) -> Vec3 {
        let t = t as f32;
        self.origin + self.velocity * t + 0.5 * self.acceleration * t * t
    }

    pub fn position(&self) -> Vec3 {
        self.position_at(self.elapsed.min(self.duration))
    }

    /// Move the flight clock forward. Returns false once the full duration
    /// has run.
    pub fn advance(&mut self, dt: f64) -> bool {
        self.elapsed += dt;
        !self.is_complete()
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed + 1e-9 >= self.duration
    }

    /// Record a strike on `enemy`. True the first time per flight.
    pub fn strike(&mut self, enemy: EntityId) -> bool {
        self.struck.insert(enemy)
    }
}

#[cfg(test)]
impl Flight {
    pub fn velocity(&self) -> Vec3 {
        self.velocity + self.acceleration * self.elapsed.min(self.duration) as f32
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }
}

#[derive(Debug, Clone)]
pub enum ProjectileState {
    Stowed,
    Held,
    InFlight(Flight),
}

#[derive(Debug)]
pub struct Projectile {
    id: EntityId,
    tuning: ProjectileTuning,
    state: ProjectileState,
    position: Vec3,
    /// Visual orientation of the pie model; the probes never rotate
    orientation: Quat,
    scale: f32,
    sphere: ProbeHandle,
    segment: ProbeHandle,
}

impl Projectile {
    /// Create the pie and register its probes, switched off
    pub fn new(id: EntityId, tuning: ProjectileTuning, collisions: &mut CollisionWorld) -> Self {
        let sphere = collisions.add_probe(
            ProbeBuilder::sphere(PIE_SPHERE, Vec3::ZERO, tuning.sphere_radius)
                .detects(&[
                    CollisionCategory::Wall,
                    CollisionCategory::EnemyHead,
                    CollisionCategory::EnemyTorso,
                    CollisionCategory::EnemyLegs,
                ])
                .response(ProbeResponse::Event)
                .inactive()
                .build(id),
        );
        let segment = collisions.add_probe(
            ProbeBuilder::segment(
                PIE_SEGMENT,
                Vec3::new(0.0, 0.0, tuning.segment_half),
                Vec3::new(0.0, 0.0, -tuning.segment_half),
            )
            .detects(&[CollisionCategory::Floor])
            .response(ProbeResponse::Event)
            .inactive()
            .build(id),
        );

        let mut projectile = Self {
            id,
            tuning,
            state: ProjectileState::Stowed,
            position: tuning.stow_position,
            orientation: Quat::IDENTITY,
            scale: 1.0,
            sphere,
            segment,
        };
        projectile.sync(collisions);
        projectile
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn state(&self) -> &ProjectileState {
        &self.state
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.state, ProjectileState::InFlight(_))
    }

    pub fn is_held(&self) -> bool {
        matches!(self.state, ProjectileState::Held)
    }

    /// Put the pie in the thrower's hand at full size. A flying pie stays
    /// in the air; returns false in that case.
    pub fn attach_to_hand(&mut self, hand: Vec3, collisions: &mut CollisionWorld) -> bool {
        if self.is_in_flight() {
            return false;
        }
        self.state = ProjectileState::Held;
        self.orientation = Quat::IDENTITY;
        self.scale = 1.0;
        self.position = hand;
        self.set_probes_active(false, collisions);
        self.sync(collisions);
        true
    }

    /// Keep a held pie in the hand as the thrower moves
    pub fn follow_hand(&mut self, hand: Vec3, scale: f32, collisions: &mut CollisionWorld) {
        if self.is_held() {
            self.position = hand;
            self.scale = scale;
            self.sync(collisions);
        }
    }

    /// Hand a held pie over to ballistic flight. `thrower_heading` is the
    /// thrower's world heading in degrees. Returns false if nothing is held.
    pub fn launch(&mut self, thrower_heading: f32, collisions: &mut CollisionWorld) -> bool {
        if !self.is_held() {
            return false;
        }

        self.orientation = rotation_from_hpr(
            thrower_heading + self.tuning.heading_bias,
            self.tuning.pitch_bias,
            self.tuning.roll_bias,
        );
        let velocity = self.orientation * Vec3::new(0.0, 0.0, self.tuning.launch_speed);
        let flight = Flight::new(
            self.position,
            velocity,
            self.tuning.gravity,
            self.tuning.flight_duration,
        );

        log::info!(
            "Pie launched from {:.1?} with velocity {:.1?}",
            self.position,
            velocity
        );

        self.state = ProjectileState::InFlight(flight);
        self.scale = 1.0;
        self.set_probes_active(true, collisions);
        self.sync(collisions);
        true
    }

    /// Move a flying pie one tick along its arc. Returns `Expired` on the
    /// tick the flight runs out; the pie is stowed by then.
    pub fn advance(&mut self, dt: f64, collisions: &mut CollisionWorld) -> Option<FlightEnd> {
        let ProjectileState::InFlight(flight) = &mut self.state else {
            return None;
        };
        let flying = flight.advance(dt);
        self.position = flight.position();

        if flying {
            self.sync(collisions);
            None
        } else {
            self.stow(collisions);
            Some(FlightEnd::Expired)
        }
    }

    /// Record a strike on `enemy` for the current flight. False when not in
    /// flight or the enemy was already struck by it.
    pub fn strike(&mut self, enemy: EntityId) -> bool {
        match &mut self.state {
            ProjectileState::InFlight(flight) => flight.strike(enemy),
            _ => false,
        }
    }

    /// End a flight on contact with terrain. `None` if the pie was not
    /// flying.
    pub fn end_flight(&mut self, collisions: &mut CollisionWorld) -> Option<FlightEnd> {
        if !self.is_in_flight() {
            return None;
        }
        self.stow(collisions);
        Some(FlightEnd::TerrainHit)
    }

    /// Take the pie out of play
    pub fn stow(&mut self, collisions: &mut CollisionWorld) {
        self.state = ProjectileState::Stowed;
        self.position = self.tuning.stow_position;
        self.orientation = Quat::IDENTITY;
        self.scale = 1.0;
        self.set_probes_active(false, collisions);
        self.sync(collisions);
    }

    fn set_probes_active(&self, active: bool, collisions: &mut CollisionWorld) {
        collisions.set_probe_active(self.sphere, active);
        collisions.set_probe_active(self.segment, active);
    }

    fn sync(&self, collisions: &mut CollisionWorld) {
        log::trace!(
            "Pie {} at {:.1?} facing {:.2?} x{:.2}",
            self.id,
            self.position,
            self.orientation,
            self.scale
        );
        collisions.set_owner_transform(self.id, self.position, Quat::IDENTITY);
    }
}

#[cfg(test)]
impl Projectile {
    pub fn flight(&self) -> Option<&Flight> {
        match &self.state {
            ProjectileState::InFlight(flight) => Some(flight),
            _ => None,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }
}
