// Locomotion state machine
//
// Discrete key edges become a movement heading, a turn heading, a speed and a
// turn rate. Movement along local Y and turning are independent axes; each
// change picks the clip the body should be looping.

use crate::game::config::LocomotionTuning;

use super::animation::{clips, ActorAnimation};
use super::character::Transform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnDirection {
    Left,
    Right,
}

/// Result of feeding one edge into the state machine. The ignored variants
/// are normal outcomes, not failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Applied,
    /// Release of a direction that is no longer the active one
    StaleInputIgnored,
    /// Start while already active, or an end with nothing active
    DuplicateEventIgnored,
}

impl InputOutcome {
    pub fn is_applied(self) -> bool {
        self == Self::Applied
    }
}

#[derive(Debug, Clone)]
pub struct Locomotion {
    tuning: LocomotionTuning,
    movement_heading: Option<MoveDirection>,
    turn_heading: Option<TurnDirection>,
    is_moving_in_y: bool,
    is_turning: bool,
    speed: f32,
    turn_speed: f32,
}

impl Locomotion {
    pub fn new(tuning: LocomotionTuning) -> Self {
        Self {
            tuning,
            movement_heading: None,
            turn_heading: None,
            is_moving_in_y: false,
            is_turning: false,
            speed: tuning.forward_speed,
            turn_speed: 0.0,
        }
    }

    pub fn is_moving(&self) -> bool {
        self.is_moving_in_y
    }

    pub fn is_turning(&self) -> bool {
        self.is_turning
    }

    /// Direction of the current (or most recent) Y movement
    pub fn move_start(
        &mut self,
        direction: MoveDirection,
        actor: &mut dyn ActorAnimation,
    ) -> InputOutcome {
        if self.is_moving_in_y {
            return InputOutcome::DuplicateEventIgnored;
        }
        self.movement_heading = Some(direction);

        match direction {
            MoveDirection::Forward => {
                self.speed = self.tuning.forward_speed;
                actor.set_play_rate(clips::RUN, 1.0);
                actor.loop_clip(clips::RUN, None);
            }
            MoveDirection::Backward => {
                self.speed = self.tuning.backward_speed;
                actor.set_play_rate(clips::WALK, -1.0);
                actor.loop_clip(clips::WALK, None);
            }
        }

        self.is_moving_in_y = true;
        InputOutcome::Applied
    }

    pub fn move_end(
        &mut self,
        direction: MoveDirection,
        actor: &mut dyn ActorAnimation,
    ) -> InputOutcome {
        if !self.is_moving_in_y {
            return InputOutcome::DuplicateEventIgnored;
        }
        if self.movement_heading != Some(direction) {
            return InputOutcome::StaleInputIgnored;
        }

        self.speed = self.tuning.forward_speed;
        if self.is_turning {
            actor.set_play_rate(clips::WALK, 1.0);
            actor.loop_clip(clips::WALK, None);
        } else {
            actor.loop_clip(clips::NEUTRAL, None);
        }

        self.is_moving_in_y = false;
        InputOutcome::Applied
    }

    pub fn turn_start(
        &mut self,
        direction: TurnDirection,
        actor: &mut dyn ActorAnimation,
    ) -> InputOutcome {
        if self.is_turning {
            return InputOutcome::DuplicateEventIgnored;
        }
        self.turn_heading = Some(direction);

        if self.is_moving_in_y {
            // Backing up keeps the reversed walk
            if self.speed < 0.0 {
                actor.set_play_rate(clips::WALK, -1.0);
            }
        } else {
            actor.set_play_rate(clips::WALK, 1.0);
            actor.loop_clip(clips::WALK, None);
        }

        self.turn_speed = match direction {
            TurnDirection::Right => -self.tuning.turn_rate,
            TurnDirection::Left => self.tuning.turn_rate,
        };

        self.is_turning = true;
        InputOutcome::Applied
    }

    pub fn turn_end(
        &mut self,
        direction: TurnDirection,
        actor: &mut dyn ActorAnimation,
    ) -> InputOutcome {
        if !self.is_turning {
            return InputOutcome::DuplicateEventIgnored;
        }
        if self.turn_heading != Some(direction) {
            return InputOutcome::StaleInputIgnored;
        }

        if !self.is_moving_in_y {
            actor.loop_clip(clips::NEUTRAL, None);
        }

        self.is_turning = false;
        InputOutcome::Applied
    }

    /// Torso clip matching the current movement, used after a throw
    pub fn resting_clip(&self) -> &'static str {
        if self.is_moving_in_y && self.speed > 0.0 {
            clips::RUN
        } else if self.is_moving_in_y || self.is_turning {
            clips::WALK
        } else {
            clips::NEUTRAL
        }
    }

    /// Apply one tick of movement
    pub fn step(&self, transform: &mut Transform) {
        if self.is_moving_in_y {
            transform.advance(self.speed);
        }
        if self.is_turning {
            transform.turn(self.turn_speed);
        }
    }
}

impl Default for Locomotion {
    fn default() -> Self {
        Self::new(LocomotionTuning::default())
    }
}

#[cfg(test)]
impl Locomotion {
    pub fn movement_heading(&self) -> Option<MoveDirection> {
        self.movement_heading
    }

    pub fn turn_heading(&self) -> Option<TurnDirection> {
        self.turn_heading
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn turn_speed(&self) -> f32 {
        self.turn_speed
    }
}
