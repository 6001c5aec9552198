// Attack/throw sequence
//
// A throw plays the torso throw clip once while the held pie shrinks away,
// then hands the torso back to locomotion. Independently the pie release
// fires once after a fixed delay; the caller schedules both halves and
// drives them through `advance` and `release`.

use crate::core::math::{clamp, lerp};
use crate::game::config::ThrowTuning;

use super::animation::{clips, ActorAnimation, PartGroup};
use super::locomotion::{InputOutcome, Locomotion};

/// Where the animated half of a throw is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrowProgress {
    Running,
    Finished,
}

#[derive(Debug, Clone)]
pub struct ThrowSequencer {
    tuning: ThrowTuning,
    is_throwing: bool,
    release_pending: bool,
    legs_attacking: bool,
    elapsed: f32,
    duration: f32,
}

impl ThrowSequencer {
    pub fn new(tuning: ThrowTuning) -> Self {
        Self {
            tuning,
            is_throwing: false,
            release_pending: false,
            legs_attacking: false,
            elapsed: 0.0,
            duration: 0.0,
        }
    }

    /// Seconds from the attack press to the pie release
    pub fn release_delay(&self) -> f64 {
        self.tuning.release_delay
    }

    /// Begin a throw. Ignored while a throw or its release is still running.
    pub fn start(&mut self, locomotion: &Locomotion, actor: &mut dyn ActorAnimation) -> InputOutcome {
        if self.is_throwing || self.release_pending {
            return InputOutcome::DuplicateEventIgnored;
        }

        self.legs_attacking = !locomotion.is_moving() && !locomotion.is_turning();
        if self.legs_attacking {
            actor.loop_clip(clips::ATTACK_LEGS, Some(PartGroup::Legs));
        }

        self.duration = actor.clip_duration(clips::ATTACK_TORSO).unwrap_or(0.0);
        actor.play(clips::ATTACK_TORSO, Some(PartGroup::Torso));

        self.elapsed = 0.0;
        self.is_throwing = true;
        self.release_pending = true;
        InputOutcome::Applied
    }

    /// Scale of the pie in the hand: 1 at the start of the throw, 0 at the end
    pub fn held_scale(&self) -> f32 {
        if !self.is_throwing {
            return 1.0;
        }
        if self.duration <= 0.0 {
            return 0.0;
        }
        lerp(1.0, 0.0, clamp(self.elapsed / self.duration, 0.0, 1.0))
    }

    /// Advance the animated half by one tick. On the tick the clip ends the
    /// torso goes back to whatever locomotion is doing.
    pub fn advance(
        &mut self,
        dt: f32,
        locomotion: &Locomotion,
        actor: &mut dyn ActorAnimation,
    ) -> ThrowProgress {
        if !self.is_throwing {
            return ThrowProgress::Finished;
        }

        self.elapsed += dt;
        if self.elapsed + f32::EPSILON < self.duration {
            return ThrowProgress::Running;
        }

        self.is_throwing = false;
        let resting = locomotion.resting_clip();
        actor.loop_clip(resting, Some(PartGroup::Torso));
        if self.legs_attacking && !locomotion.is_moving() && !locomotion.is_turning() {
            actor.loop_clip(resting, Some(PartGroup::Legs));
        }
        self.legs_attacking = false;
        ThrowProgress::Finished
    }

    /// Consume the pending release. True exactly once per throw.
    pub fn release(&mut self) -> bool {
        std::mem::replace(&mut self.release_pending, false)
    }
}

#[cfg(test)]
impl ThrowSequencer {
    pub fn is_throwing(&self) -> bool {
        self.is_throwing
    }

    /// Seconds the throw clip takes
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn is_release_pending(&self) -> bool {
        self.release_pending
    }
}

impl Default for ThrowSequencer {
    fn default() -> Self {
        Self::new(ThrowTuning::default())
    }
}
