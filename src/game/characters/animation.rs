// Character animation
//
// Skinned actors are driven through `ActorAnimation`: named clips played on
// the torso and legs part groups. `AnimationPlayer` is the in-process
// implementation that tracks clip time; a renderer would read its state.

use std::collections::HashMap;

/// Clip names shared by the player and enemy clip sets
pub mod clips {
    pub const NEUTRAL: &str = "neutral";
    pub const RUN: &str = "run";
    pub const WALK: &str = "walk";
    pub const ATTACK_TORSO: &str = "attackTorso";
    pub const ATTACK_LEGS: &str = "attackLegs";
    pub const FINGER_WAG: &str = "finger-wag";
    pub const LANDING: &str = "landing";
    pub const HIT_REACT: &str = "pie-small-react";
    pub const LOSE: &str = "lose";
}

/// Independently animated part of a skeleton
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartGroup {
    Torso,
    Legs,
}

impl PartGroup {
    pub const ALL: [PartGroup; 2] = [PartGroup::Torso, PartGroup::Legs];

    pub fn name(self) -> &'static str {
        match self {
            Self::Torso => "torso",
            Self::Legs => "legs",
        }
    }
}

/// How a clip should play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    Looping,
    /// Play once and hold the last frame
    OneShot,
    /// Freeze on one frame
    Pose { frame: usize },
}

/// A request to start a clip. `group: None` targets every part group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationIntent {
    pub clip: &'static str,
    pub mode: PlayMode,
    pub group: Option<PartGroup>,
}

impl AnimationIntent {
    pub fn targets(&self, group: PartGroup) -> bool {
        self.group.map_or(true, |g| g == group)
    }
}

/// Named-clip playback on a skeletal actor
pub trait ActorAnimation {
    fn apply(&mut self, intent: AnimationIntent);

    /// Playback rate for a clip wherever it plays; negative runs it backwards
    fn set_play_rate(&mut self, clip: &'static str, rate: f32);

    /// Length of one pass through a clip, in seconds
    fn clip_duration(&self, clip: &str) -> Option<f32>;

    /// Advance playback by `dt` seconds
    fn update(&mut self, _dt: f32) {}

    fn loop_clip(&mut self, clip: &'static str, group: Option<PartGroup>) {
        self.apply(AnimationIntent {
            clip,
            mode: PlayMode::Looping,
            group,
        });
    }

    fn play(&mut self, clip: &'static str, group: Option<PartGroup>) {
        self.apply(AnimationIntent {
            clip,
            mode: PlayMode::OneShot,
            group,
        });
    }

    fn pose(&mut self, clip: &'static str, frame: usize) {
        self.apply(AnimationIntent {
            clip,
            mode: PlayMode::Pose { frame },
            group: None,
        });
    }
}

/// A single animation clip
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: &'static str,
    /// Number of frames in the animation
    pub frame_count: usize,
    /// Duration of each frame in seconds
    pub frame_duration: f32,
}

impl AnimationClip {
    pub fn new(name: &'static str, frame_count: usize, fps: f32) -> Self {
        Self {
            name,
            frame_count: frame_count.max(1),
            frame_duration: 1.0 / fps,
        }
    }

    /// Get the total duration of one animation cycle
    pub fn total_duration(&self) -> f32 {
        self.frame_count as f32 * self.frame_duration
    }

    fn last_frame(&self) -> usize {
        self.frame_count - 1
    }
}

/// Playback state of one part group
#[derive(Debug, Clone, Default)]
struct Track {
    clip: Option<&'static str>,
    mode: Option<PlayMode>,
    frame: usize,
    frame_timer: f32,
    playing: bool,
}

/// Tracks clip playback for every part group of one actor
#[derive(Debug, Default)]
pub struct AnimationPlayer {
    clips: HashMap<&'static str, AnimationClip>,
    tracks: HashMap<PartGroup, Track>,
    play_rates: HashMap<&'static str, f32>,
}

impl AnimationPlayer {
    pub fn new() -> Self {
        let mut tracks = HashMap::new();
        for group in PartGroup::ALL {
            tracks.insert(group, Track::default());
        }
        Self {
            clips: HashMap::new(),
            tracks,
            play_rates: HashMap::new(),
        }
    }

    /// The player character: separate torso and legs clip sets sharing names
    pub fn toon() -> Self {
        let mut player = Self::new();
        player.add_clip(AnimationClip::new(clips::NEUTRAL, 48, 24.0));
        player.add_clip(AnimationClip::new(clips::RUN, 17, 24.0));
        player.add_clip(AnimationClip::new(clips::WALK, 25, 24.0));
        player.add_clip(AnimationClip::new(clips::ATTACK_TORSO, 66, 24.0));
        player.add_clip(AnimationClip::new(clips::ATTACK_LEGS, 66, 24.0));
        player.loop_clip(clips::NEUTRAL, None);
        player
    }

    /// Enemy suits share one clip set across all three body types
    pub fn suit() -> Self {
        let mut player = Self::new();
        player.add_clip(AnimationClip::new(clips::NEUTRAL, 72, 24.0));
        player.add_clip(AnimationClip::new(clips::WALK, 24, 24.0));
        player.add_clip(AnimationClip::new(clips::FINGER_WAG, 48, 24.0));
        player.add_clip(AnimationClip::new(clips::LANDING, 60, 24.0));
        player.add_clip(AnimationClip::new(clips::HIT_REACT, 36, 24.0));
        player.add_clip(AnimationClip::new(clips::LOSE, 96, 24.0));
        player.loop_clip(clips::NEUTRAL, None);
        player
    }

    pub fn add_clip(&mut self, clip: AnimationClip) {
        self.clips.insert(clip.name, clip);
    }

    pub fn play_rate(&self, clip: &str) -> f32 {
        self.play_rates.get(clip).copied().unwrap_or(1.0)
    }
}

#[cfg(test)]
impl AnimationPlayer {
    pub fn current_clip(&self, group: PartGroup) -> Option<&'static str> {
        self.tracks.get(&group).and_then(|track| track.clip)
    }

    pub fn current_mode(&self, group: PartGroup) -> Option<PlayMode> {
        self.tracks.get(&group).and_then(|track| track.mode)
    }

    pub fn current_frame(&self, group: PartGroup) -> usize {
        self.tracks.get(&group).map_or(0, |track| track.frame)
    }

    pub fn is_playing(&self, group: PartGroup) -> bool {
        self.tracks.get(&group).is_some_and(|track| track.playing)
    }
}

impl ActorAnimation for AnimationPlayer {
    fn apply(&mut self, intent: AnimationIntent) {
        let Some(clip) = self.clips.get(intent.clip) else {
            log::debug!("Ignoring unknown clip '{}'", intent.clip);
            return;
        };
        let reversed = self.play_rate(intent.clip) < 0.0;

        let (frame, playing) = match intent.mode {
            PlayMode::Pose { frame } => (frame.min(clip.last_frame()), false),
            _ if reversed => (clip.last_frame(), true),
            _ => (0, true),
        };

        for (group, track) in self.tracks.iter_mut() {
            if !intent.targets(*group) {
                continue;
            }
            // Looping a clip that already loops keeps its phase
            if intent.mode == PlayMode::Looping
                && track.clip == Some(intent.clip)
                && track.mode == Some(PlayMode::Looping)
            {
                continue;
            }
            *track = Track {
                clip: Some(intent.clip),
                mode: Some(intent.mode),
                frame,
                frame_timer: 0.0,
                playing,
            };
        }
    }

    fn set_play_rate(&mut self, clip: &'static str, rate: f32) {
        self.play_rates.insert(clip, rate);
    }

    fn clip_duration(&self, clip: &str) -> Option<f32> {
        self.clips.get(clip).map(AnimationClip::total_duration)
    }

    fn update(&mut self, dt: f32) {
        for track in self.tracks.values_mut() {
            if !track.playing {
                continue;
            }
            let Some(name) = track.clip else {
                continue;
            };
            let Some(clip) = self.clips.get(name) else {
                continue;
            };
            let rate = self.play_rates.get(name).copied().unwrap_or(1.0);
            let looping = track.mode == Some(PlayMode::Looping);

            track.frame_timer += dt * rate.abs();

            while track.playing && track.frame_timer >= clip.frame_duration {
                track.frame_timer -= clip.frame_duration;

                if rate >= 0.0 {
                    if track.frame < clip.last_frame() {
                        track.frame += 1;
                    } else if looping {
                        track.frame = 0;
                    } else {
                        track.playing = false;
                    }
                } else if track.frame > 0 {
                    track.frame -= 1;
                } else if looping {
                    track.frame = clip.last_frame();
                } else {
                    track.playing = false;
                }
            }
        }
    }
}

/// Test double that records every request
#[cfg(test)]
pub mod recording {
    use super::*;

    #[derive(Debug, Default)]
    pub struct RecordingActor {
        pub intents: Vec<AnimationIntent>,
        pub rates: Vec<(&'static str, f32)>,
        pub durations: HashMap<&'static str, f32>,
    }

    impl RecordingActor {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_duration(mut self, clip: &'static str, seconds: f32) -> Self {
            self.durations.insert(clip, seconds);
            self
        }

        /// Most recent intent that reached `group`
        pub fn last_on(&self, group: PartGroup) -> Option<AnimationIntent> {
            self.intents.iter().rev().find(|i| i.targets(group)).copied()
        }

        pub fn last_rate(&self, clip: &str) -> Option<f32> {
            self.rates
                .iter()
                .rev()
                .find(|(name, _)| *name == clip)
                .map(|(_, rate)| *rate)
        }

        pub fn clear(&mut self) {
            self.intents.clear();
            self.rates.clear();
        }
    }

    impl ActorAnimation for RecordingActor {
        fn apply(&mut self, intent: AnimationIntent) {
            self.intents.push(intent);
        }

        fn set_play_rate(&mut self, clip: &'static str, rate: f32) {
            self.rates.push((clip, rate));
        }

        fn clip_duration(&self, clip: &str) -> Option<f32> {
            self.durations.get(clip).copied()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_with(clip: AnimationClip) -> AnimationPlayer {
        let mut player = AnimationPlayer::new();
        player.add_clip(clip);
        player
    }

    #[test]
    fn test_animation_clip_duration() {
        let clip = AnimationClip::new("walk", 6, 10.0);
        assert!((clip.total_duration() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_toon_starts_neutral_on_both_groups() {
        let player = AnimationPlayer::toon();
        for group in PartGroup::ALL {
            assert_eq!(player.current_clip(group), Some(clips::NEUTRAL));
            assert_eq!(player.current_mode(group), Some(PlayMode::Looping));
        }
    }

    #[test]
    fn test_group_targeting() {
        let mut player = AnimationPlayer::toon();
        player.play(clips::ATTACK_TORSO, Some(PartGroup::Torso));

        assert_eq!(player.current_clip(PartGroup::Torso), Some(clips::ATTACK_TORSO));
        assert_eq!(player.current_clip(PartGroup::Legs), Some(clips::NEUTRAL));
    }

    #[test]
    fn test_looping_wraps() {
        let mut player = player_with(AnimationClip::new("test", 3, 10.0));
        player.loop_clip("test", None);

        player.update(0.35);
        assert_eq!(player.current_frame(PartGroup::Torso), 0);
        assert!(player.is_playing(PartGroup::Torso));
    }

    #[test]
    fn test_one_shot_holds_last_frame() {
        let mut player = player_with(AnimationClip::new("test", 3, 10.0));
        player.play("test", None);

        player.update(0.5);
        assert_eq!(player.current_frame(PartGroup::Legs), 2);
        assert!(!player.is_playing(PartGroup::Legs));
    }

    #[test]
    fn test_reverse_play_rate() {
        let mut player = player_with(AnimationClip::new("walk", 4, 10.0));
        player.set_play_rate("walk", -1.0);
        player.loop_clip("walk", None);
        assert_eq!(player.current_frame(PartGroup::Torso), 3);

        player.update(0.15);
        assert_eq!(player.current_frame(PartGroup::Torso), 2);

        player.update(0.3);
        assert_eq!(player.current_frame(PartGroup::Torso), 3);
    }

    #[test]
    fn test_pose_freezes() {
        let mut player = AnimationPlayer::suit();
        player.pose(clips::LANDING, 5);
        player.update(1.0);
        assert_eq!(player.current_frame(PartGroup::Torso), 5);
        assert!(!player.is_playing(PartGroup::Torso));
    }

    #[test]
    fn test_relooping_keeps_phase() {
        let mut player = player_with(AnimationClip::new("run", 8, 10.0));
        player.loop_clip("run", None);
        player.update(0.25);
        let frame = player.current_frame(PartGroup::Torso);

        player.loop_clip("run", None);
        assert_eq!(player.current_frame(PartGroup::Torso), frame);
    }

    #[test]
    fn test_unknown_clip_is_ignored() {
        let mut player = AnimationPlayer::suit();
        player.loop_clip("moonwalk", None);
        assert_eq!(player.current_clip(PartGroup::Torso), Some(clips::NEUTRAL));
        assert_eq!(player.clip_duration("moonwalk"), None);
    }

    #[test]
    fn test_clip_duration() {
        let player = AnimationPlayer::toon();
        let duration = player.clip_duration(clips::ATTACK_TORSO).unwrap();
        assert!((duration - 2.75).abs() < 1e-5);
    }
}
