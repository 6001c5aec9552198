// Characters
//
// - Transforms and the shared character record
// - Clip playback behind the `ActorAnimation` seam
// - Player locomotion and the pie-throw sequence

pub mod animation;
pub mod character;
pub mod locomotion;
pub mod player;
pub mod throw;

pub use character::{Character, Transform};
pub use locomotion::InputOutcome;
