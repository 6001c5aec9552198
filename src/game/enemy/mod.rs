// Enemies: archetypes, health feedback, lifecycle and spawning

pub mod archetype;
pub mod health;
pub mod spawner;
pub mod state;

pub use archetype::{archetype, EnemyArchetype};
pub use health::HealthIndicator;
pub use spawner::Spawner;
pub use state::{Enemy, EnemyEffect};

/// Errors that abort a spawn
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpawnError {
    #[error("Archetype index {index} is out of range 0..=31")]
    Configuration { index: usize },
}
