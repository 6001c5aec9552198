// Gameplay: the player, the pie, enemies and the arena they share

pub mod characters;
pub mod config;
pub mod enemy;
pub mod projectile;
pub mod terrain;
pub mod world;

pub use config::GameConfig;
pub use world::Game;
