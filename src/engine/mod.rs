// Engine modules: game loop, task scheduling, events, input, collision

pub mod events;
pub mod game_loop;
pub mod input;
pub mod physics;
pub mod scheduler;
