// Input handling
//
// Key events from the window are mapped through a remappable binding table
// into discrete press/release edges. The edges are queued and consumed by
// the simulation at the start of the next tick, so the world only changes
// on the game loop.
//
// - `action`: actions, simulation edges and the default layout
// - `config`: binding table and remapping
// - `manager`: repeat filtering and the edge queue

pub mod action;
pub mod config;
pub mod manager;

// Re-export commonly used types
pub use action::GameInput;
pub use manager::{InputManager, ShellCommand};
