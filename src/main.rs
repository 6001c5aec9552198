use anyhow::Result;
use log::info;
use winit::{
    event::{Event, WindowEvent},
    event_loop::EventLoop,
    window::WindowBuilder,
};

mod core;
mod engine;
mod game;

use engine::game_loop::GameLoop;
use engine::input::{InputManager, ShellCommand};
use game::enemy::Spawner;
use game::terrain::default_arena;
use game::world::{HeadlessActors, TERRAIN_ID};
use game::{Game, GameConfig};

/// Fixes enemy picks and spawn spots when set to a number
const SEED_VAR: &str = "PIE_THROW_SEED";

fn spawner(config: &GameConfig) -> Spawner {
    match std::env::var(SEED_VAR).ok().and_then(|v| v.parse::<u64>().ok()) {
        Some(seed) => {
            info!("Spawning from seed {seed}");
            Spawner::seeded(config.spawn, seed)
        }
        None => Spawner::new(config.spawn),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting Pie Throw...");

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("Pie Throw")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720))
        .with_resizable(true)
        .build(&event_loop)?;

    info!("Window created successfully");

    let mut input = InputManager::new();
    let mut game_loop = GameLoop::new();
    let config = GameConfig::default();
    let spawner = spawner(&config);
    let mut game = Game::with_parts(
        config,
        default_arena(TERRAIN_ID),
        spawner,
        Box::new(HeadlessActors),
    );
    game.populate();

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => {
                info!("Close requested, shutting down...");
                elwt.exit();
            }
            Event::WindowEvent {
                event: WindowEvent::KeyboardInput { event, .. },
                ..
            } => {
                input.process_keyboard_event(&event);
                while let Some(command) = input.next_command() {
                    match command {
                        ShellCommand::TogglePause => {
                            game_loop.toggle_pause();
                            info!(
                                "{} at {:.2}s",
                                if game_loop.is_paused() { "Paused" } else { "Resumed" },
                                game_loop.simulated_secs()
                            );
                        }
                        ShellCommand::Quit => {
                            info!("Quit requested, shutting down...");
                            elwt.exit();
                        }
                    }
                }
            }
            Event::WindowEvent {
                event: WindowEvent::RedrawRequested,
                ..
            } => {
                let ticks = game_loop.begin_frame();
                if ticks > 0 {
                    // Edges go to the first tick of the frame only
                    let mut pending = input.drain();
                    for _ in 0..ticks {
                        game.tick(&pending, game_loop.fixed_timestep());
                        pending.clear();
                    }
                }
            }
            Event::AboutToWait => {
                window.request_redraw();
            }
            _ => {}
        })
        .map_err(|e| anyhow::anyhow!("Event loop error: {}", e))?;

    Ok(())
}
