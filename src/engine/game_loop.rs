/// Fixed-step simulation clock
///
/// Wall time between redraws is banked and paid out in whole 60 Hz ticks,
/// so per-tick movement constants mean the same thing on any display.
use std::time::{Duration, Instant};

/// Length of one simulation tick in seconds
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;
const TICK: Duration = Duration::from_micros(16_667);

/// Ticks allowed per redraw before the backlog is dropped
const MAX_TICKS_PER_FRAME: u32 = 5;

pub struct GameLoop {
    /// Wall time not yet paid out as ticks
    banked: Duration,
    last_frame: Instant,
    paused: bool,
    ticks: u64,
}

impl GameLoop {
    pub fn new() -> Self {
        Self {
            banked: Duration::ZERO,
            last_frame: Instant::now(),
            paused: false,
            ticks: 0,
        }
    }

    /// Start a redraw and return how many ticks to simulate for it
    pub fn begin_frame(&mut self) -> u32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.last_frame = now;

        if self.paused {
            return 0;
        }

        self.banked += elapsed;
        let mut due = 0;
        while self.banked >= TICK && due < MAX_TICKS_PER_FRAME {
            self.banked -= TICK;
            due += 1;
        }
        if due == MAX_TICKS_PER_FRAME {
            // A long stall is skipped, not replayed
            self.banked = self.banked.min(TICK);
        }

        self.ticks += due as u64;
        due
    }

    pub fn fixed_timestep(&self) -> f32 {
        FIXED_TIMESTEP
    }

    /// Seconds simulated since start
    pub fn simulated_secs(&self) -> f64 {
        self.ticks as f64 * FIXED_TIMESTEP as f64
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stop or restart ticking. Time spent paused is never simulated.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        if !self.paused {
            self.banked = Duration::ZERO;
            self.last_frame = Instant::now();
        }
    }
}

impl Default for GameLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_toggle_pause() {
        let mut game_loop = GameLoop::new();
        assert!(!game_loop.is_paused());
        game_loop.toggle_pause();
        assert!(game_loop.is_paused());
        game_loop.toggle_pause();
        assert!(!game_loop.is_paused());
    }

    #[test]
    fn test_paused_loop_does_not_tick() {
        let mut game_loop = GameLoop::new();
        game_loop.toggle_pause();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(game_loop.begin_frame(), 0);
        assert_eq!(game_loop.simulated_secs(), 0.0);
    }

    #[test]
    fn test_resume_drops_paused_time() {
        let mut game_loop = GameLoop::new();
        game_loop.toggle_pause();
        thread::sleep(Duration::from_millis(100));
        game_loop.toggle_pause();
        // 100ms paused would be 6 ticks if it were banked
        assert!(game_loop.begin_frame() < 5);
    }

    #[test]
    fn test_stall_is_capped() {
        let mut game_loop = GameLoop::new();
        thread::sleep(Duration::from_millis(300));

        assert_eq!(game_loop.begin_frame(), MAX_TICKS_PER_FRAME);
        // The rest of the stall is not paid out on the next frame
        assert!(game_loop.begin_frame() <= 1);
    }

    #[test]
    fn test_simulated_time_follows_ticks() {
        let mut game_loop = GameLoop::new();
        thread::sleep(Duration::from_millis(40));
        let ticks = game_loop.begin_frame();
        let expected = ticks as f64 * FIXED_TIMESTEP as f64;
        assert!((game_loop.simulated_secs() - expected).abs() < 1e-9);
    }
}
