use std::time::{Duration, Instant};

use crate::constants::TARGET_FPS;

/// Clock readings for one frame, all in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTiming {
    /// Time since the previous frame.
    pub dt: f64,
    /// Monotonic time since process start.
    pub now: f64,
    /// Time since the game started.
    pub elapsed: f64,
}

pub trait FrameTicker {
    /// Blocks as needed to hold the frame rate, then reports the new frame's timing.
    fn tick(&mut self) -> FrameTiming;
}

/// Wall-clock ticker capped at `TARGET_FPS`.
pub struct RealTimeTicker {
    process_start: Instant,
    game_start: Instant,
    last_frame: Instant,
    frame_budget: Duration,
}

impl RealTimeTicker {
    pub fn new(process_start: Instant) -> Self {
        let now = Instant::now();
        RealTimeTicker {
            process_start,
            game_start: now,
            last_frame: now,
            frame_budget: Duration::from_secs(1) / TARGET_FPS,
        }
    }
}

impl FrameTicker for RealTimeTicker {
    fn tick(&mut self) -> FrameTiming {
        let spent = self.last_frame.elapsed();
        if spent < self.frame_budget {
            std::thread::sleep(self.frame_budget - spent);
        }
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f64();
        self.last_frame = now;
        FrameTiming {
            dt,
            now: now.duration_since(self.process_start).as_secs_f64(),
            elapsed: now.duration_since(self.game_start).as_secs_f64(),
        }
    }
}

/// Deterministic ticker that advances every clock by the same step without sleeping.
#[derive(Clone, Debug)]
pub struct FixedTicker {
    step: f64,
    now: f64,
    elapsed: f64,
}

impl FixedTicker {
    pub fn new(step: f64) -> Self {
        FixedTicker::starting_at(step, 0.0)
    }

    /// `now` starts at `process_time`; `elapsed` always starts at zero.
    pub fn starting_at(step: f64, process_time: f64) -> Self {
        FixedTicker {
            step,
            now: process_time,
            elapsed: 0.0,
        }
    }

    pub fn at_target_rate() -> Self {
        FixedTicker::new(1.0 / TARGET_FPS as f64)
    }
}

impl FrameTicker for FixedTicker {
    fn tick(&mut self) -> FrameTiming {
        self.now += self.step;
        self.elapsed += self.step;
        FrameTiming {
            dt: self.step,
            now: self.now,
            elapsed: self.elapsed,
        }
    }
}
