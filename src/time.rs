//! Frame clock for driving the simulation.
//!
//! Supplies the `now` passed to
//! [`SimulationController::tick`](crate::SimulationController::tick), a
//! smoothed ticks-per-second figure, and the time left in the current frame
//! when a driver paces itself to a target rate.
//!
//! # Example
//!
//! ```ignore
//! use plife::time::Time;
//!
//! let mut time = Time::new();
//!
//! loop {
//!     let now = time.update();
//!     controller.tick(now)?;
//!     if let Some(rest) = time.remaining(controller.target_rate()) {
//!         std::thread::sleep(rest);
//!     }
//! }
//! ```

use std::time::{Duration, Instant};

/// Tick timing.
#[derive(Debug)]
pub struct Time {
    /// When the clock was created or last reset.
    start: Instant,
    /// When the last tick began.
    last_frame: Instant,
    /// Total elapsed seconds at the last update.
    elapsed_secs: f32,
    /// Seconds between the last two updates.
    delta_secs: f32,
    /// Updates since start.
    frame_count: u64,
    /// Ticks per second, recomputed every `fps_update_interval`.
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
}

impl Time {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            elapsed_secs: 0.0,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Start a new frame. Returns elapsed seconds since start.
    pub fn update(&mut self) -> f32 {
        let now = Instant::now();

        self.delta_secs = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.elapsed_secs = now.duration_since(self.start).as_secs_f32();
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.elapsed_secs
    }

    /// Seconds since start, as of the last update.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed_secs
    }

    /// Seconds between the last two updates.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Time left in the current frame at `target_rate` frames per second.
    ///
    /// `None` when the frame has already overrun or `target_rate` is 0
    /// (unpaced).
    pub fn remaining(&self, target_rate: u32) -> Option<Duration> {
        if target_rate == 0 {
            return None;
        }
        let budget = Duration::from_secs_f64(1.0 / target_rate as f64);
        budget.checked_sub(self.last_frame.elapsed()).filter(|d| !d.is_zero())
    }

    /// Restart from zero.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_time_new() {
        let time = Time::new();
        assert_eq!(time.frame(), 0);
        assert_eq!(time.elapsed(), 0.0);
    }

    #[test]
    fn test_time_update() {
        let mut time = Time::new();
        thread::sleep(Duration::from_millis(10));
        let elapsed = time.update();

        assert!(elapsed > 0.0);
        assert!(time.delta() > 0.0);
        assert_eq!(time.frame(), 1);
    }

    #[test]
    fn test_remaining_budget() {
        let mut time = Time::new();
        time.update();

        assert_eq!(time.remaining(0), None);

        // A full second of budget cannot be used up immediately
        let rest = time.remaining(1).unwrap();
        assert!(rest > Duration::from_millis(500));

        thread::sleep(Duration::from_millis(20));
        assert_eq!(time.remaining(1000), None);
    }

    #[test]
    fn test_reset() {
        let mut time = Time::new();
        time.update();
        time.reset();
        assert_eq!(time.frame(), 0);
    }
}
