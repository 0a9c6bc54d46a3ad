//! Frame clock: clamped deltas, elapsed time, FPS smoothing and limiting.

use web_time::{Duration, Instant};

/// Largest frame delta handed to the animator, in seconds.
///
/// A stalled window (drag-resize, breakpoint) would otherwise produce one
/// enormous step.
pub const MAX_FRAME_DELTA: f32 = 0.1;

/// Frame clock with FPS smoothing and optional frame limiting.
pub struct FrameTiming {
    /// 0 disables the limiter.
    target_fps: u32,
    frame_budget: Duration,
    started: Instant,
    previous: Instant,
    /// Exponential moving average of the frame rate.
    fps_average: f32,
    /// Weight of the newest sample in `fps_average`.
    fps_weight: f32,
}

impl FrameTiming {
    /// Create a new frame clock with the given FPS target (0 = unlimited).
    #[must_use]
    pub fn new(target_fps: u32) -> Self {
        let started = Instant::now();
        Self {
            target_fps,
            frame_budget: frame_budget(target_fps),
            started,
            previous: started,
            fps_average: 60.0,
            fps_weight: 0.05,
        }
    }

    /// Change the FPS target (0 = unlimited).
    pub fn set_target_fps(&mut self, target_fps: u32) {
        self.target_fps = target_fps;
        self.frame_budget = frame_budget(target_fps);
    }

    /// Whether the frame budget since the previous tick has been spent.
    #[must_use]
    pub fn should_render(&self) -> bool {
        self.target_fps == 0 || self.previous.elapsed() >= self.frame_budget
    }

    /// Advance the clock and return the clamped frame delta in seconds.
    pub fn tick(&mut self) -> f32 {
        let previous = std::mem::replace(&mut self.previous, Instant::now());
        let dt = self.previous.duration_since(previous).as_secs_f32();
        if dt > 0.0 {
            self.fps_average += (dt.recip() - self.fps_average) * self.fps_weight;
        }
        dt.min(MAX_FRAME_DELTA)
    }

    /// Seconds since the clock was created.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.started.elapsed().as_secs_f32()
    }

    /// Smoothed frames per second.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.fps_average
    }
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self::new(0)
    }
}

fn frame_budget(target_fps: u32) -> Duration {
    match target_fps {
        0 => Duration::ZERO,
        fps => Duration::from_secs_f64(f64::from(fps).recip()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_always_renders() {
        let timing = FrameTiming::new(0);
        assert!(timing.should_render());
    }

    #[test]
    fn budget_follows_target() {
        assert_eq!(frame_budget(0), Duration::ZERO);
        assert_eq!(frame_budget(50), Duration::from_millis(20));
    }

    #[test]
    fn tick_is_clamped_and_non_negative() {
        let mut timing = FrameTiming::new(60);
        let dt = timing.tick();
        assert!((0.0..=MAX_FRAME_DELTA).contains(&dt));
        assert!(timing.elapsed() >= 0.0);
    }
}
