use std::time::{Duration, Instant};

use ember_core::profiling::profile_function;

/// Frame timing for the game loop.
///
/// Tracks the frame delta and total elapsed time, and accumulates delta
/// into a fixed-timestep budget that the loop spends in whole steps.
///
/// By default the clock follows the wall clock. [`Time::with_manual_step`]
/// makes every frame last exactly the given duration, which keeps headless
/// runs reproducible.
#[derive(Debug, Clone)]
pub struct Time {
    elapsed: Duration,
    delta: Duration,
    frame_count: u64,
    time_scale: f32,
    fixed_timestep: Duration,
    fixed_accumulator: Duration,
    /// Upper bound on fixed steps run per frame.
    max_fixed_updates: u32,
    /// Longest delta a single frame may report.
    max_delta: Duration,
    manual_step: Option<Duration>,
    last_frame_time: Instant,
}

impl Time {
    /// Defaults: 20 fixed updates per second, at most 5 per frame, deltas
    /// capped at 250 ms.
    pub fn new() -> Self {
        Self {
            elapsed: Duration::ZERO,
            delta: Duration::ZERO,
            frame_count: 0,
            time_scale: 1.0,
            fixed_timestep: Duration::from_millis(50),
            fixed_accumulator: Duration::ZERO,
            max_fixed_updates: 5,
            max_delta: Duration::from_millis(250),
            manual_step: None,
            last_frame_time: Instant::now(),
        }
    }

    /// A clock where every frame lasts exactly `step`.
    pub fn with_manual_step(step: Duration) -> Self {
        Self {
            manual_step: Some(step),
            ..Self::new()
        }
    }

    /// Starts a new frame.
    pub fn update(&mut self) {
        profile_function!();
        let raw_delta = match self.manual_step {
            Some(step) => step,
            None => {
                let now = Instant::now();
                let delta = now.duration_since(self.last_frame_time);
                self.last_frame_time = now;
                delta
            }
        };
        self.advance(raw_delta);
    }

    /// Starts a new frame that lasted `delta`, ignoring the wall clock.
    ///
    /// Budget beyond [`Time::max_fixed_updates`] whole steps is dropped,
    /// keeping only the part of a step already owed, so a slow frame rate
    /// never builds a backlog.
    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta.min(self.max_delta);
        self.elapsed += self.delta;
        self.frame_count += 1;
        self.fixed_accumulator += self.delta;

        let budget = self.fixed_timestep * self.max_fixed_updates;
        if self.fixed_accumulator > budget {
            let partial = self.fixed_accumulator.as_nanos() % self.fixed_timestep.as_nanos();
            let kept = budget + Duration::from_nanos(partial as u64);
            let dropped = self.fixed_accumulator - kept;
            self.fixed_accumulator = kept;
            tracing::trace!("fixed update budget exceeded, skipping {:?}", dropped);
        }
    }

    /// Restarts delta measurement from now, e.g. after a long load.
    pub fn restart(&mut self) {
        self.last_frame_time = Instant::now();
        self.fixed_accumulator = Duration::ZERO;
    }

    #[inline]
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Scaled frame delta in seconds.
    #[inline]
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32() * self.time_scale
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    #[inline]
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// `0.0` freezes [`Time::delta_seconds`]; negative scales clamp to zero.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    #[inline]
    pub fn fixed_timestep(&self) -> Duration {
        self.fixed_timestep
    }

    pub fn set_fixed_timestep(&mut self, timestep: Duration) {
        if timestep.is_zero() {
            tracing::warn!("ignoring zero fixed timestep");
            return;
        }
        self.fixed_timestep = timestep;
    }

    #[inline]
    pub fn max_fixed_updates(&self) -> u32 {
        self.max_fixed_updates
    }

    pub fn set_max_fixed_updates(&mut self, max: u32) {
        self.max_fixed_updates = max.max(1);
    }

    pub fn set_max_delta(&mut self, max_delta: Duration) {
        self.max_delta = max_delta;
    }

    #[inline]
    pub fn should_fixed_update(&self) -> bool {
        self.fixed_accumulator >= self.fixed_timestep
    }

    /// Spends one fixed step from the budget. Returns `false` when the
    /// budget holds less than a full step.
    pub fn consume_fixed_timestep(&mut self) -> bool {
        if self.should_fixed_update() {
            self.fixed_accumulator -= self.fixed_timestep;
            true
        } else {
            false
        }
    }

    /// Whole steps in the budget, capped at [`Time::max_fixed_updates`].
    pub fn fixed_update_count(&self) -> u32 {
        let steps = self.fixed_accumulator.as_nanos() / self.fixed_timestep.as_nanos();
        steps.min(u128::from(self.max_fixed_updates)) as u32
    }

    pub fn reset_fixed_accumulator(&mut self) {
        self.fixed_accumulator = Duration::ZERO;
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

    fn stepped(step_ms: u64, fixed_ms: u64) -> Time {
        let mut time = Time::with_manual_step(Duration::from_millis(step_ms));
        time.set_fixed_timestep(Duration::from_millis(fixed_ms));
        time
    }

    #[test]
    fn fresh_clock_owes_no_updates() {
        let time = stepped(50, 50);
        assert_eq!(time.frame_count(), 0);
        assert_eq!(time.fixed_update_count(), 0);
        assert_eq!(time.delta_seconds(), 0.0);
    }

    #[test]
    fn manual_steps_accumulate_exactly() {
        let mut time = stepped(30, 50);
        for _ in 0..4 {
            time.update();
        }
        assert_eq!(time.frame_count(), 4);
        assert_eq!(time.elapsed(), Duration::from_millis(120));
        assert_eq!(time.delta(), Duration::from_millis(30));
    }

    #[test]
    fn remainder_carries_into_the_next_frame() {
        let mut time = stepped(50, 20);
        time.update();

        assert_eq!(time.fixed_update_count(), 2);
        assert!(time.consume_fixed_timestep());
        assert!(time.consume_fixed_timestep());
        assert!(!time.consume_fixed_timestep());

        // 10 ms left over plus the next 50 ms frame.
        time.update();
        assert_eq!(time.fixed_update_count(), 3);
    }

    #[test]
    fn catch_up_is_capped() {
        let mut time = stepped(200, 10);
        time.set_max_fixed_updates(3);
        time.update();
        assert_eq!(time.fixed_update_count(), 3);
    }

    #[test]
    fn slow_frames_do_not_build_a_backlog() {
        let mut time = stepped(65, 10);
        for _ in 0..100 {
            time.update();
            let steps = time.fixed_update_count();
            assert_eq!(steps, 5);
            for _ in 0..steps {
                assert!(time.consume_fixed_timestep());
            }
            assert!(!time.should_fixed_update());
        }
        assert_eq!(time.frame_count(), 100);
    }

    #[test]
    fn long_frames_are_clamped() {
        let mut time = stepped(2000, 50);
        time.set_max_delta(Duration::from_millis(100));
        time.update();
        assert_eq!(time.delta(), Duration::from_millis(100));
        assert_eq!(time.fixed_update_count(), 2);
    }

    #[test]
    fn restart_forgets_owed_updates() {
        let mut time = stepped(100, 20);
        time.update();
        time.restart();
        assert_eq!(time.fixed_update_count(), 0);
    }

    #[test]
    fn scale_slows_variable_time_only() {
        let mut time = stepped(100, 50);
        time.set_time_scale(0.5);
        time.update();
        assert!((time.delta_seconds() - 0.05).abs() < 1e-6);
        assert_eq!(time.delta(), Duration::from_millis(100));

        time.set_time_scale(-1.0);
        assert_eq!(time.time_scale(), 0.0);
    }
}
