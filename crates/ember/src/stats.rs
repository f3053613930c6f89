use std::time::Duration;

const WINDOW: Duration = Duration::from_secs(1);

/// Counts fixed updates and drawn frames, publishing per-second rates.
///
/// Rates are measured on game time, so a paused or manually stepped clock
/// reports what the loop actually ran.
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    show: bool,
    updates: u32,
    update_window: Duration,
    ups: u32,
    frames: u32,
    frame_window: Duration,
    fps: u32,
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restarts both counters at `now`.
    pub fn reset(&mut self, now: Duration) {
        self.updates = 0;
        self.frames = 0;
        self.update_window = now;
        self.frame_window = now;
    }

    /// Records one fixed update.
    pub fn record_update(&mut self, now: Duration) {
        self.updates += 1;
        if now.saturating_sub(self.update_window) > WINDOW {
            self.ups = self.updates;
            self.updates = 0;
            self.update_window = now;
            tracing::trace!("UPS: {}", self.ups);
        }
    }

    /// Records one drawn frame.
    pub fn record_frame(&mut self, now: Duration) {
        self.frames += 1;
        if now.saturating_sub(self.frame_window) > WINDOW {
            self.fps = self.frames;
            self.frames = 0;
            self.frame_window = now;
            tracing::trace!("FPS: {}", self.fps);
        }
    }

    /// Updates per second over the last complete window.
    pub fn ups(&self) -> u32 {
        self.ups
    }

    /// Frames per second over the last complete window.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn is_showing(&self) -> bool {
        self.show
    }

    pub fn set_show(&mut self, show: bool) {
        self.show = show;
    }

    /// Overlay text for the platform to render while showing.
    pub fn overlay(&self) -> Option<String> {
        self.show
            .then(|| format!("FPS: {:>7}\nUPS: {:>7}", self.fps, self.ups))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_publish_after_a_full_second() {
        let mut stats = FrameStats::new();
        stats.reset(Duration::ZERO);

        for ms in (50..=1000).step_by(50) {
            stats.record_update(Duration::from_millis(ms));
        }
        assert_eq!(stats.ups(), 0);

        stats.record_update(Duration::from_millis(1050));
        assert_eq!(stats.ups(), 21);
    }

    #[test]
    fn overlay_only_when_shown() {
        let mut stats = FrameStats::new();
        assert_eq!(stats.overlay(), None);
        stats.set_show(true);
        assert!(stats.overlay().is_some_and(|text| text.contains("FPS")));
    }
}
