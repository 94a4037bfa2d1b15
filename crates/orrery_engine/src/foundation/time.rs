//! Frame statistics
//!
//! Orbit motion is stepped per frame, not per second, so wall-clock time is
//! only used for reporting.

use std::time::{Duration, Instant};

/// Counts frames and reports the achieved frame rate over a rolling window
pub struct FrameStats {
    window_start: Instant,
    window: Duration,
    frames_in_window: u32,
    total_frames: u64,
    last_fps: f32,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl FrameStats {
    /// Create frame statistics that report once per `window`
    pub fn new(window: Duration) -> Self {
        Self {
            window_start: Instant::now(),
            window,
            frames_in_window: 0,
            total_frames: 0,
            last_fps: 0.0,
        }
    }

    /// Record one presented frame.
    ///
    /// Returns the frame rate of the window that just closed, if any.
    pub fn record_frame(&mut self) -> Option<f32> {
        self.record_frame_at(Instant::now())
    }

    fn record_frame_at(&mut self, now: Instant) -> Option<f32> {
        self.frames_in_window += 1;
        self.total_frames += 1;

        let elapsed = now.duration_since(self.window_start);
        if elapsed < self.window {
            return None;
        }

        self.last_fps = self.frames_in_window as f32 / elapsed.as_secs_f32();
        self.frames_in_window = 0;
        self.window_start = now;
        Some(self.last_fps)
    }

    /// Frame rate of the last completed window
    pub fn fps(&self) -> f32 {
        self.last_fps
    }

    /// Total frames recorded
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_after_window_closes() {
        let start = Instant::now();
        let mut stats = FrameStats::new(Duration::from_millis(100));
        stats.window_start = start;

        for i in 1..10 {
            assert!(stats.record_frame_at(start + Duration::from_millis(i * 10)).is_none());
        }
        let fps = stats.record_frame_at(start + Duration::from_millis(100));
        assert!(fps.is_some());
        assert!((stats.fps() - 100.0).abs() < 1.0);
        assert_eq!(stats.total_frames(), 10);
    }
}
