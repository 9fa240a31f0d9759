/// Averages frame rate over a fixed number of frames.
#[derive(Debug, Clone)]
pub struct FrameRate {
    window: u32,
    frames: u32,
    elapsed: f32,
}

impl FrameRate {
    /// `window` is clamped to at least one frame.
    pub fn new(window: u32) -> Self {
        Self {
            window: window.max(1),
            frames: 0,
            elapsed: 0.0,
        }
    }

    /// Records one frame of `dt` seconds. Returns the average frames per
    /// second each time a full window has been recorded.
    pub fn record(&mut self, dt: f32) -> Option<f32> {
        self.frames += 1;
        self.elapsed += dt.max(0.0);
        if self.frames < self.window {
            return None;
        }
        let fps = if self.elapsed > 0.0 {
            self.frames as f32 / self.elapsed
        } else {
            0.0
        };
        self.frames = 0;
        self.elapsed = 0.0;
        Some(fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_once_per_window() {
        let mut rate = FrameRate::new(4);
        assert_eq!(rate.record(0.25), None);
        assert_eq!(rate.record(0.25), None);
        assert_eq!(rate.record(0.25), None);
        assert_eq!(rate.record(0.25), Some(4.0));
        assert_eq!(rate.record(0.5), None);
    }

    #[test]
    fn zero_window_reports_every_frame() {
        let mut rate = FrameRate::new(0);
        assert_eq!(rate.record(0.5), Some(2.0));
    }
}
