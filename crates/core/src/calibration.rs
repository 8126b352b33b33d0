//! Noise floor calibration over the warm-up window at stream start.

use crate::constants::{CALIBRATION_SECONDS, DEFAULT_NOISE_FLOOR};

/// Averages frame RMS over the first `CALIBRATION_SECONDS` of audio, then
/// freezes. The transition to frozen happens exactly once.
pub struct NoiseFloorCalibrator {
    remaining_samples: i64,
    rms_sum: f32,
    frames_counted: u32,
    frozen: bool,
    current_floor: f32,
}

impl NoiseFloorCalibrator {
    pub fn new(sample_rate: f32) -> Self {
        let window = (CALIBRATION_SECONDS * sample_rate).round() as i64;
        Self::with_window(window)
    }

    /// Calibrator with an explicit window length in samples. A window of zero
    /// samples is frozen from the start at the default floor.
    pub fn with_window(window_samples: i64) -> Self {
        Self {
            remaining_samples: window_samples,
            rms_sum: 0.0,
            frames_counted: 0,
            frozen: window_samples <= 0,
            current_floor: DEFAULT_NOISE_FLOOR,
        }
    }

    /// Feeds one frame's RMS. Returns `true` on the frame that froze the floor.
    pub fn update(&mut self, rms: f32, frame_len: usize) -> bool {
        if self.frozen {
            return false;
        }

        self.rms_sum += rms;
        self.frames_counted += 1;
        self.remaining_samples -= frame_len as i64;

        if self.remaining_samples <= 0 {
            if self.frames_counted > 0 {
                self.current_floor = self.rms_sum / self.frames_counted as f32;
            }
            self.frozen = true;
            log::debug!(
                "Noise floor frozen at {:.6} after {} frames",
                self.current_floor,
                self.frames_counted
            );
            return true;
        }
        false
    }

    pub fn floor(&self) -> f32 {
        self.current_floor
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn frames_counted(&self) -> u32 {
        self.frames_counted
    }
}
