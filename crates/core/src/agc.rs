//! Level normalizer (AGC) driving each frame toward a target loudness.

use crate::constants::{
    AGC_ATTACK, AGC_MAX_GAIN, AGC_MIN_GAIN, AGC_RELEASE, AGC_TARGET_RMS, OUTPUT_CLIP, RMS_EPSILON,
};

/// Root-mean-square of a frame. An exactly-zero result is replaced by
/// `RMS_EPSILON` so the gain computation never divides by zero.
pub fn frame_rms(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return RMS_EPSILON;
    }
    let sum_sq: f32 = frame.iter().map(|x| x * x).sum();
    let rms = (sum_sq / frame.len() as f32).sqrt();
    if rms == 0.0 {
        RMS_EPSILON
    } else {
        rms
    }
}

/// Closed-loop gain with asymmetric smoothing and hard output clipping.
pub struct LevelNormalizer {
    pub target_rms: f32,
    current_gain: f32,
    attack_coeff: f32,
    release_coeff: f32,
}

impl Default for LevelNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelNormalizer {
    pub fn new() -> Self {
        Self {
            target_rms: AGC_TARGET_RMS,
            current_gain: 1.0,
            attack_coeff: AGC_ATTACK,
            release_coeff: AGC_RELEASE,
        }
    }

    pub fn gain(&self) -> f32 {
        self.current_gain
    }

    /// Moves the running gain one step toward the gain that would bring `rms`
    /// to the target. Returns the updated gain.
    pub fn update(&mut self, rms: f32) -> f32 {
        let need = (self.target_rms / rms).clamp(AGC_MIN_GAIN, AGC_MAX_GAIN);
        let step = if need > self.current_gain {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.current_gain += step * (need - self.current_gain);
        self.current_gain
    }

    /// Applies the current gain and clips every sample to `±OUTPUT_CLIP`.
    pub fn apply(&self, frame: &mut [f32]) {
        for sample in frame.iter_mut() {
            *sample = (*sample * self.current_gain).clamp(-OUTPUT_CLIP, OUTPUT_CLIP);
        }
    }

    /// Measures, updates and applies in one pass. Returns the pre-gain RMS.
    pub fn process_frame(&mut self, frame: &mut [f32]) -> f32 {
        let rms = frame_rms(frame);
        self.update(rms);
        self.apply(frame);
        rms
    }
}
