//! Per-frame features for voice/silence classification.
//!
//! Zero-crossing rate separates voiced speech (low) from hiss (high); spectral
//! flatness separates tonal/periodic content (near 0) from broadband noise
//! (near 1).
//!
//! Flatness uses a direct transform over the first `FLATNESS_BINS` bins
//! rather than an FFT. The frame length is not a power of two and the cost is
//! bounded at `FLATNESS_BINS * FRAME_SIZE` multiply-adds. Twiddle factors are
//! tabulated once so the audio path does no trigonometry and no allocation.

use crate::constants::{FLATNESS_BINS, FLATNESS_EPSILON, FRAME_SIZE};
use std::f32::consts::PI;

/// Fraction of adjacent sample pairs whose sign differs, over the frame length.
/// A sample of exactly zero counts as non-negative.
pub fn zero_crossing_rate(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }

    let crossings = frame
        .windows(2)
        .filter(|pair| (pair[0] >= 0.0) != (pair[1] >= 0.0))
        .count();

    crossings as f32 / frame.len() as f32
}

/// Features of one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameFeatures {
    pub zcr: f32,
    pub flatness: f32,
}

pub struct FeatureExtractor {
    cos_table: Vec<f32>,
    sin_table: Vec<f32>,
    magnitudes: [f32; FLATNESS_BINS],
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureExtractor {
    pub fn new() -> Self {
        let mut cos_table = Vec::with_capacity(FLATNESS_BINS * FRAME_SIZE);
        let mut sin_table = Vec::with_capacity(FLATNESS_BINS * FRAME_SIZE);

        for k in 0..FLATNESS_BINS {
            for n in 0..FRAME_SIZE {
                // Reduce k*n mod N first so the phase stays small and accurate
                let phase = -2.0 * PI * ((k * n) % FRAME_SIZE) as f32 / FRAME_SIZE as f32;
                cos_table.push(phase.cos());
                sin_table.push(phase.sin());
            }
        }

        Self {
            cos_table,
            sin_table,
            magnitudes: [0.0; FLATNESS_BINS],
        }
    }

    /// Magnitude spectrum `|X[k]| / N` for `k` in `0..FLATNESS_BINS`.
    ///
    /// Expects a frame of exactly `FRAME_SIZE` samples; extra samples are ignored.
    pub fn magnitude_spectrum(&mut self, frame: &[f32]) -> &[f32; FLATNESS_BINS] {
        let len = frame.len().min(FRAME_SIZE);
        for (k, magnitude) in self.magnitudes.iter_mut().enumerate() {
            let row = k * FRAME_SIZE;
            let cos_row = &self.cos_table[row..row + len];
            let sin_row = &self.sin_table[row..row + len];

            let mut re = 0.0f32;
            let mut im = 0.0f32;
            for ((x, c), s) in frame.iter().zip(cos_row).zip(sin_row) {
                re = x.mul_add(*c, re);
                im = x.mul_add(*s, im);
            }
            *magnitude = re.hypot(im) / FRAME_SIZE as f32;
        }
        &self.magnitudes
    }

    /// Geometric over arithmetic mean of the non-DC magnitudes, in (0, 1].
    pub fn spectral_flatness(&mut self, frame: &[f32]) -> f32 {
        let spectrum = self.magnitude_spectrum(frame);
        let bins = &spectrum[1..];

        let mut log_sum = 0.0f32;
        let mut sum = 0.0f32;
        for m in bins {
            let biased = m + FLATNESS_EPSILON;
            log_sum += biased.ln();
            sum += biased;
        }

        let count = bins.len() as f32;
        let geometric = (log_sum / count).exp();
        let arithmetic = sum / count;
        (geometric / arithmetic).min(1.0)
    }

    pub fn extract(&mut self, frame: &[f32]) -> FrameFeatures {
        FrameFeatures {
            zcr: zero_crossing_rate(frame),
            flatness: self.spectral_flatness(frame),
        }
    }
}
