//! Shared constants for the voxfront speech front-end.
//!
//! None of these are runtime-configurable.

/// Sample rate of the input stream (16kHz mono)
pub const SAMPLE_RATE: u32 = 16000;

/// Frame size in samples (10ms at 16kHz = 160 samples)
pub const FRAME_SIZE: usize = 160;

/// High-pass cutoff, removes hum and rumble.
pub const HPF_CUTOFF_HZ: f32 = 120.0;

/// Low-pass cutoff, removes music/effects energy above the speech band.
pub const LPF_CUTOFF_HZ: f32 = 4000.0;

// AGC
pub const AGC_TARGET_RMS: f32 = 0.25;
pub const AGC_MIN_GAIN: f32 = 0.1;
pub const AGC_MAX_GAIN: f32 = 12.0;
pub const AGC_ATTACK: f32 = 0.35;
pub const AGC_RELEASE: f32 = 0.01;
pub const OUTPUT_CLIP: f32 = 0.99;
/// Substituted for an exactly-zero frame RMS.
pub const RMS_EPSILON: f32 = 1e-6;

// Noise floor calibration
pub const CALIBRATION_SECONDS: f32 = 0.4;
pub const DEFAULT_NOISE_FLOOR: f32 = 0.002;

// VAD thresholds
pub const NOISE_FLOOR_MULTIPLIER: f32 = 2.0;
pub const MIN_VOICE_RMS: f32 = 0.003;
pub const MAX_VOICE_FLATNESS: f32 = 0.5;
pub const MIN_VOICE_ZCR: f32 = 0.02;
pub const MAX_VOICE_ZCR: f32 = 0.25;
/// Silent frames tolerated before the debounced state drops to silence (~80ms).
pub const SILENCE_HANGOVER_FRAMES: u32 = 4;

// Spectral flatness
pub const FLATNESS_BINS: usize = 64;
pub const FLATNESS_EPSILON: f32 = 1e-12;
