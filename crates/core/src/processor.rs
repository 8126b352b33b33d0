use crate::agc::LevelNormalizer;
use crate::calibration::NoiseFloorCalibrator;
use crate::constants::FRAME_SIZE;
use crate::features::{FeatureExtractor, FrameFeatures};
use crate::filter::FilterChain;
use crate::vad::{is_voice_frame, VadDecision, VadState};
use anyhow::{anyhow, Result};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// One 10ms block of mono samples.
pub type Frame = [f32; FRAME_SIZE];

/// Result of processing one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    /// Filtered, gain-normalized, clipped frame.
    pub pcm: Frame,
    /// Pre-gain RMS of the filtered frame.
    pub rms: f32,
    /// AGC gain applied to this frame.
    pub gain: f32,
    /// New debounced voice flag, present only when it changed on this frame.
    pub vad_transition: Option<bool>,
}

/// The processing context: all per-connection DSP state, advanced one frame
/// at a time.
///
/// Frames must be fed strictly in arrival order. Nothing here blocks or
/// allocates after construction.
pub struct SpeechProcessor {
    filters: FilterChain,
    agc: LevelNormalizer,
    calibrator: NoiseFloorCalibrator,
    features: FeatureExtractor,
    vad: VadDecision,
    last_features: FrameFeatures,
    frames_processed: u64,

    // Shared Atomics (monitoring only, f32 bits)
    pub volume_level: Arc<AtomicU32>,
    pub gain_level: Arc<AtomicU32>,
}

impl SpeechProcessor {
    pub fn new(sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(anyhow!("Sample rate must be positive"));
        }
        let fs = sample_rate as f32;
        let filters = FilterChain::new(fs)?;

        Ok(Self {
            filters,
            agc: LevelNormalizer::new(),
            calibrator: NoiseFloorCalibrator::new(fs),
            features: FeatureExtractor::new(),
            vad: VadDecision::new(),
            last_features: FrameFeatures {
                zcr: 0.0,
                flatness: 1.0,
            },
            frames_processed: 0,
            volume_level: Arc::new(AtomicU32::new(0)),
            gain_level: Arc::new(AtomicU32::new(1.0f32.to_bits())),
        })
    }

    /// Runs one complete frame through filter, AGC, calibration, features and
    /// the VAD decision.
    pub fn process_frame(&mut self, input: &Frame) -> FrameOutput {
        let mut frame = *input;

        // 1. Band-limit
        self.filters.process_frame(&mut frame);

        // 2. Normalize level
        let rms = self.agc.process_frame(&mut frame);
        let gain = self.agc.gain();

        // 3. Noise floor warm-up
        self.calibrator.update(rms, FRAME_SIZE);

        // 4. Features on the normalized frame
        let features = self.features.extract(&frame);
        self.last_features = features;

        // 5. Debounced decision
        let voice_frame = is_voice_frame(rms, &features, self.calibrator.floor());
        let vad_transition = self.vad.update(voice_frame).map(VadState::is_voice);

        self.frames_processed += 1;
        self.volume_level.store(rms.to_bits(), Ordering::Relaxed);
        self.gain_level.store(gain.to_bits(), Ordering::Relaxed);

        FrameOutput {
            pcm: frame,
            rms,
            gain,
            vad_transition,
        }
    }

    pub fn noise_floor(&self) -> f32 {
        self.calibrator.floor()
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibrator.is_frozen()
    }

    pub fn gain(&self) -> f32 {
        self.agc.gain()
    }

    pub fn vad_state(&self) -> VadState {
        self.vad.state()
    }

    pub fn last_features(&self) -> FrameFeatures {
        self.last_features
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }
}
