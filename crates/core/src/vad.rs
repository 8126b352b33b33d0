//! Voice activity decision with silence hysteresis.

use crate::constants::{
    MAX_VOICE_FLATNESS, MAX_VOICE_ZCR, MIN_VOICE_RMS, MIN_VOICE_ZCR, NOISE_FLOOR_MULTIPLIER,
    SILENCE_HANGOVER_FRAMES,
};
use crate::features::FrameFeatures;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VadState {
    Voice,
    Silence,
}

impl VadState {
    pub fn is_voice(self) -> bool {
        matches!(self, VadState::Voice)
    }
}

/// RMS a frame must exceed to count as voiced, given the calibrated floor.
pub fn voice_threshold(noise_floor: f32) -> f32 {
    (noise_floor * NOISE_FLOOR_MULTIPLIER).max(MIN_VOICE_RMS)
}

/// Instantaneous, undebounced classification of one frame.
pub fn is_voice_frame(rms: f32, features: &FrameFeatures, noise_floor: f32) -> bool {
    rms > voice_threshold(noise_floor)
        && features.flatness < MAX_VOICE_FLATNESS
        && features.zcr > MIN_VOICE_ZCR
        && features.zcr < MAX_VOICE_ZCR
}

/// Debounces per-frame classifications into a stable voice/silence state.
///
/// Any voiced frame resets the silence run. The state stays `Voice` while the
/// run is at most `SILENCE_HANGOVER_FRAMES`, so the fifth consecutive silent
/// frame is the one that flips to `Silence`. The run starts at zero, which
/// means the first few frames of a stream read as `Voice` until the run
/// exceeds the hangover.
pub struct VadDecision {
    state: VadState,
    silence_run: u32,
}

impl Default for VadDecision {
    fn default() -> Self {
        Self::new()
    }
}

impl VadDecision {
    pub fn new() -> Self {
        Self {
            state: VadState::Silence,
            silence_run: 0,
        }
    }

    pub fn state(&self) -> VadState {
        self.state
    }

    pub fn silence_run(&self) -> u32 {
        self.silence_run
    }

    /// Feeds one frame's classification. Returns the new state only when it
    /// differs from the previous one.
    pub fn update(&mut self, voice_frame: bool) -> Option<VadState> {
        if voice_frame {
            self.silence_run = 0;
        } else {
            self.silence_run = self.silence_run.saturating_add(1);
        }

        let next = if voice_frame || self.silence_run <= SILENCE_HANGOVER_FRAMES {
            VadState::Voice
        } else {
            VadState::Silence
        };

        if next == self.state {
            return None;
        }
        log::debug!("VAD transition {:?} -> {:?}", self.state, next);
        self.state = next;
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_NOISE_FLOOR;

    const VOICED: FrameFeatures = FrameFeatures {
        zcr: 0.06,
        flatness: 0.1,
    };

    /// Decision engine that has already settled into silence.
    fn settled() -> VadDecision {
        let mut vad = VadDecision::new();
        for _ in 0..10 {
            vad.update(false);
        }
        assert_eq!(vad.state(), VadState::Silence);
        vad
    }

    // ── Classification ───────────────────────────────────────────

    #[test]
    fn test_threshold_has_floor() {
        assert_eq!(voice_threshold(DEFAULT_NOISE_FLOOR), 0.004);
        assert_eq!(voice_threshold(0.0), MIN_VOICE_RMS);
        assert!((voice_threshold(0.01) - 0.02).abs() < 1e-7);
    }

    #[test]
    fn test_voiced_features_above_threshold() {
        assert!(is_voice_frame(0.1, &VOICED, DEFAULT_NOISE_FLOOR));
    }

    #[test]
    fn test_quiet_frame_is_not_voice() {
        assert!(!is_voice_frame(0.003, &VOICED, DEFAULT_NOISE_FLOOR));
        // Raised floor raises the threshold
        assert!(!is_voice_frame(0.05, &VOICED, 0.03));
    }

    #[test]
    fn test_noise_like_frame_is_not_voice() {
        let noisy = FrameFeatures {
            zcr: 0.06,
            flatness: 0.8,
        };
        assert!(!is_voice_frame(0.1, &noisy, DEFAULT_NOISE_FLOOR));
    }

    #[test]
    fn test_zcr_bounds_are_exclusive() {
        for zcr in [MIN_VOICE_ZCR, MAX_VOICE_ZCR, 0.0, 0.5] {
            let features = FrameFeatures { zcr, flatness: 0.1 };
            assert!(!is_voice_frame(0.1, &features, DEFAULT_NOISE_FLOOR), "zcr={}", zcr);
        }
    }

    // ── Hysteresis ───────────────────────────────────────────────

    #[test]
    fn test_initial_state_is_silence() {
        let vad = VadDecision::new();
        assert_eq!(vad.state(), VadState::Silence);
        assert_eq!(vad.silence_run(), 0);
    }

    #[test]
    fn test_voice_frame_transitions_once() {
        let mut vad = settled();
        assert_eq!(vad.update(true), Some(VadState::Voice));
        assert_eq!(vad.update(true), None);
        assert_eq!(vad.update(true), None);
    }

    #[test]
    fn test_three_silent_frames_keep_voice() {
        let mut vad = settled();
        vad.update(true);
        for _ in 0..3 {
            assert_eq!(vad.update(false), None);
        }
        assert_eq!(vad.state(), VadState::Voice);
    }

    #[test]
    fn test_fifth_silent_frame_flips_to_silence() {
        let mut vad = settled();
        vad.update(true);
        for i in 0..4 {
            assert_eq!(vad.update(false), None, "silent frame {} should not flip", i + 1);
        }
        assert_eq!(vad.state(), VadState::Voice);
        assert_eq!(vad.update(false), Some(VadState::Silence));
        for _ in 0..50 {
            assert_eq!(vad.update(false), None);
        }
    }

    #[test]
    fn test_short_pause_does_not_flicker() {
        let mut vad = settled();
        assert_eq!(vad.update(true), Some(VadState::Voice));
        for _ in 0..20 {
            for _ in 0..4 {
                assert_eq!(vad.update(false), None);
            }
            assert_eq!(vad.update(true), None);
        }
    }

    #[test]
    fn test_stream_start_reads_as_voice_until_hangover() {
        let mut vad = VadDecision::new();
        assert_eq!(vad.update(false), Some(VadState::Voice));
        for _ in 0..3 {
            assert_eq!(vad.update(false), None);
        }
        assert_eq!(vad.update(false), Some(VadState::Silence));
    }

    #[test]
    fn test_silence_run_saturates() {
        let mut vad = VadDecision::new();
        vad.silence_run = u32::MAX - 1;
        vad.update(false);
        vad.update(false);
        assert_eq!(vad.silence_run(), u32::MAX);
        assert_eq!(vad.state(), VadState::Silence);
    }
}
