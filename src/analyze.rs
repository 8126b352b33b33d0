//! Offline processing of recorded WAV files through the live pipeline.

use crate::report::Reporter;
use anyhow::{bail, Context, Result};
use hound::{SampleFormat, WavReader};
use std::io::Write;
use std::path::Path;
use voxfront_core::constants::{FRAME_SIZE, SAMPLE_RATE};
use voxfront_core::{Emitter, FrameAdapter, FrontendMessage, SpeechProcessor};

/// What a file run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSummary {
    pub samples: usize,
    pub frames: u64,
    pub transitions: u64,
    pub noise_floor: f32,
    /// Trailing samples that never completed a frame.
    pub discarded: usize,
}

/// Reads a mono 16kHz WAV file as f32 samples in [-1, 1].
pub fn read_samples(path: &Path) -> Result<Vec<f32>> {
    let reader =
        WavReader::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let spec = reader.spec();
    if spec.channels != 1 || spec.sample_rate != SAMPLE_RATE {
        bail!(
            "{}: expected mono {}Hz, got {} channel(s) at {}Hz",
            path.display(),
            SAMPLE_RATE,
            spec.channels,
            spec.sample_rate
        );
    }

    let samples = match spec.sample_format {
        SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok(samples)
}

/// Feeds `samples` through a fresh pipeline in blocks of `block_size`, as a
/// host callback would, handing every message to `reporter`.
pub fn analyze_samples<W: Write>(
    samples: &[f32],
    block_size: usize,
    reporter: &mut Reporter<W>,
) -> Result<AnalysisSummary> {
    if block_size == 0 {
        bail!("Block size must be at least 1");
    }

    let mut processor = SpeechProcessor::new(SAMPLE_RATE)?;
    let mut adapter = FrameAdapter::new();
    let mut emitter = Emitter::new(Vec::<FrontendMessage>::with_capacity(4));

    for block in samples.chunks(block_size) {
        adapter.process_block(block, &mut processor, &mut emitter);
        for message in emitter.sink_mut().drain(..) {
            reporter.handle(&message)?;
        }
    }

    log::debug!(
        "Processed {} frames, noise floor {:.6}",
        emitter.pcm_frames(),
        processor.noise_floor()
    );

    Ok(AnalysisSummary {
        samples: samples.len(),
        frames: emitter.pcm_frames(),
        transitions: emitter.transitions(),
        noise_floor: processor.noise_floor(),
        discarded: adapter.pending(),
    })
}

pub fn analyze_file<W: Write>(
    path: &Path,
    block_size: usize,
    reporter: &mut Reporter<W>,
) -> Result<AnalysisSummary> {
    let samples = read_samples(path)?;
    log::info!(
        "Analyzing {} ({:.2}s, {} frames)",
        path.display(),
        samples.len() as f64 / SAMPLE_RATE as f64,
        samples.len() / FRAME_SIZE
    );
    analyze_samples(&samples, block_size, reporter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};
    use std::f32::consts::PI;
    use std::path::PathBuf;

    fn temp_wav(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("voxfront-{}-{}.wav", name, std::process::id()))
    }

    /// 0.5s silence, 0.5s tone, 0.5s silence.
    fn speechlike_clip() -> Vec<f32> {
        let mut samples = vec![0.0f32; 8000];
        samples.extend((0..8000).map(|n| 0.3 * (2.0 * PI * 500.0 * n as f32 / 16000.0).sin()));
        samples.extend(std::iter::repeat(0.0).take(8000));
        samples
    }

    #[test]
    fn test_summary_counts_frames_and_leftover() {
        let mut samples = speechlike_clip();
        samples.extend([0.0; 50]);
        let mut reporter = Reporter::new(Vec::new(), false);
        let summary = analyze_samples(&samples, 128, &mut reporter).unwrap();

        assert_eq!(summary.frames, 150);
        assert_eq!(summary.discarded, 50);
        assert_eq!(reporter.pcm_frames(), 150);
        // Start-up hangover, then the tone and its release
        assert_eq!(summary.transitions, 4);
        assert_eq!(reporter.transitions(), 4);
    }

    #[test]
    fn test_block_size_does_not_change_result() {
        let samples = speechlike_clip();
        let run = |block| {
            let mut reporter = Reporter::new(Vec::new(), true);
            let summary = analyze_samples(&samples, block, &mut reporter).unwrap();
            (summary, reporter.finish().unwrap())
        };
        let (a, out_a) = run(128);
        let (b, out_b) = run(160);
        let (c, out_c) = run(4000);
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(out_a, out_b);
        assert_eq!(out_a, out_c);
    }

    #[test]
    fn test_zero_block_size_rejected() {
        let mut reporter = Reporter::new(Vec::new(), false);
        assert!(analyze_samples(&[0.0; 320], 0, &mut reporter).is_err());
    }

    #[test]
    fn test_reads_int_wav() {
        let path = temp_wav("int");
        let spec = WavSpec {
            channels: 1,
            sample_rate: SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for v in [0i16, 16384, -16384, i16::MAX] {
            writer.write_sample(v).unwrap();
        }
        writer.finalize().unwrap();

        let samples = read_samples(&path).unwrap();
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[1], 0.5);
        assert_eq!(samples[2], -0.5);
        assert!(samples[3] < 1.0 && samples[3] > 0.99);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_rejects_wrong_format() {
        let path = temp_wav("stereo");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 48000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        writer.write_sample(0.0f32).unwrap();
        writer.write_sample(0.0f32).unwrap();
        writer.finalize().unwrap();

        let err = read_samples(&path).unwrap_err();
        assert!(err.to_string().contains("expected mono"), "{}", err);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_analyze_file_end_to_end() {
        let path = temp_wav("clip");
        let mut writer = WavWriter::create(&path, crate::report::output_spec()).unwrap();
        for s in speechlike_clip() {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let mut reporter = Reporter::new(Vec::new(), false);
        let summary = analyze_file(&path, 128, &mut reporter).unwrap();
        assert_eq!(summary.frames, 150);
        assert!(summary.noise_floor < 0.001, "floor={}", summary.noise_floor);

        let text = String::from_utf8(reporter.finish().unwrap()).unwrap();
        let labels: Vec<&str> = text.lines().map(|l| l.split_whitespace().last().unwrap()).collect();
        assert_eq!(labels, vec!["voice", "silence", "voice", "silence"]);
        let _ = std::fs::remove_file(&path);
    }
}
