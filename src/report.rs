//! Consumer side of the front-end: turns emitted messages into terminal
//! output and, optionally, a WAV recording of the normalized stream.

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use voxfront_core::constants::{FRAME_SIZE, SAMPLE_RATE};
use voxfront_core::FrontendMessage;

/// 32-bit float mono at the pipeline rate.
pub fn output_spec() -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    }
}

/// Milliseconds from stream start to the start of frame `index`.
pub fn frame_timestamp_ms(index: u64) -> u64 {
    index * FRAME_SIZE as u64 * 1000 / SAMPLE_RATE as u64
}

pub struct Reporter<W: Write> {
    out: W,
    json: bool,
    pcm_frames: u64,
    transitions: u64,
    recorder: Option<WavWriter<BufWriter<File>>>,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, json: bool) -> Self {
        Self {
            out,
            json,
            pcm_frames: 0,
            transitions: 0,
            recorder: None,
        }
    }

    /// Also writes every PCM frame to a WAV file at `path`.
    pub fn record_to(&mut self, path: &Path) -> Result<()> {
        let writer = WavWriter::create(path, output_spec())
            .with_context(|| format!("Failed to create {}", path.display()))?;
        self.recorder = Some(writer);
        Ok(())
    }

    /// JSON mode prints every message on its own line in wire format; text
    /// mode prints only VAD transitions.
    pub fn handle(&mut self, message: &FrontendMessage) -> Result<()> {
        if self.json {
            serde_json::to_writer(&mut self.out, message)?;
            writeln!(self.out)?;
        }

        match message {
            FrontendMessage::Pcm { data } => {
                if let Some(writer) = self.recorder.as_mut() {
                    for &sample in data.iter() {
                        writer.write_sample(sample)?;
                    }
                }
                self.pcm_frames += 1;
            }
            FrontendMessage::Vad { voice } => {
                self.transitions += 1;
                if !self.json {
                    // The transition belongs to the frame just emitted
                    let at = frame_timestamp_ms(self.pcm_frames.saturating_sub(1));
                    let label = if *voice { "voice" } else { "silence" };
                    writeln!(self.out, "{:>8.2}s  {}", at as f64 / 1000.0, label)?;
                }
            }
        }
        Ok(())
    }

    pub fn pcm_frames(&self) -> u64 {
        self.pcm_frames
    }

    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    /// Flushes output and finalizes the recording, if any.
    pub fn finish(mut self) -> Result<W> {
        if let Some(writer) = self.recorder.take() {
            writer.finalize().context("Failed to finalize WAV recording")?;
        }
        self.out.flush()?;
        Ok(self.out)
    }
}
