use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Sender;
use log::{info, warn};
use std::sync::atomic::AtomicU32;
use std::sync::Arc;
use voxfront_core::constants::SAMPLE_RATE;
use voxfront_core::{ChannelSink, Emitter, FrameAdapter, FrontendMessage, SpeechProcessor};

/// Live capture engine.
///
/// The whole front-end runs synchronously inside the cpal input callback:
/// each callback block is accumulated into frames, and every completed frame
/// is processed and emitted before the callback returns. Messages leave the
/// audio thread through a bounded channel and are dropped rather than waited
/// on when the consumer falls behind. Dropping the engine stops the stream
/// and discards any partial frame.
pub struct CaptureEngine {
    _input_stream: cpal::Stream,

    // Shared state for monitoring
    pub volume_level: Arc<AtomicU32>,
    pub gain_level: Arc<AtomicU32>,
}

impl CaptureEngine {
    /// Opens `input_device_name` ("default" for the host default) as a mono
    /// 16kHz stream and starts processing into `sender`.
    pub fn start(input_device_name: &str, sender: Sender<FrontendMessage>) -> Result<Self> {
        let host = cpal::default_host();
        info!("Audio host: {}", host.id().name());

        let input_device = if input_device_name == "default" {
            host.default_input_device()
                .context("No default input found")?
        } else {
            host.input_devices()?
                .find(|d| d.name().ok().as_deref() == Some(input_device_name))
                .context("Input device not found")?
        };
        info!(
            "Using input device: {}",
            input_device.name().unwrap_or_default()
        );

        let config = cpal::StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(SAMPLE_RATE),
            buffer_size: cpal::BufferSize::Default,
        };

        let mut processor = SpeechProcessor::new(SAMPLE_RATE)?;
        let volume_level = processor.volume_level.clone();
        let gain_level = processor.gain_level.clone();

        let mut adapter = FrameAdapter::new();
        let mut emitter = Emitter::new(ChannelSink::new(sender));

        let input_stream = input_device
            .build_input_stream(
                &config,
                move |data: &[f32], _| {
                    adapter.process_block(data, &mut processor, &mut emitter);
                },
                |err| warn!("Input error: {}", err),
                None,
            )
            .context("Failed to open input stream (device must support 16kHz mono)")?;

        input_stream.play()?;
        info!("Capture started at {}Hz", SAMPLE_RATE);

        Ok(Self {
            _input_stream: input_stream,
            volume_level,
            gain_level,
        })
    }
}

/// Names of all input devices on the default host.
pub fn input_device_names() -> Result<Vec<String>> {
    let host = cpal::default_host();
    let names = host
        .input_devices()?
        .map(|d| d.name().unwrap_or("Unknown".to_string()))
        .collect();
    Ok(names)
}
