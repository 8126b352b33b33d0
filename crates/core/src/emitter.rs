//! Output messages and their delivery to the host.
//!
//! Two message types exist: the normalized PCM frame, sent for every frame,
//! and the VAD flag, sent only on a debounced transition. Delivery never
//! blocks; a sink that cannot take a message drops it.

use crate::processor::{Frame, FrameOutput};
use crossbeam_channel::{Sender, TrySendError};
use serde::{Serialize, Serializer};

/// Message published to the downstream consumer.
///
/// Serializes as `{"type":"pcm","data":[...]}` or `{"type":"vad","voice":true}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FrontendMessage {
    Pcm {
        #[serde(serialize_with = "serialize_frame")]
        data: Frame,
    },
    Vad {
        voice: bool,
    },
}

fn serialize_frame<S: Serializer>(frame: &Frame, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(frame.iter())
}

/// Destination for emitted messages.
pub trait MessageSink {
    /// Delivers a message without blocking. Returns `false` if it was dropped.
    fn send(&mut self, message: FrontendMessage) -> bool;
}

impl MessageSink for Vec<FrontendMessage> {
    fn send(&mut self, message: FrontendMessage) -> bool {
        self.push(message);
        true
    }
}

/// Sink backed by a crossbeam channel, used to leave the audio callback.
///
/// A full channel drops the message. A disconnected receiver disables the
/// sink for the rest of the stream.
pub struct ChannelSink {
    sender: Option<Sender<FrontendMessage>>,
}

impl ChannelSink {
    pub fn new(sender: Sender<FrontendMessage>) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.sender.is_some()
    }
}

impl MessageSink for ChannelSink {
    fn send(&mut self, message: FrontendMessage) -> bool {
        let Some(sender) = &self.sender else {
            return false;
        };
        match sender.try_send(message) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => false,
            Err(TrySendError::Disconnected(_)) => {
                log::warn!("Message receiver disconnected, disabling sender");
                self.sender = None;
                false
            }
        }
    }
}

/// Publishes each processed frame to a sink, PCM first, then the VAD
/// transition if the frame caused one.
pub struct Emitter<S: MessageSink> {
    sink: S,
    pcm_frames: u64,
    transitions: u64,
    dropped: u64,
}

impl<S: MessageSink> Emitter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            pcm_frames: 0,
            transitions: 0,
            dropped: 0,
        }
    }

    pub fn emit(&mut self, output: &FrameOutput) {
        self.deliver(FrontendMessage::Pcm { data: output.pcm });
        self.pcm_frames += 1;

        if let Some(voice) = output.vad_transition {
            self.deliver(FrontendMessage::Vad { voice });
            self.transitions += 1;
        }
    }

    fn deliver(&mut self, message: FrontendMessage) {
        if !self.sink.send(message) {
            self.dropped += 1;
        }
    }

    pub fn pcm_frames(&self) -> u64 {
        self.pcm_frames
    }

    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
