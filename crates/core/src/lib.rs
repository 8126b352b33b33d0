pub mod agc;
pub mod calibration;
pub mod constants;
pub mod emitter;
pub mod features;
pub mod filter;
pub mod frame_adapter;
pub mod processor;
pub mod vad;

pub use emitter::{ChannelSink, Emitter, FrontendMessage, MessageSink};
pub use frame_adapter::FrameAdapter;
pub use processor::{Frame, FrameOutput, SpeechProcessor};
pub use vad::VadState;
