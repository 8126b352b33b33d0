//! Frame adapter for bridging variable-size host blocks to fixed-size frames.
//!
//! Hosts deliver render quanta of whatever length they like (typically 128
//! samples); the pipeline only ever sees complete `FRAME_SIZE` frames.

use crate::constants::FRAME_SIZE;
use crate::emitter::{Emitter, MessageSink};
use crate::processor::{Frame, SpeechProcessor};
use ringbuf::traits::{Consumer, Observer, Producer};
use ringbuf::HeapRb;

/// Accumulates mono samples into `FRAME_SIZE` frames.
///
/// The ring buffer holds exactly one frame. Leftover samples stay buffered
/// across calls until the frame completes; a partial frame is never handed
/// downstream.
pub struct FrameAdapter {
    rb: HeapRb<f32>,
    frame: Frame,
    frames_completed: u64,
}

impl Default for FrameAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAdapter {
    pub fn new() -> Self {
        Self {
            rb: HeapRb::<f32>::new(FRAME_SIZE),
            frame: [0.0; FRAME_SIZE],
            frames_completed: 0,
        }
    }

    /// Appends a block, calling `on_frame` with a copy of every frame that
    /// completes along the way. Returns the number of frames completed.
    pub fn push<F>(&mut self, input: &[f32], mut on_frame: F) -> usize
    where
        F: FnMut(&Frame),
    {
        let mut remaining = input;
        let mut completed = 0;

        while !remaining.is_empty() {
            let pushed = self.rb.push_slice(remaining);
            remaining = &remaining[pushed..];

            if self.rb.is_full() {
                self.rb.pop_slice(&mut self.frame);
                on_frame(&self.frame);
                completed += 1;
            }
        }

        self.frames_completed += completed as u64;
        completed
    }

    /// Appends a block and runs every completed frame through `processor`,
    /// publishing the results through `emitter` in completion order.
    pub fn process_block<S: MessageSink>(
        &mut self,
        input: &[f32],
        processor: &mut SpeechProcessor,
        emitter: &mut Emitter<S>,
    ) -> usize {
        self.push(input, |frame| {
            let output = processor.process_frame(frame);
            emitter.emit(&output);
        })
    }

    /// Samples buffered toward the next frame.
    pub fn pending(&self) -> usize {
        self.rb.occupied_len()
    }

    pub fn frames_completed(&self) -> u64 {
        self.frames_completed
    }
}
