//! Resampling a timestamped frame stream to a fixed output rate.
//!
//! Output slot `i` is at `first_timestamp + i / fps` and shows the most
//! recent input frame whose timestamp is at or before that time. Faster
//! sources have frames dropped; slower sources have the last frame held.
//! When the source ends, a pending held frame that has not been shown yet
//! is flushed once and the sequence terminates.

use std::sync::Arc;

use log::debug;

use crate::frame::{DecodeError, Frame, FrameSource};

/// Tolerance for float error when comparing timestamps to slot times.
const SLOT_EPSILON: f64 = 1e-9;

/// One output slot of the governor.
#[derive(Debug, Clone)]
pub struct GovernedFrame {
    /// Zero-based output slot index.
    pub slot: u64,
    /// Slot time in seconds from stream start.
    pub timestamp: f64,
    pub frame: Arc<Frame>,
    /// True when this slot shows the same input frame as the previous slot.
    pub repeated: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum GovernorError {
    #[error("frame {index} has timestamp {timestamp}s, earlier than previous frame at {previous}s")]
    NonMonotonic {
        index: u64,
        previous: f64,
        timestamp: f64,
    },

    #[error("decoder failed at frame {index}: {source}")]
    Decode {
        index: u64,
        #[source]
        source: DecodeError,
    },
}

impl GovernorError {
    /// Index of the input frame the error refers to.
    pub fn frame_index(&self) -> u64 {
        match self {
            GovernorError::NonMonotonic { index, .. } | GovernorError::Decode { index, .. } => {
                *index
            }
        }
    }
}

/// Pull-based fixed-rate resampler over a [`FrameSource`].
pub struct RateGovernor<S> {
    source: S,
    fps: f64,
    origin: Option<f64>,
    held: Option<Arc<Frame>>,
    held_emitted: bool,
    pending: Option<Frame>,
    slot: u64,
    frames_read: u64,
    frames_dropped: u64,
    last_timestamp: Option<f64>,
    exhausted: bool,
    done: bool,
}

impl<S: FrameSource> RateGovernor<S> {
    /// `fps` must be finite and positive; configuration validates this.
    pub fn new(source: S, fps: f64) -> Self {
        Self {
            source,
            fps,
            origin: None,
            held: None,
            held_emitted: false,
            pending: None,
            slot: 0,
            frames_read: 0,
            frames_dropped: 0,
            last_timestamp: None,
            exhausted: false,
            done: false,
        }
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Input frames pulled from the source so far.
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Input frames replaced before they were ever shown.
    pub fn frames_dropped(&self) -> u64 {
        self.frames_dropped
    }

    fn pull(&mut self) -> Result<Option<Frame>, GovernorError> {
        if self.exhausted {
            return Ok(None);
        }
        let index = self.frames_read;
        match self.source.next() {
            None => {
                self.exhausted = true;
                Ok(None)
            }
            Some(Err(source)) => {
                self.exhausted = true;
                Err(GovernorError::Decode { index, source })
            }
            Some(Ok(frame)) => {
                self.frames_read += 1;
                let timestamp = frame.timestamp();
                if let Some(previous) = self.last_timestamp {
                    if timestamp < previous {
                        self.exhausted = true;
                        return Err(GovernorError::NonMonotonic {
                            index,
                            previous,
                            timestamp,
                        });
                    }
                }
                self.last_timestamp = Some(timestamp);
                Ok(Some(frame))
            }
        }
    }

    fn promote(&mut self, frame: Frame) {
        if self.held.is_some() && !self.held_emitted {
            self.frames_dropped += 1;
        }
        self.held = Some(Arc::new(frame));
        self.held_emitted = false;
    }

    fn step(&mut self) -> Result<Option<GovernedFrame>, GovernorError> {
        if self.origin.is_none() {
            match self.pull()? {
                Some(first) => {
                    self.origin = Some(first.timestamp());
                    self.pending = Some(first);
                }
                None => return Ok(None),
            }
        }
        let origin = self.origin.unwrap_or_default();

        loop {
            let slot_time = self.slot as f64 / self.fps;

            // Advance to the newest frame at or before this slot.
            loop {
                if self.pending.is_none() {
                    self.pending = self.pull()?;
                }
                match self.pending.take() {
                    Some(frame) if frame.timestamp() - origin <= slot_time + SLOT_EPSILON => {
                        self.promote(frame);
                    }
                    other => {
                        self.pending = other;
                        break;
                    }
                }
            }

            if self.pending.is_none() && self.exhausted {
                // End of stream: show the held frame once more only if it is new.
                if self.held_emitted {
                    return Ok(None);
                }
            }

            if let Some(held) = self.held.clone() {
                let governed = GovernedFrame {
                    slot: self.slot,
                    timestamp: slot_time,
                    frame: held,
                    repeated: self.held_emitted,
                };
                self.held_emitted = true;
                self.slot += 1;
                return Ok(Some(governed));
            }

            // No frame at or before this slot yet; skip ahead.
            self.slot += 1;
        }
    }
}

impl<S: FrameSource> Iterator for RateGovernor<S> {
    type Item = Result<GovernedFrame, GovernorError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.step() {
            Ok(Some(governed)) => {
                if governed.repeated {
                    debug!("slot {} holds previous frame", governed.slot);
                }
                Some(Ok(governed))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
