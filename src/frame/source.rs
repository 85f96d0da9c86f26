//! Pull-based frame sources.
//!
//! A source is any iterator of `Result<Frame, DecodeError>`. It yields frames
//! in timestamp order, ends the sequence at end of stream, and reports a
//! decode failure as an `Err` item after which nothing more is read.

use super::types::{Frame, FrameError};

/// A lazy, finite sequence of decoded frames.
pub trait FrameSource: Iterator<Item = Result<Frame, DecodeError>> {}

impl<T> FrameSource for T where T: Iterator<Item = Result<Frame, DecodeError>> {}

/// Errors surfaced by a frame source.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("FFmpeg not found. Please install ffmpeg (and ffprobe) and make sure it is on PATH")]
    FfmpegNotFound,
    #[error("failed to spawn decoder: {0}")]
    SpawnFailed(#[source] std::io::Error),
    #[error("failed to read decoded frame data: {0}")]
    Io(#[source] std::io::Error),
    #[error("decoder exited with code {exit_code:?}: {stderr}")]
    ProcessFailed { exit_code: Option<i32>, stderr: String },
    #[error("could not determine video dimensions: {0}")]
    Probe(String),
    #[error("decoder produced an invalid frame: {0}")]
    InvalidFrame(#[from] FrameError),
    #[error("{0}")]
    Other(String),
}

/// An in-memory frame source, mostly useful for tests and synthetic input.
pub struct VecSource {
    items: std::vec::IntoIter<Result<Frame, DecodeError>>,
}

impl VecSource {
    /// A source yielding the given frames in order.
    pub fn new(frames: Vec<Frame>) -> Self {
        Self::from_results(frames.into_iter().map(Ok).collect())
    }

    /// A source yielding pre-built results, allowing failures to be injected.
    pub fn from_results(items: Vec<Result<Frame, DecodeError>>) -> Self {
        Self {
            items: items.into_iter(),
        }
    }
}

impl Iterator for VecSource {
    type Item = Result<Frame, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.items.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;

    #[test]
    fn test_vec_source_yields_in_order() {
        let frames = vec![
            Frame::solid(1, 1, Rgb::new(0, 0, 0), 0.0).unwrap(),
            Frame::solid(1, 1, Rgb::new(1, 1, 1), 0.5).unwrap(),
        ];
        let timestamps: Vec<f64> = VecSource::new(frames)
            .map(|f| f.unwrap().timestamp())
            .collect();
        assert_eq!(timestamps, vec![0.0, 0.5]);
    }

    #[test]
    fn test_vec_source_error_item() {
        let mut source = VecSource::from_results(vec![Err(DecodeError::Other("boom".into()))]);
        let err = source.next().unwrap().unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert!(source.next().is_none());
    }

    #[test]
    fn test_decode_error_display() {
        let msg = DecodeError::FfmpegNotFound.to_string();
        assert!(msg.contains("FFmpeg not found"));
        let msg = DecodeError::ProcessFailed {
            exit_code: Some(1),
            stderr: "Invalid data".into(),
        }
        .to_string();
        assert!(msg.contains("Some(1)"));
        assert!(msg.contains("Invalid data"));
    }
}
