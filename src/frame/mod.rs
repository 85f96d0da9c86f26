//! Decoded frame types and frame sources.
//!
//! This module provides the pull-based input side of the pipeline:
//! - Frame data via [`Frame`]
//! - In-memory sources via [`VecSource`]
//! - ffmpeg-backed decoding via [`FfmpegSource`]

mod ffmpeg;
mod source;
mod types;

pub use ffmpeg::{probe_dimensions, FfmpegSource, FfmpegSettings};
pub use source::{DecodeError, FrameSource, VecSource};
pub use types::{Frame, FrameError, BYTES_PER_PIXEL};
