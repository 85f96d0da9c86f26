//! Frame types and data structures.

use crate::color::Rgb;

/// Bytes per pixel for RGB24 data.
pub const BYTES_PER_PIXEL: usize = 3;

/// A decoded video frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Raw pixel data in RGB24 format, row-major
    data: Vec<u8>,
    /// Frame width in pixels
    width: u32,
    /// Frame height in pixels
    height: u32,
    /// Seconds since stream start
    timestamp: f64,
}

impl Frame {
    /// Create a frame, checking that the buffer matches the dimensions.
    pub fn new(data: Vec<u8>, width: u32, height: u32, timestamp: f64) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::EmptyDimensions { width, height });
        }
        if !timestamp.is_finite() || timestamp < 0.0 {
            return Err(FrameError::InvalidTimestamp(timestamp));
        }
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(FrameError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            timestamp,
        })
    }

    /// Create a frame filled with a single color.
    pub fn solid(width: u32, height: u32, color: Rgb, timestamp: f64) -> Result<Self, FrameError> {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * BYTES_PER_PIXEL);
        for _ in 0..pixels {
            data.extend_from_slice(&[color.r, color.g, color.b]);
        }
        Self::new(data, width, height, timestamp)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// Raw RGB24 bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Color of the pixel at (x, y). Coordinates must be in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        let idx = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        Rgb::new(self.data[idx], self.data[idx + 1], self.data[idx + 2])
    }

    /// Overwrite the pixel at (x, y). Coordinates must be in bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgb) {
        let idx = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        self.data[idx] = color.r;
        self.data[idx + 1] = color.g;
        self.data[idx + 2] = color.b;
    }

    /// Same pixels, different timestamp.
    pub fn with_timestamp(mut self, timestamp: f64) -> Result<Self, FrameError> {
        if !timestamp.is_finite() || timestamp < 0.0 {
            return Err(FrameError::InvalidTimestamp(timestamp));
        }
        self.timestamp = timestamp;
        Ok(self)
    }
}

/// Errors that can occur when constructing a frame.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    #[error("frame has empty dimensions {width}x{height}")]
    EmptyDimensions { width: u32, height: u32 },
    #[error("frame buffer holds {actual} bytes, expected {expected} for RGB24")]
    BufferSize { expected: usize, actual: usize },
    #[error("frame timestamp {0} is not a finite non-negative number of seconds")]
    InvalidTimestamp(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_new_valid() {
        let frame = Frame::new(vec![0; 12], 2, 2, 0.5).unwrap();
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.timestamp(), 0.5);
        assert_eq!(frame.data().len(), 12);
    }

    #[test]
    fn test_frame_buffer_mismatch() {
        let err = Frame::new(vec![0; 11], 2, 2, 0.0).unwrap_err();
        assert_eq!(
            err,
            FrameError::BufferSize {
                expected: 12,
                actual: 11
            }
        );
        assert!(err.to_string().contains("expected 12"));
    }

    #[test]
    fn test_frame_empty_dimensions() {
        assert!(matches!(
            Frame::new(Vec::new(), 0, 4, 0.0),
            Err(FrameError::EmptyDimensions { .. })
        ));
    }

    #[test]
    fn test_frame_rejects_negative_timestamp() {
        assert!(matches!(
            Frame::new(vec![0; 3], 1, 1, -1.0),
            Err(FrameError::InvalidTimestamp(_))
        ));
        assert!(matches!(
            Frame::new(vec![0; 3], 1, 1, f64::NAN),
            Err(FrameError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_pixel_access() {
        let mut frame = Frame::solid(3, 2, Rgb::new(1, 2, 3), 0.0).unwrap();
        assert_eq!(frame.pixel(2, 1), Rgb::new(1, 2, 3));
        frame.set_pixel(2, 1, Rgb::new(9, 8, 7));
        assert_eq!(frame.pixel(2, 1), Rgb::new(9, 8, 7));
        assert_eq!(frame.pixel(0, 0), Rgb::new(1, 2, 3));
    }
}
