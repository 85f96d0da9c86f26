//! CLI enum types for color depth and distance metric options.

use clap::ValueEnum;

use crate::color::{ColorDepth, DistanceMetric};

/// Output color depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Colors {
    /// 16 ANSI colors
    #[value(name = "16")]
    Ansi16,
    /// xterm 256-color palette
    #[value(name = "256")]
    Xterm256,
    /// 24-bit color
    Truecolor,
}

impl From<Colors> for ColorDepth {
    fn from(c: Colors) -> Self {
        match c {
            Colors::Ansi16 => ColorDepth::Ansi16,
            Colors::Xterm256 => ColorDepth::Xterm256,
            Colors::Truecolor => ColorDepth::TrueColor,
        }
    }
}

/// Color distance used to decide whether a cell changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Metric {
    /// Euclidean RGB distance
    Rgb,
    /// Perceptual CIE76 distance
    Lab,
}

impl From<Metric> for DistanceMetric {
    fn from(m: Metric) -> Self {
        match m {
            Metric::Rgb => DistanceMetric::Rgb,
            Metric::Lab => DistanceMetric::Lab,
        }
    }
}
