//! Color distance metrics.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use super::palette::Rgb;

/// Largest possible Euclidean distance between two RGB colors (black to white).
pub const MAX_RGB_DISTANCE: f64 = 441.672_955_930_063_7;

/// How the differencer measures the change between two colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Euclidean distance in RGB space (0.0 to ~441.67)
    Rgb,
    /// CIE76 ΔE in L*a*b* space; roughly 2.3 is a just-noticeable difference
    #[default]
    Lab,
}

impl DistanceMetric {
    pub fn distance(&self, a: Rgb, b: Rgb) -> f64 {
        if a == b {
            return 0.0;
        }
        match self {
            DistanceMetric::Rgb => (squared_distance(a, b) as f64).sqrt(),
            DistanceMetric::Lab => {
                let (l1, a1, b1) = rgb_to_lab(a);
                let (l2, a2, b2) = rgb_to_lab(b);
                ((l1 - l2).powi(2) + (a1 - a2).powi(2) + (b1 - b2).powi(2)).sqrt()
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::Rgb => "rgb",
            DistanceMetric::Lab => "lab",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rgb" | "euclidean" => Ok(DistanceMetric::Rgb),
            "lab" | "cie76" => Ok(DistanceMetric::Lab),
            other => Err(format!(
                "unknown distance metric '{}'. Expected one of: rgb, lab",
                other
            )),
        }
    }
}

/// Squared Euclidean RGB distance. Exact, so ties compare equal.
pub fn squared_distance(a: Rgb, b: Rgb) -> u32 {
    let dr = a.r as i32 - b.r as i32;
    let dg = a.g as i32 - b.g as i32;
    let db = a.b as i32 - b.b as i32;
    (dr * dr + dg * dg + db * db) as u32
}

/// Convert sRGB to CIE L*a*b* under the D65 white point.
pub fn rgb_to_lab(rgb: Rgb) -> (f64, f64, f64) {
    fn linearize(c: u8) -> f64 {
        let c = c as f64 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    }
    fn f(t: f64) -> f64 {
        if t > 0.008856 {
            t.cbrt()
        } else {
            7.787 * t + 16.0 / 116.0
        }
    }

    let r = linearize(rgb.r);
    let g = linearize(rgb.g);
    let b = linearize(rgb.b);

    let x = (r * 0.4124564 + g * 0.3575761 + b * 0.1804375) / 0.95047;
    let y = r * 0.2126729 + g * 0.7151522 + b * 0.0721750;
    let z = (r * 0.0193339 + g * 0.1191920 + b * 0.9503041) / 1.08883;

    let (fx, fy, fz) = (f(x), f(y), f(z));
    (116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
}
