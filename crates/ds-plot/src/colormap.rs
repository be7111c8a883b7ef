use std::fmt;
use std::str::FromStr;

use ds_core::errors::{DsError, ErrorInfo};
use plotters::style::RGBColor;
use serde::{Deserialize, Serialize};

const VIRIDIS_ANCHORS: [(f64, f64, f64); 5] = [
    (68.0, 1.0, 84.0),
    (59.0, 82.0, 139.0),
    (33.0, 145.0, 140.0),
    (94.0, 201.0, 98.0),
    (253.0, 231.0, 37.0),
];

/// Sequential colormaps for surface heights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Colormap {
    /// Blue to green.
    Winter,
    /// Magenta to yellow.
    Spring,
    /// Green to yellow.
    Summer,
    /// Red to yellow.
    Autumn,
    /// Cyan to magenta.
    Cool,
    /// Perceptually uniform purple to yellow.
    Viridis,
}

impl Colormap {
    /// Every colormap.
    pub const ALL: [Colormap; 6] = [
        Colormap::Winter,
        Colormap::Spring,
        Colormap::Summer,
        Colormap::Autumn,
        Colormap::Cool,
        Colormap::Viridis,
    ];

    /// Color at normalised position `t`, clamped to `[0, 1]`. NaN maps to 0.
    pub fn color_at(self, t: f64) -> RGBColor {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let (r, g, b) = match self {
            Colormap::Winter => (0.0, t, 1.0 - 0.5 * t),
            Colormap::Spring => (1.0, t, 1.0 - t),
            Colormap::Summer => (t, 0.5 + 0.5 * t, 0.4),
            Colormap::Autumn => (1.0, t, 0.0),
            Colormap::Cool => (t, 1.0 - t, 1.0),
            Colormap::Viridis => return viridis(t),
        };
        RGBColor(channel(r), channel(g), channel(b))
    }

    /// Lowercase name.
    pub fn label(self) -> &'static str {
        match self {
            Colormap::Winter => "winter",
            Colormap::Spring => "spring",
            Colormap::Summer => "summer",
            Colormap::Autumn => "autumn",
            Colormap::Cool => "cool",
            Colormap::Viridis => "viridis",
        }
    }
}

fn channel(unit: f64) -> u8 {
    (unit * 255.0).round().clamp(0.0, 255.0) as u8
}

fn viridis(t: f64) -> RGBColor {
    let scaled = t * (VIRIDIS_ANCHORS.len() - 1) as f64;
    let lower = (scaled.floor() as usize).min(VIRIDIS_ANCHORS.len() - 2);
    let weight = scaled - lower as f64;
    let (r0, g0, b0) = VIRIDIS_ANCHORS[lower];
    let (r1, g1, b1) = VIRIDIS_ANCHORS[lower + 1];
    let mix = |a: f64, b: f64| (a + (b - a) * weight).round().clamp(0.0, 255.0) as u8;
    RGBColor(mix(r0, r1), mix(g0, g1), mix(b0, b1))
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Colormap {
    type Err = DsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|cmap| cmap.label() == s)
            .ok_or_else(|| {
                DsError::Plot(
                    ErrorInfo::new("plot-colormap", "unknown colormap")
                        .with_context("value", s)
                        .with_hint("expected winter, spring, summer, autumn, cool or viridis"),
                )
            })
    }
}
