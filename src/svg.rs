//! # SVG Chord Diagrams
//!
//! Renders a [`PixelLayout`] as a standalone `<svg>` element built only from
//! `<circle>` and `<line>` primitives, safe to inline into HTML.
//!
//! ## Drawing Order
//! 1. Tonic backdrop (absolute diagrams only), large low-contrast circles
//! 2. A line between every pair of chord tones closer than 1.5 columns
//! 3. One filled circle per chord tone
//! 4. The bass marker, a ring, unless the bass is already the leftmost tone
//!
//! ## Example
//! ```rust
//! use tonnetz::{chord_svg, parse_chord, DiagramStyle, Theme};
//!
//! let svg = chord_svg(&parse_chord("Am7").unwrap(), DiagramStyle::Absolute, Theme::Light);
//! assert!(svg.starts_with("<svg class=\"chord-icon\""));
//! assert_eq!(svg.matches("<circle").count(), 6 + 4);
//! ```

use crate::chord::Chord;
use crate::tonnetz::{DiagramStyle, LatticeLayout, Pixel, PixelLayout, HORIZONTAL_DISTANCE};
use serde::{Deserialize, Serialize};

const TONIC_RADIUS: f64 = 90.0;
const CHORD_RADIUS: f64 = 70.0;
const BASS_INNER_RADIUS: f64 = TONIC_RADIUS * 0.3;
const LINE_WIDTH: f64 = 50.0;
/// Tones closer than this many columns are joined by a line.
const LINE_REACH: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Fill colors for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub chord: &'static str,
    pub tonic: &'static str,
    /// Matches the page background so the bass ring reads as hollow.
    pub bass_inner: &'static str,
}

const DARK: Palette = Palette {
    chord: "#d7d7d7ff",
    tonic: "#646464ff",
    bass_inner: "#1e1e1e",
};

const LIGHT: Palette = Palette {
    chord: "#333333",
    tonic: "#BDBDBD",
    bass_inner: "white",
};

impl Theme {
    /// Case-insensitive lookup of `"dark"` or `"light"`.
    pub fn from_name(name: &str) -> Option<Theme> {
        match name.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Dark => DARK,
            Theme::Light => LIGHT,
        }
    }
}

/// Render pixel positions as SVG markup.
pub fn render_svg(layout: &PixelLayout, theme: Theme) -> String {
    let palette = theme.palette();
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg class=\"chord-icon\" viewBox=\"0 0 {w} {h}\" data-w=\"{w}\" data-h=\"{h}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        w = layout.width,
        h = layout.height
    ));

    for point in &layout.tonic {
        svg.push_str(&circle(point, TONIC_RADIUS, palette.tonic));
    }

    for (i, from) in layout.tones.iter().enumerate() {
        for to in &layout.tones[i + 1..] {
            if from.distance(to) < LINE_REACH * HORIZONTAL_DISTANCE {
                svg.push_str(&format!(
                    "  <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" stroke-width=\"{}\" />\n",
                    from.x, from.y, to.x, to.y, palette.chord, LINE_WIDTH
                ));
            }
        }
    }

    for point in &layout.tones {
        svg.push_str(&circle(point, CHORD_RADIUS, palette.chord));
    }

    let leftmost_tone = layout
        .tones
        .iter()
        .map(|p| p.x)
        .fold(f64::INFINITY, f64::min);
    if layout.bass.x != leftmost_tone {
        svg.push_str(&circle(&layout.bass, CHORD_RADIUS, palette.chord));
        svg.push_str(&circle(&layout.bass, BASS_INNER_RADIUS, palette.bass_inner));
    }

    svg.push_str("</svg>");
    svg
}

fn circle(point: &Pixel, radius: f64, fill: &str) -> String {
    format!(
        "  <circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"{}\" />\n",
        point.x, point.y, radius, fill
    )
}

/// Lay out and render one chord.
pub fn chord_svg(chord: &Chord<'_>, style: DiagramStyle, theme: Theme) -> String {
    render_svg(&LatticeLayout::new(chord, style).to_pixels(), theme)
}
