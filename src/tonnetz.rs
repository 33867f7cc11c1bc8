//! # Tonnetz Layout
//!
//! Places a chord's tones on a triangular pitch lattice (a tonnetz) and
//! projects the result to pixel coordinates for [`crate::svg`].
//!
//! ## Lattice
//! A point is `(row, col)`. Moving one column right is a fifth, moving one
//! row down is a major third, so each row has a period of three columns
//! before it wraps into the next row (`(r, c + 3)` equals `(r + 1, c)` an
//! octave away). Rows are sheared by half a unit when drawn, which makes
//! the grid triangular:
//!
//! ```text
//!   row 0:  C   G   D
//!   row 1:    E   B   F#
//!   row 2:      G#  D#  A#
//! ```
//!
//! ## Styles
//! - [`DiagramStyle::Absolute`]: tones are translated by the root's lattice
//!   position and drawn over a fixed six-point tonic backdrop, so the same
//!   chord always lands in the same spot relative to the key.
//! - [`DiagramStyle::Shape`]: the bare shape of the chord type, moved to the
//!   vertical position where its best-connected tones sit in the middle rows.
//!
//! Octave-equivalent positions are resolved by scoring a few candidate
//! shifts against a small reward grid; the first best candidate wins.

use crate::chord::Chord;
use crate::vocabulary::TableCoord;
use serde::Serialize;
use std::ops::Add;

/// Horizontal distance between lattice columns, in SVG units.
pub const HORIZONTAL_DISTANCE: f64 = 200.0;
/// Horizontal shear per row.
pub const ROW_SHIFT: f64 = -HORIZONTAL_DISTANCE / 2.0;
/// Margin around the outermost circle centers.
pub const PADDING: f64 = 95.0;
/// Visible lattice rows; fixes the diagram height.
pub const CANVAS_ROWS: f64 = 5.0;

/// Vertical distance between lattice rows (equilateral triangles).
pub fn vertical_distance() -> f64 {
    HORIZONTAL_DISTANCE * 3f64.sqrt() / 2.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LatticePoint {
    pub row: i32,
    pub col: i32,
}

impl LatticePoint {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Neighbors share an edge of the sheared grid: same row one column
    /// apart, the row below at the same or next column, or the row above at
    /// the same or previous column.
    pub fn is_adjacent(&self, other: &LatticePoint) -> bool {
        let dr = other.row - self.row;
        let dc = other.col - self.col;
        match dr {
            0 => dc.abs() == 1,
            1 => dc == 0 || dc == 1,
            -1 => dc == 0 || dc == -1,
            _ => false,
        }
    }
}

impl Add for LatticePoint {
    type Output = LatticePoint;

    fn add(self, other: LatticePoint) -> LatticePoint {
        LatticePoint::new(self.row + other.row, self.col + other.col)
    }
}

impl From<TableCoord> for LatticePoint {
    fn from([row, col]: TableCoord) -> Self {
        LatticePoint::new(row, col)
    }
}

/// The three octave-equivalent displacements, in preference order.
const OCTAVE_SHIFTS: [LatticePoint; 3] = [
    LatticePoint::new(0, 0),
    LatticePoint::new(-1, 3),
    LatticePoint::new(1, -3),
];

/// Six-point backdrop marking the tonic region in absolute diagrams.
pub const TONIC_POINTS: [LatticePoint; 6] = [
    LatticePoint::new(0, 0),
    LatticePoint::new(1, 0),
    LatticePoint::new(0, 1),
    LatticePoint::new(1, 1),
    LatticePoint::new(0, 2),
    LatticePoint::new(1, 2),
];

/// Where scored points are anchored inside the reward grids.
const REWARD_ANCHOR: LatticePoint = LatticePoint::new(1, 2);

type RewardGrid = [[f64; 8]; 4];

/// Favors the middle two rows, slightly right of the tonic backdrop.
const OCTAVE_REWARDS: RewardGrid = [
    [0.0, 0.0, 0.2, 0.2, 0.2, 0.3, 0.0, 0.0],
    [0.3, 0.5, 1.0, 1.0, 1.0, 0.8, 0.0, 0.0],
    [0.0, 0.5, 1.0, 1.0, 1.0, 0.7, 0.0, 0.0],
    [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
];

/// Rows only: keeps shapes vertically centered.
const SHAPE_REWARDS: RewardGrid = [
    [0.0; 8],
    [1.0; 8],
    [1.1; 8],
    [0.0; 8],
];

/// Lattice point of an interval given in the chord-table units.
///
/// The interval is folded onto `q` in `-3..9`, which covers rows -1 to 2.
pub fn interval_to_point(interval: i32) -> LatticePoint {
    let q = (7 * interval + 3).rem_euclid(12) - 3;
    LatticePoint::new(q.div_euclid(3), q.rem_euclid(3))
}

/// Octave-equivalent position of the bass closest to any chord tone.
pub fn bass_point(bass: i32, tones: &[LatticePoint]) -> LatticePoint {
    let base = interval_to_point(bass);
    let mut best = base;
    let mut best_distance = f64::INFINITY;
    for shift in OCTAVE_SHIFTS {
        let candidate = base + shift;
        for tone in tones {
            let dr = (candidate.row - tone.row) as f64;
            let dc = (candidate.col - tone.col) as f64;
            let distance = (dr * dr + dc * dc).sqrt();
            if distance < best_distance {
                best_distance = distance;
                best = candidate;
            }
        }
    }
    best
}

/// Number of other tones each tone is adjacent to.
pub fn neighbor_counts(points: &[LatticePoint]) -> Vec<usize> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            points
                .iter()
                .enumerate()
                .filter(|(j, q)| *j != i && p.is_adjacent(q))
                .count()
        })
        .collect()
}

/// First shift with the highest weighted reward.
fn best_shift(
    points: &[LatticePoint],
    weights: &[f64],
    shifts: impl IntoIterator<Item = LatticePoint>,
    rewards: &RewardGrid,
) -> LatticePoint {
    let mut best = LatticePoint::new(0, 0);
    let mut best_reward = -1.0;
    for shift in shifts {
        let reward: f64 = points
            .iter()
            .zip(weights)
            .map(|(p, w)| reward_at(rewards, *p + shift + REWARD_ANCHOR) * w)
            .sum();
        if reward > best_reward {
            best_reward = reward;
            best = shift;
        }
    }
    best
}

fn reward_at(rewards: &RewardGrid, p: LatticePoint) -> f64 {
    usize::try_from(p.row)
        .ok()
        .zip(usize::try_from(p.col).ok())
        .and_then(|(r, c)| rewards.get(r).and_then(|row| row.get(c)))
        .copied()
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramStyle {
    /// Positioned by root, over the tonic backdrop.
    #[default]
    Absolute,
    /// The chord type's shape alone.
    Shape,
}

/// Resolved lattice positions of a chord diagram.
///
/// All points are normalized so the smallest row and column are zero.
/// `row_origin` is the lattice row that normalized row 0 came from; the
/// pixel projection uses it to keep rows at a fixed height on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatticeLayout {
    pub style: DiagramStyle,
    pub tones: Vec<LatticePoint>,
    pub bass: LatticePoint,
    /// Empty for [`DiagramStyle::Shape`].
    pub tonic: Vec<LatticePoint>,
    pub row_origin: i32,
}

impl LatticeLayout {
    pub fn new(chord: &Chord<'_>, style: DiagramStyle) -> Self {
        let chord_type = chord.chord_type;
        let mut tones: Vec<LatticePoint> = match &chord_type.coords {
            Some(coords) => coords.iter().copied().map(LatticePoint::from).collect(),
            None => chord_type.intervals.iter().copied().map(interval_to_point).collect(),
        };
        let mut bass = match chord_type.bass_coord {
            Some(coord) => LatticePoint::from(coord),
            None => bass_point(chord.bass, &tones),
        };

        let shift = match style {
            DiagramStyle::Absolute => {
                let root = interval_to_point(chord.root as i32 * 7);
                for tone in tones.iter_mut() {
                    *tone = *tone + root;
                }
                bass = bass + root;
                let weights = vec![1.0; tones.len()];
                best_shift(&tones, &weights, OCTAVE_SHIFTS, &OCTAVE_REWARDS)
            }
            DiagramStyle::Shape => {
                let weights: Vec<f64> = neighbor_counts(&tones).into_iter().map(|n| n as f64).collect();
                let shifts = (-4..=4).map(|row| LatticePoint::new(row, 2));
                best_shift(&tones, &weights, shifts, &SHAPE_REWARDS)
            }
        };
        for tone in tones.iter_mut() {
            *tone = *tone + shift;
        }
        bass = bass + shift;

        let mut tonic = match style {
            DiagramStyle::Absolute => TONIC_POINTS.to_vec(),
            DiagramStyle::Shape => Vec::new(),
        };

        let drawn = || std::iter::once(&bass).chain(&tones).chain(&tonic);
        let min_row = drawn().map(|p| p.row).min().unwrap_or(0);
        let min_col = drawn().map(|p| p.col).min().unwrap_or(0);
        let origin = LatticePoint::new(-min_row, -min_col);

        bass = bass + origin;
        for point in tones.iter_mut().chain(tonic.iter_mut()) {
            *point = *point + origin;
        }

        LatticeLayout {
            style,
            tones,
            bass,
            tonic,
            row_origin: min_row,
        }
    }

    /// Project the lattice points to SVG coordinates.
    pub fn to_pixels(&self) -> PixelLayout {
        let v = vertical_distance();
        let raw_x = |p: &LatticePoint| HORIZONTAL_DISTANCE * p.col as f64 + ROW_SHIFT * p.row as f64;

        let drawn = || std::iter::once(&self.bass).chain(&self.tones).chain(&self.tonic);
        let min_x = drawn().map(raw_x).fold(f64::INFINITY, f64::min);
        let max_x = drawn().map(raw_x).fold(f64::NEG_INFINITY, f64::max);

        let project = |p: &LatticePoint| Pixel {
            x: raw_x(p) - min_x + PADDING,
            y: v * p.row as f64 - (-self.row_origin - 2) as f64 * v + PADDING,
        };

        PixelLayout {
            width: max_x - min_x + 2.0 * PADDING,
            height: v * CANVAS_ROWS + 2.0 * PADDING,
            tones: self.tones.iter().map(project).collect(),
            bass: project(&self.bass),
            tonic: self.tonic.iter().map(project).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pixel {
    pub x: f64,
    pub y: f64,
}

impl Pixel {
    pub fn distance(&self, other: &Pixel) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

/// Circle centers of a chord diagram in SVG units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PixelLayout {
    pub width: f64,
    pub height: f64,
    pub tones: Vec<Pixel>,
    pub bass: Pixel,
    pub tonic: Vec<Pixel>,
}
