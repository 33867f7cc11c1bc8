//! # Line Classification
//!
//! Decides whether a line of a chord sheet is blank, a section marker, a
//! chord line or a lyric line.
//!
//! ## Rules (in order)
//! 1. Trimmed line is empty → [`LineKind::Empty`]
//! 2. Trimmed line starts with `[` → [`LineKind::Subheading`] (`[Verse]`, `[Chorus]`)
//! 3. Split on spaces, drop empty pieces, strip any `/bass` suffix. A piece
//!    counts as chord-like if it parses as a chord or is a bar/rest marker
//!    (`|` or `.`). More than `threshold` of the pieces chord-like →
//!    [`LineKind::Chords`], otherwise [`LineKind::Lyrics`].
//!
//! The threshold is a tuning constant with no derivation behind it;
//! [`DEFAULT_CHORD_LINE_THRESHOLD`] is 0.35 and it can be overridden through
//! [`EngineConfig`](crate::EngineConfig).

use crate::vocabulary::Vocabulary;
use serde::Serialize;
use tracing::trace;

/// Share of chord-like tokens above which a line counts as a chord line.
pub const DEFAULT_CHORD_LINE_THRESHOLD: f64 = 0.35;

/// Bar and rest markers that count as chord-like on a chord line.
const LINE_MARKERS: [&str; 2] = ["|", "."];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Empty,
    Subheading,
    Chords,
    Lyrics,
}

impl Vocabulary {
    /// Classify a line using this vocabulary as the chord oracle.
    pub fn classify_line(&self, line: &str, threshold: f64) -> LineKind {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return LineKind::Empty;
        }
        if trimmed.starts_with('[') {
            return LineKind::Subheading;
        }

        let words: Vec<&str> = line
            .split(' ')
            .filter(|w| !w.is_empty())
            .map(|w| w.split('/').next().unwrap_or(w))
            .collect();
        if words.is_empty() {
            return LineKind::Empty;
        }

        let chord_like = words
            .iter()
            .filter(|w| LINE_MARKERS.contains(*w) || self.parse_chord(w).is_some())
            .count();
        let ratio = chord_like as f64 / words.len() as f64;

        let kind = if ratio > threshold {
            LineKind::Chords
        } else {
            LineKind::Lyrics
        };
        trace!(line, chord_like, words = words.len(), ?kind, "classified line");
        kind
    }
}

/// Classify a line with the built-in vocabulary and default threshold.
pub fn classify_line(line: &str) -> LineKind {
    Vocabulary::builtin().classify_line(line, DEFAULT_CHORD_LINE_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_basic_classification() {
        assert_eq!(classify_line("Am F C G"), LineKind::Chords);
        assert_eq!(classify_line("Hello there friend"), LineKind::Lyrics);
        assert_eq!(classify_line("[Chorus]"), LineKind::Subheading);
        assert_eq!(classify_line(""), LineKind::Empty);
        assert_eq!(classify_line("    "), LineKind::Empty);
    }

    #[test]
    fn test_bar_markers_count_as_chords() {
        assert_eq!(classify_line("| Am . . | F . . |"), LineKind::Chords);
    }

    #[test]
    fn test_slash_chords_and_wide_spacing() {
        assert_eq!(classify_line("   G/B      C/E    D7/F#"), LineKind::Chords);
    }

    #[test]
    fn test_lyrics_with_chord_like_words() {
        // "A" parses as a chord but only 1 of 4 words is chord-like
        assert_eq!(classify_line("A day in life"), LineKind::Lyrics);
    }

    #[test]
    fn test_threshold_is_strict() {
        let vocab = Vocabulary::builtin();
        // 1 of 2 words chord-like: 0.5 is not above 0.5
        assert_eq!(vocab.classify_line("C word", 0.5), LineKind::Lyrics);
        assert_eq!(vocab.classify_line("C word", 0.49), LineKind::Chords);
    }

    #[test]
    fn test_indented_subheading() {
        assert_eq!(classify_line("  [Verse 2]"), LineKind::Subheading);
    }
}
