//! # Engine Configuration
//!
//! Tunables for document parsing and diagram rendering, loadable from YAML.
//! Every field is optional in the YAML source; missing fields take their
//! defaults.
//!
//! ```yaml
//! chord-line-threshold: 0.35
//! default-title: Untitled
//! fallback-key: 4
//! theme: light
//! ```

use crate::classify::DEFAULT_CHORD_LINE_THRESHOLD;
use crate::error::TonnetzError;
use crate::svg::Theme;
use crate::vocabulary::{PitchClass, REFERENCE_KEY};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Share of chord-like tokens above which a line is a chord line.
    pub chord_line_threshold: f64,
    /// Title used when a document has neither a `Title:` field nor any body line.
    pub default_title: String,
    /// Detected key for documents without a single parseable chord.
    pub fallback_key: PitchClass,
    pub theme: Theme,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chord_line_threshold: DEFAULT_CHORD_LINE_THRESHOLD,
            default_title: String::new(),
            fallback_key: REFERENCE_KEY,
            theme: Theme::default(),
        }
    }
}

/// Raw configuration for YAML deserialization
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawConfig {
    chord_line_threshold: Option<f64>,
    default_title: Option<String>,
    fallback_key: Option<i64>,
    theme: Option<String>,
}

impl EngineConfig {
    pub fn from_yaml(source: &str) -> Result<Self, TonnetzError> {
        let raw: RawConfig = if source.trim().is_empty() {
            RawConfig::default()
        } else {
            serde_yaml::from_str(source).map_err(|e| TonnetzError::Config(e.to_string()))?
        };

        let defaults = Self::default();

        let chord_line_threshold = match raw.chord_line_threshold {
            Some(t) if (0.0..=1.0).contains(&t) => t,
            Some(t) => {
                return Err(TonnetzError::Config(format!(
                    "chord-line-threshold must be between 0 and 1, got {}",
                    t
                )))
            }
            None => defaults.chord_line_threshold,
        };

        let fallback_key = match raw.fallback_key {
            Some(k) if (0..=11).contains(&k) => k as PitchClass,
            Some(k) => {
                return Err(TonnetzError::Config(format!(
                    "fallback-key must be between 0 and 11, got {}",
                    k
                )))
            }
            None => defaults.fallback_key,
        };

        let theme = match raw.theme {
            Some(name) => Theme::from_name(&name)
                .ok_or_else(|| TonnetzError::Config(format!("Unknown theme: {}", name)))?,
            None => defaults.theme,
        };

        Ok(Self {
            chord_line_threshold,
            default_title: raw.default_title.unwrap_or(defaults.default_title),
            fallback_key,
            theme,
        })
    }
}
