use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Tunable constants for timing synthesis and highlight queries.
///
/// Every field has a default; a partial TOML document fills in the rest.
/// The defaults are the canonical constant set tuned against real
/// playback — change them only with listening tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Seconds of singing time one baseline weight unit represents.
    #[serde(default = "default_normal_char_duration")]
    pub normal_char_duration: f64,

    /// Line duration when no following boundary exists (last line).
    #[serde(default = "default_line_duration")]
    pub default_line_duration: f64,

    /// Below this duration ratio a line is classified as fast.
    #[serde(default = "default_fast_ratio")]
    pub fast_ratio: f64,

    /// At or above this ratio a line is slow (below: normal).
    #[serde(default = "default_slow_ratio")]
    pub slow_ratio: f64,

    /// At or above this ratio a line is very slow.
    #[serde(default = "default_very_slow_ratio")]
    pub very_slow_ratio: f64,

    /// Tail extension multiplier for the final unit of fast lines.
    #[serde(default = "default_fast_tail_factor")]
    pub fast_tail_factor: f64,

    /// Gap to the next line beyond which the current line is treated
    /// as ending a musical phrase.
    #[serde(default = "default_long_pause_gap")]
    pub long_pause_gap: f64,

    /// Extra weight on the trailing unit of a phrase-ending line.
    #[serde(default = "default_long_pause_factor")]
    pub long_pause_factor: f64,

    /// Hard floor for any unit's allocated span, in seconds.
    #[serde(default = "default_min_unit_duration")]
    pub min_unit_duration: f64,

    /// Hard ceiling for any unit's allocated span, in seconds.
    #[serde(default = "default_max_unit_duration")]
    pub max_unit_duration: f64,

    /// Extended units must reach this multiple of `min_unit_duration`.
    #[serde(default = "default_extended_min_factor")]
    pub extended_min_factor: f64,

    /// The final unit must reach this multiple of `min_unit_duration`.
    #[serde(default = "default_final_min_factor")]
    pub final_min_factor: f64,

    /// Debounce buffer for highlight state transitions, in seconds.
    #[serde(default = "default_highlight_debounce")]
    pub highlight_debounce: f64,

    /// Window for matching a translation line by timestamp, in seconds.
    #[serde(default = "default_translation_window")]
    pub translation_window: f64,
}

const fn default_normal_char_duration() -> f64 {
    0.25
}

const fn default_line_duration() -> f64 {
    4.0
}

const fn default_fast_ratio() -> f64 {
    0.8
}

const fn default_slow_ratio() -> f64 {
    1.5
}

const fn default_very_slow_ratio() -> f64 {
    2.5
}

const fn default_fast_tail_factor() -> f64 {
    1.2
}

const fn default_long_pause_gap() -> f64 {
    5.0
}

const fn default_long_pause_factor() -> f64 {
    1.5
}

const fn default_min_unit_duration() -> f64 {
    0.12
}

const fn default_max_unit_duration() -> f64 {
    2.0
}

const fn default_extended_min_factor() -> f64 {
    2.0
}

const fn default_final_min_factor() -> f64 {
    2.5
}

const fn default_highlight_debounce() -> f64 {
    0.05
}

const fn default_translation_window() -> f64 {
    0.5
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            normal_char_duration: default_normal_char_duration(),
            default_line_duration: default_line_duration(),
            fast_ratio: default_fast_ratio(),
            slow_ratio: default_slow_ratio(),
            very_slow_ratio: default_very_slow_ratio(),
            fast_tail_factor: default_fast_tail_factor(),
            long_pause_gap: default_long_pause_gap(),
            long_pause_factor: default_long_pause_factor(),
            min_unit_duration: default_min_unit_duration(),
            max_unit_duration: default_max_unit_duration(),
            extended_min_factor: default_extended_min_factor(),
            final_min_factor: default_final_min_factor(),
            highlight_debounce: default_highlight_debounce(),
            translation_window: default_translation_window(),
        }
    }
}

impl TimingConfig {
    /// Parse a config from a TOML string, filling omitted fields with
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or a field has the
    /// wrong type.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TimingConfig::default();
        assert!((config.normal_char_duration - 0.25).abs() < f64::EPSILON);
        assert!((config.default_line_duration - 4.0).abs() < f64::EPSILON);
        assert!(config.fast_ratio < config.slow_ratio);
        assert!(config.slow_ratio < config.very_slow_ratio);
        assert!(config.min_unit_duration < config.max_unit_duration);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = TimingConfig::from_toml_str("min_unit_duration = 0.15").unwrap();
        assert!((config.min_unit_duration - 0.15).abs() < f64::EPSILON);
        assert!((config.max_unit_duration - 2.0).abs() < f64::EPSILON);
        assert!((config.highlight_debounce - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = TimingConfig::from_toml_str("").unwrap();
        assert_eq!(config, TimingConfig::default());
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        assert!(TimingConfig::from_toml_str("min_unit_duration = \"fast\"").is_err());
    }
}
