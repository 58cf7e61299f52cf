use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An atomic displayable lyric segment: a CJK character, a Latin word,
/// a space run, or a punctuation mark.
///
/// Times are in seconds, relative to the containing line's start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricUnit {
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
}

impl LyricUnit {
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// One timed lyric entry.
///
/// `time` is absolute seconds from track start (the playback-clock
/// reference). `units` is absent when the source has no per-character
/// granularity and synthesis has not run yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricLine {
    pub time: f64,
    pub text: String,
    pub translated_text: Option<String>,
    pub duration: Option<f64>,
    pub units: Option<Vec<LyricUnit>>,
    pub is_special_mark: bool,
}

impl LyricLine {
    #[must_use]
    pub fn new(time: f64, text: String) -> Self {
        Self {
            time,
            text,
            translated_text: None,
            duration: None,
            units: None,
            is_special_mark: false,
        }
    }

    /// End of this line on the absolute clock, if the duration is resolved.
    #[must_use]
    pub fn end_time(&self) -> Option<f64> {
        self.duration.map(|d| self.time + d)
    }
}

/// Free-form metadata extracted from zero-timestamp tag lines
/// (lyricist, composer, arranger, album, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaInfo(BTreeMap<String, String>);

impl MetaInfo {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn lyricist(&self) -> Option<&str> {
        self.get("lyricist")
    }

    #[must_use]
    pub fn composer(&self) -> Option<&str> {
        self.get("composer")
    }

    #[must_use]
    pub fn arranger(&self) -> Option<&str> {
        self.get("arranger")
    }

    #[must_use]
    pub fn album(&self) -> Option<&str> {
        self.get("album")
    }
}
