//! Top-level lyric document assembly.
//!
//! Detects the source format, parses it, synthesizes per-unit timing
//! when the source only carries line timestamps, and aligns an optional
//! translation by timestamp. The result is immutable after construction
//! and safe to share read-only across threads.

use crate::config::TimingConfig;
use crate::highlight;
use crate::lrc;
use crate::model::{LyricLine, MetaInfo};
use crate::synth;
use crate::yrc;
use tracing::debug;

/// A fully timed lyric document, ready for per-frame queries.
#[derive(Debug, Clone, Default)]
pub struct LyricsDocument {
    pub meta: MetaInfo,
    /// Rendered lines sorted by time, each with resolved units.
    pub lines: Vec<LyricLine>,
    /// Boundary list: every timestamp including special marks.
    pub time_points: Vec<f64>,
}

impl LyricsDocument {
    /// Parse a lyric blob, auto-detecting the precise per-character
    /// format versus line-level timed text, and align an optional
    /// translation source.
    ///
    /// Never fails; unusable input yields an empty document and the
    /// host decides what to show.
    #[must_use]
    pub fn parse(original: &str, translation: Option<&str>, config: &TimingConfig) -> Self {
        let mut doc = if yrc::is_precise_format(original) {
            debug!("precise per-character format detected");
            let lines = yrc::parse(original);
            let time_points = lines.iter().map(|l| l.time).collect();
            Self {
                meta: MetaInfo::new(),
                lines,
                time_points,
            }
        } else {
            let parsed = lrc::parse(original);
            let mut lines = parsed.lines;
            synth::synthesize(&mut lines, &parsed.time_points, config);
            Self {
                meta: parsed.meta,
                lines,
                time_points: parsed.time_points,
            }
        };

        if let Some(translation) = translation {
            doc.align_translation(translation, config);
        }

        doc
    }

    /// Index of the line active at `time`. `None` before the first line.
    #[must_use]
    pub fn active_line_index(&self, time: f64) -> Option<usize> {
        highlight::active_line_index(&self.lines, time)
    }

    /// Attach translated text to each line by timestamp: an exact match
    /// (at millisecond resolution) wins outright, otherwise the nearest
    /// translation within the configured window is taken.
    fn align_translation(&mut self, translation: &str, config: &TimingConfig) {
        let parsed = lrc::parse(translation);
        if parsed.lines.is_empty() {
            return;
        }

        for line in &mut self.lines {
            let mut best: Option<(f64, &str)> = None;
            for candidate in &parsed.lines {
                let delta = (candidate.time - line.time).abs();
                if delta < 0.0005 {
                    best = Some((0.0, &candidate.text));
                    break;
                }
                if delta <= config.translation_window
                    && best.map_or(true, |(b, _)| delta < b)
                {
                    best = Some((delta, &candidate.text));
                }
            }
            if let Some((_, text)) = best {
                line.translated_text = Some(text.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::{fill_progress, highlight_state, HighlightState};
    use crate::validate;

    const LRC_SAMPLE: &str = "\
[00:00.00]作词: 词人
[00:00.00]作曲: 曲人
[00:10.00]第一句歌词
[00:14.00](Music)
[00:20.00]第二句歌词
[00:23.50]End";

    #[test]
    fn test_lrc_end_to_end() {
        let config = TimingConfig::default();
        let doc = LyricsDocument::parse(LRC_SAMPLE, None, &config);

        assert_eq!(doc.meta.lyricist(), Some("词人"));
        assert_eq!(doc.lines.len(), 2);
        // The special mark at 14.0 bounds the first line; the "End"
        // mark at 23.5 bounds the second.
        assert!((doc.lines[0].duration.unwrap() - 4.0).abs() < 1e-9);
        assert!((doc.lines[1].duration.unwrap() - 3.5).abs() < 1e-9);
        assert_eq!(doc.time_points, vec![10.0, 14.0, 20.0, 23.5]);

        let report = validate::validate(&doc.lines);
        assert!(!report.has_errors(), "{:?}", report.issues);
    }

    #[test]
    fn test_precise_format_end_to_end() {
        let config = TimingConfig::default();
        let doc = LyricsDocument::parse("[1000,2000](1000,300,0)Hi(1300,700,0)there", None, &config);
        assert_eq!(doc.lines.len(), 1);
        let units = doc.lines[0].units.as_ref().unwrap();
        assert_eq!(units.len(), 2);
        assert!((units[1].end_time - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_json_format_end_to_end() {
        let config = TimingConfig::default();
        let doc = LyricsDocument::parse(
            r#"{"t":5000,"c":[{"tx":"A","t":200},{"tx":"B","t":300}]}"#,
            None,
            &config,
        );
        assert_eq!(doc.lines.len(), 1);
        assert!((doc.lines[0].duration.unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_translation_exact_match() {
        let config = TimingConfig::default();
        let translation = "[00:10.00]first line translated\n[00:20.00]second line translated";
        let doc = LyricsDocument::parse(LRC_SAMPLE, Some(translation), &config);
        assert_eq!(
            doc.lines[0].translated_text.as_deref(),
            Some("first line translated")
        );
        assert_eq!(
            doc.lines[1].translated_text.as_deref(),
            Some("second line translated")
        );
    }

    #[test]
    fn test_translation_fuzzy_match_nearest() {
        let config = TimingConfig::default();
        // No exact match at 10.0: both 10.3 and 10.45 are within the
        // window; the nearest wins.
        let translation = "[00:10.45]farther\n[00:10.30]nearer";
        let doc = LyricsDocument::parse("[00:10.00]原句", Some(translation), &config);
        assert_eq!(doc.lines[0].translated_text.as_deref(), Some("nearer"));
    }

    #[test]
    fn test_translation_outside_window_ignored() {
        let config = TimingConfig::default();
        let doc =
            LyricsDocument::parse("[00:10.00]原句", Some("[00:11.00]too far"), &config);
        assert_eq!(doc.lines[0].translated_text, None);
    }

    #[test]
    fn test_empty_input_yields_empty_document() {
        let config = TimingConfig::default();
        let doc = LyricsDocument::parse("", None, &config);
        assert!(doc.lines.is_empty());
        assert!(doc.meta.is_empty());
    }

    #[test]
    fn test_query_interface_over_synthesized_document() {
        let config = TimingConfig::default();
        let doc = LyricsDocument::parse(LRC_SAMPLE, None, &config);

        assert_eq!(doc.active_line_index(5.0), None);
        let active = doc.active_line_index(11.0);
        assert_eq!(active, Some(0));

        let line = &doc.lines[0];
        let units = line.units.as_ref().unwrap();
        let first = &units[0];
        let state = highlight_state(0, active, 10.01, line, first, &config);
        assert_eq!(state, HighlightState::Singing);
        let progress = fill_progress(line.time + first.end_time, line, first);
        assert!((progress - 100.0).abs() < f64::EPSILON);

        // 11s into the track the second line is not yet active.
        let second = &doc.lines[1];
        let second_first = &second.units.as_ref().unwrap()[0];
        assert_eq!(
            highlight_state(1, active, 11.0, second, second_first, &config),
            HighlightState::NotStarted
        );
    }
}
