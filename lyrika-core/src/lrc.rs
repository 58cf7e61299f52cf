//! Line-level timed-text parser.
//!
//! Handles `[mm:ss.xx]text` lines (multiple stacked timestamps allowed),
//! zero-timestamp metadata lines, and special-mark lines (instrumental
//! markers). Special marks are excluded from the rendered line list but
//! their timestamps stay in the boundary list, so an instrumental
//! section shortens the adjacent singable line instead of being absorbed
//! into it. Per-character timing is left to the synthesizer.

use crate::model::{LyricLine, MetaInfo};
use tracing::debug;

/// Result of parsing a line-oriented lyric document.
#[derive(Debug, Clone, Default)]
pub struct LrcDocument {
    pub meta: MetaInfo,
    /// Rendered lines, sorted by absolute time. No special marks.
    pub lines: Vec<LyricLine>,
    /// Special-mark lines (instrumental markers etc.), kept for
    /// inspection; never rendered.
    pub special_marks: Vec<LyricLine>,
    /// Every timestamp seen on rendered lines and special marks,
    /// sorted. This is the boundary list the synthesizer resolves line
    /// durations against.
    pub time_points: Vec<f64>,
}

/// Metadata labels recognized on zero-timestamp lines, mapped to
/// canonical keys. Extend here rather than special-casing callers.
const META_LABELS: &[(&str, &str)] = &[
    ("作词", "lyricist"),
    ("lyricist", "lyricist"),
    ("作曲", "composer"),
    ("composer", "composer"),
    ("编曲", "arranger"),
    ("arranger", "arranger"),
    ("专辑", "album"),
    ("album", "album"),
    ("制作人", "producer"),
    ("producer", "producer"),
];

/// Bracketed section-marker tokens, English (lowercased) and Chinese.
const SECTION_TOKENS: &[&str] = &[
    "music",
    "intro",
    "outro",
    "bridge",
    "solo",
    "instrumental",
];

/// Chinese marker tokens that also count without brackets.
const CJK_SECTION_TOKENS: &[&str] = &["间奏", "前奏", "尾奏", "伴奏", "纯音乐", "独奏"];

/// Parse a line-oriented timed-text document.
///
/// Unparseable physical lines contribute nothing; this never fails.
#[must_use]
pub fn parse(input: &str) -> LrcDocument {
    let mut doc = LrcDocument::default();

    for raw in input.lines() {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }

        let Some((timestamps, text)) = split_timestamps(raw) else {
            debug!(line = raw, "dropping line without a timestamp tag");
            continue;
        };

        // Zero-timestamp metadata lines populate MetaInfo and are
        // excluded from the line list.
        if timestamps.iter().all(|&t| t == 0.0) {
            if let Some((key, value)) = parse_meta(text) {
                doc.meta.insert(key, value);
                continue;
            }
        }

        let special = is_special_mark(text);
        for &time in &timestamps {
            doc.time_points.push(time);
            let mut line = LyricLine::new(time, text.to_string());
            line.is_special_mark = special;
            if special {
                doc.special_marks.push(line);
            } else {
                doc.lines.push(line);
            }
        }
    }

    doc.lines.sort_by(|a, b| a.time.total_cmp(&b.time));
    doc.special_marks.sort_by(|a, b| a.time.total_cmp(&b.time));
    doc.time_points.sort_by(f64::total_cmp);
    doc.time_points.dedup();

    doc
}

/// Extract the stacked leading `[mm:ss.xx]` tags and the trailing text.
/// Returns `None` when the line carries no valid timestamp tag.
fn split_timestamps(line: &str) -> Option<(Vec<f64>, &str)> {
    let mut timestamps = Vec::new();
    let mut remaining = line;

    while remaining.starts_with('[') {
        let Some(end) = remaining.find(']') else {
            break;
        };
        let Some(time) = parse_timestamp(&remaining[1..end]) else {
            break;
        };
        timestamps.push(time);
        remaining = &remaining[end + 1..];
    }

    if timestamps.is_empty() {
        None
    } else {
        Some((timestamps, remaining.trim()))
    }
}

/// Parse `mm:ss`, `mm:ss.xx`, or `mm:ss.xxx` into seconds.
fn parse_timestamp(s: &str) -> Option<f64> {
    let (minutes_str, seconds_str) = s.trim().split_once(':')?;
    if minutes_str.is_empty() || !minutes_str.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let minutes: u32 = minutes_str.parse().ok()?;
    let seconds: f64 = seconds_str.parse().ok()?;
    if !(0.0..60.0).contains(&seconds) {
        return None;
    }
    Some(f64::from(minutes) * 60.0 + seconds)
}

/// Match a zero-timestamp `label: value` metadata line against the
/// recognized label table.
fn parse_meta(text: &str) -> Option<(&'static str, String)> {
    let (label, value) = text
        .split_once(':')
        .or_else(|| text.split_once('：'))?;
    let label = label.trim().to_lowercase();
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    META_LABELS
        .iter()
        .find(|(pattern, _)| *pattern == label)
        .map(|(_, key)| (*key, value.to_string()))
}

/// Whole-line special-mark detection. Substrings never match, so lyric
/// lines that merely mention these words are not suppressed.
#[must_use]
pub fn is_special_mark(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }

    // Ellipsis-only lines and a bare "end".
    if trimmed.chars().all(|c| c == '.' || c == '…') {
        return true;
    }
    let lowered = trimmed.to_lowercase();
    if lowered == "end" {
        return true;
    }

    let inner = strip_brackets(trimmed);
    let bracketed = inner.len() != trimmed.len();
    let inner_lowered = inner.trim().to_lowercase();

    if bracketed && SECTION_TOKENS.contains(&inner_lowered.as_str()) {
        return true;
    }
    CJK_SECTION_TOKENS.contains(&inner.trim())
}

/// Strip one matching layer of ASCII or fullwidth brackets.
fn strip_brackets(text: &str) -> &str {
    for (open, close) in [('(', ')'), ('[', ']'), ('（', '）'), ('【', '】')] {
        if let Some(inner) = text
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            return inner;
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_line() {
        let doc = parse("[00:12.34]Hello world");
        assert_eq!(doc.lines.len(), 1);
        assert!((doc.lines[0].time - 12.34).abs() < 1e-9);
        assert_eq!(doc.lines[0].text, "Hello world");
    }

    #[test]
    fn test_three_digit_fraction() {
        let doc = parse("[01:02.345]text");
        assert!((doc.lines[0].time - 62.345).abs() < 1e-9);
    }

    #[test]
    fn test_multi_timestamp_line_duplicates() {
        let doc = parse("[00:05.00][00:15.00]Repeated lyric");
        assert_eq!(doc.lines.len(), 2);
        assert_eq!(doc.lines[0].text, "Repeated lyric");
        assert_eq!(doc.lines[1].text, "Repeated lyric");
        assert!((doc.lines[0].time - 5.0).abs() < 1e-9);
        assert!((doc.lines[1].time - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_lines_sorted_by_time() {
        let doc = parse("[00:20.00]second\n[00:10.00]first");
        assert_eq!(doc.lines[0].text, "first");
        assert_eq!(doc.lines[1].text, "second");
    }

    #[test]
    fn test_metadata_lines_extracted() {
        let input = "[00:00.00]作词: 某人\n[00:00.00]composer: Someone\n[00:10.00]歌词";
        let doc = parse(input);
        assert_eq!(doc.meta.lyricist(), Some("某人"));
        assert_eq!(doc.meta.composer(), Some("Someone"));
        assert_eq!(doc.lines.len(), 1);
    }

    #[test]
    fn test_fullwidth_colon_metadata() {
        let doc = parse("[00:00.00]编曲：编曲者");
        assert_eq!(doc.meta.arranger(), Some("编曲者"));
        assert!(doc.lines.is_empty());
    }

    #[test]
    fn test_unknown_label_stays_a_lyric_line() {
        let doc = parse("[00:00.00]chorus: sing along");
        assert!(doc.meta.is_empty());
        assert_eq!(doc.lines.len(), 1);
    }

    #[test]
    fn test_special_marks_excluded_but_boundary_kept() {
        let input = "[00:10.00]真正的歌词\n[00:14.00](Music)\n[00:20.00]下一句";
        let doc = parse(input);
        assert_eq!(doc.lines.len(), 2);
        assert_eq!(doc.special_marks.len(), 1);
        assert!(doc.special_marks[0].is_special_mark);
        assert_eq!(doc.time_points, vec![10.0, 14.0, 20.0]);
    }

    #[test]
    fn test_special_mark_whole_line_only() {
        assert!(is_special_mark("(Music)"));
        assert!(is_special_mark("间奏"));
        assert!(is_special_mark("[Instrumental]"));
        assert!(is_special_mark("（前奏）"));
        assert!(is_special_mark("……"));
        assert!(is_special_mark("End"));
        // Lyric lines that merely mention the tokens survive.
        assert!(!is_special_mark("the music plays on"));
        assert!(!is_special_mark("this is the end of us"));
        assert!(!is_special_mark("间奏之后再唱"));
    }

    #[test]
    fn test_unparseable_lines_dropped() {
        let input = "not a lyric line\n[bad]tag\n[00:05.00]good";
        let doc = parse(input);
        assert_eq!(doc.lines.len(), 1);
        assert_eq!(doc.lines[0].text, "good");
    }

    #[test]
    fn test_out_of_range_seconds_rejected() {
        let doc = parse("[00:75.00]invalid");
        assert!(doc.lines.is_empty());
    }

    #[test]
    fn test_cjk_lyrics() {
        let doc = parse("[00:05.00]你好世界");
        assert_eq!(doc.lines[0].text, "你好世界");
    }
}
