//! Precise per-character timing importer.
//!
//! Two textual sub-variants of the same format:
//!
//! - tuple lines: `[lineStartMs,lineDurationMs](charStartMs,charDurationMs,reserved)text...`
//!   where character start times are absolute milliseconds;
//! - JSON lines: `{"t": lineStartMs, "c": [{"tx": text, "t": durationMs}, ...]}`
//!   where character durations are sequential deltas.
//!
//! Output units carry exact timings; no synthesis is involved. Malformed
//! lines contribute nothing rather than failing the whole parse.

use crate::model::{LyricLine, LyricUnit};
use serde::Deserialize;
use tracing::{debug, warn};

const MS_PER_SEC: f64 = 1000.0;

/// Whether a blob looks like the precise per-character format: at least
/// one line with a `[number,number](number,number,number)` header, or a
/// JSON object per line.
#[must_use]
pub fn is_precise_format(input: &str) -> bool {
    input.lines().any(|line| {
        let line = line.trim();
        has_tuple_header(line) || (line.starts_with('{') && parse_json_line(line).is_some())
    })
}

/// Parse a precise-format blob into timed lines, sorted by start time.
///
/// Lines with an annotation prefix, an unparseable header, or zero
/// parsed characters are dropped silently.
#[must_use]
pub fn parse(input: &str) -> Vec<LyricLine> {
    let mut lines = Vec::new();

    for raw in input.lines() {
        let raw = raw.trim();
        if raw.is_empty() || raw.starts_with("//") {
            continue;
        }

        let parsed = if raw.starts_with('{') {
            parse_json_line(raw)
        } else {
            parse_tuple_line(raw)
        };

        match parsed {
            Some(line) => lines.push(line),
            None => debug!(line = raw, "dropping unparseable precise-format line"),
        }
    }

    lines.sort_by(|a, b| a.time.total_cmp(&b.time));
    lines
}

fn has_tuple_header(line: &str) -> bool {
    parse_header(line).is_some()
}

/// Parse the `[start,duration]` header, returning the two numbers and
/// the rest of the line, which must open with a character tuple.
fn parse_header(line: &str) -> Option<(u64, u64, &str)> {
    let rest = line.strip_prefix('[')?;
    let end = rest.find(']')?;
    let (start_str, duration_str) = rest[..end].split_once(',')?;
    let start: u64 = start_str.trim().parse().ok()?;
    let duration: u64 = duration_str.trim().parse().ok()?;
    let body = &rest[end + 1..];
    if !body.starts_with('(') {
        return None;
    }
    Some((start, duration, body))
}

/// Tuple variant: character start times are absolute milliseconds.
/// A character timestamp before the line start is a data anomaly; the
/// relative offset is clamped to zero rather than going negative.
fn parse_tuple_line(raw: &str) -> Option<LyricLine> {
    let (line_start_ms, line_duration_ms, mut body) = parse_header(raw)?;
    let mut units = Vec::new();
    let mut text = String::new();

    while let Some(rest) = body.strip_prefix('(') {
        let close = rest.find(')')?;
        let mut numbers = rest[..close].splitn(3, ',');
        let char_start_ms: u64 = numbers.next()?.trim().parse().ok()?;
        let char_duration_ms: u64 = numbers.next()?.trim().parse().ok()?;
        let _reserved: u64 = numbers.next()?.trim().parse().ok()?;

        let after = &rest[close + 1..];
        let char_end = after.find('(').unwrap_or(after.len());
        let char_text = &after[..char_end];
        body = &after[char_end..];

        if char_text.is_empty() {
            continue;
        }

        let relative = if char_start_ms < line_start_ms {
            warn!(
                line_start_ms,
                char_start_ms, "char timestamp precedes line start, clamping to zero"
            );
            0.0
        } else {
            (char_start_ms - line_start_ms) as f64 / MS_PER_SEC
        };

        units.push(LyricUnit {
            text: char_text.to_string(),
            start_time: relative,
            end_time: relative + char_duration_ms as f64 / MS_PER_SEC,
        });
        text.push_str(char_text);
    }

    if units.is_empty() {
        return None;
    }

    let mut line = LyricLine::new(line_start_ms as f64 / MS_PER_SEC, text);
    line.duration = Some(line_duration_ms as f64 / MS_PER_SEC);
    line.units = Some(units);
    Some(line)
}

#[derive(Debug, Deserialize)]
struct JsonLine {
    t: u64,
    c: Vec<JsonChar>,
}

#[derive(Debug, Deserialize)]
struct JsonChar {
    tx: String,
    t: u64,
}

/// JSON variant: no absolute char timestamps; each relative start is
/// the running sum of prior durations, and the line duration is the
/// total.
fn parse_json_line(raw: &str) -> Option<LyricLine> {
    let parsed: JsonLine = serde_json::from_str(raw).ok()?;
    if parsed.c.is_empty() {
        return None;
    }

    let mut units = Vec::with_capacity(parsed.c.len());
    let mut text = String::new();
    let mut cursor = 0.0;
    for ch in parsed.c {
        let duration = ch.t as f64 / MS_PER_SEC;
        units.push(LyricUnit {
            text: ch.tx.clone(),
            start_time: cursor,
            end_time: cursor + duration,
        });
        text.push_str(&ch.tx);
        cursor += duration;
    }

    let mut line = LyricLine::new(parsed.t as f64 / MS_PER_SEC, text);
    line.duration = Some(cursor);
    line.units = Some(units);
    Some(line)
}
