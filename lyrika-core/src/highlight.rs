//! Per-frame highlight queries.
//!
//! Pure functions over the finished timing structures, called on every
//! render tick by the playback UI. Safe for any `time` value; inputs
//! outside a line's range are clamped, never rejected.

use crate::config::TimingConfig;
use crate::model::{LyricLine, LyricUnit};

/// Highlight state of one unit at one playback instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightState {
    NotStarted,
    Singing,
    Sung,
}

/// Index of the line active at `time`, by binary search over the sorted
/// line start times. `None` before the first line.
#[must_use]
pub fn active_line_index(lines: &[LyricLine], time: f64) -> Option<usize> {
    let idx = lines.partition_point(|line| line.time <= time);
    idx.checked_sub(1)
}

/// Highlight state for one unit of one line.
///
/// A fixed debounce buffer widens the singing interval on both sides so
/// playback-clock jitter near a boundary cannot flicker the state.
/// Lines other than the active one are reported as not started.
#[must_use]
pub fn highlight_state(
    line_index: usize,
    active_index: Option<usize>,
    time: f64,
    line: &LyricLine,
    unit: &LyricUnit,
    config: &TimingConfig,
) -> HighlightState {
    if active_index != Some(line_index) {
        return HighlightState::NotStarted;
    }

    let relative = time - line.time;
    if relative < unit.start_time - config.highlight_debounce {
        HighlightState::NotStarted
    } else if relative < unit.end_time + config.highlight_debounce {
        HighlightState::Singing
    } else {
        HighlightState::Sung
    }
}

/// Fill percentage for the active unit, in `[0, 100]`.
///
/// Linear elapsed/duration interpolation through an ease-out curve
/// (`t * (2 - t)`), rounded to two decimals. 0 before the unit starts,
/// 100 at or after its end.
#[must_use]
pub fn fill_progress(time: f64, line: &LyricLine, unit: &LyricUnit) -> f64 {
    let relative = time - line.time;
    let duration = unit.duration();
    if relative < unit.start_time {
        return 0.0;
    }
    if duration <= 0.0 || relative >= unit.end_time {
        return 100.0;
    }

    let t = ((relative - unit.start_time) / duration).clamp(0.0, 1.0);
    let eased = t * (2.0 - t);
    (eased * 100.0 * 100.0).round() / 100.0
}
