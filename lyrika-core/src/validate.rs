//! Invariant audit over a finished timing set.
//!
//! Used by the test suite and development tooling only; findings are
//! never runtime errors and this pass never mutates its input.

use crate::model::LyricLine;
use std::fmt;

/// Tolerance thresholds, in seconds.
const MIN_PLAUSIBLE_UNIT: f64 = 0.010;
const MAX_PLAUSIBLE_UNIT: f64 = 5.0;
const MAX_GAP: f64 = 0.100;
const END_TOLERANCE: f64 = 0.100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Indicates a synthesis or import bug; should fail a test.
    Error,
    /// Implausible but tolerated timing.
    Warning,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IssueKind {
    NegativeLineTime,
    NegativeUnitStart,
    NonPositiveUnitDuration,
    UnitTooShort,
    UnitTooLong,
    GapBetweenUnits { gap: f64 },
    OverlappingUnits { overlap: f64 },
    FirstUnitNotAtZero { start: f64 },
    FinalUnitMissesLineEnd { delta: f64 },
}

impl IssueKind {
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::NegativeLineTime | Self::NegativeUnitStart | Self::NonPositiveUnitDuration => {
                Severity::Error
            }
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeLineTime => write!(f, "line has a negative start time"),
            Self::NegativeUnitStart => write!(f, "unit has a negative start time"),
            Self::NonPositiveUnitDuration => write!(f, "unit duration is zero or negative"),
            Self::UnitTooShort => write!(f, "unit shorter than {MIN_PLAUSIBLE_UNIT}s"),
            Self::UnitTooLong => write!(f, "unit longer than {MAX_PLAUSIBLE_UNIT}s"),
            Self::GapBetweenUnits { gap } => write!(f, "gap of {gap:.3}s between units"),
            Self::OverlappingUnits { overlap } => {
                write!(f, "units overlap by {overlap:.3}s")
            }
            Self::FirstUnitNotAtZero { start } => {
                write!(f, "first unit starts at {start:.3}s, not 0")
            }
            Self::FinalUnitMissesLineEnd { delta } => {
                write!(f, "final unit misses the line duration by {delta:.3}s")
            }
        }
    }
}

/// One finding, addressed by line and (optionally) unit index.
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub line: usize,
    pub unit: Option<usize>,
    pub kind: IssueKind,
}

/// Categorized findings over a whole line set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|i| i.kind.severity() == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|i| i.kind.severity() == Severity::Warning)
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }
}

/// Audit a finished line set for timing invariant violations.
#[must_use]
pub fn validate(lines: &[LyricLine]) -> ValidationReport {
    let mut report = ValidationReport::default();

    for (li, line) in lines.iter().enumerate() {
        let mut push = |unit: Option<usize>, kind: IssueKind| {
            report.issues.push(Issue {
                line: li,
                unit,
                kind,
            });
        };

        if line.time < 0.0 {
            push(None, IssueKind::NegativeLineTime);
        }

        let Some(units) = line.units.as_ref() else {
            continue;
        };
        if units.is_empty() {
            continue;
        }

        for (ui, unit) in units.iter().enumerate() {
            if unit.start_time < 0.0 {
                push(Some(ui), IssueKind::NegativeUnitStart);
            }
            let duration = unit.duration();
            if duration <= 0.0 {
                push(Some(ui), IssueKind::NonPositiveUnitDuration);
            } else if duration < MIN_PLAUSIBLE_UNIT {
                push(Some(ui), IssueKind::UnitTooShort);
            } else if duration > MAX_PLAUSIBLE_UNIT {
                push(Some(ui), IssueKind::UnitTooLong);
            }
        }

        for (ui, pair) in units.windows(2).enumerate() {
            let delta = pair[1].start_time - pair[0].end_time;
            if delta > MAX_GAP {
                push(Some(ui), IssueKind::GapBetweenUnits { gap: delta });
            } else if delta < 0.0 {
                push(Some(ui), IssueKind::OverlappingUnits { overlap: -delta });
            }
        }

        let first_start = units[0].start_time;
        if first_start.abs() > f64::EPSILON {
            push(Some(0), IssueKind::FirstUnitNotAtZero { start: first_start });
        }

        if let Some(duration) = line.duration {
            let delta = (units[units.len() - 1].end_time - duration).abs();
            if delta > END_TOLERANCE {
                push(
                    Some(units.len() - 1),
                    IssueKind::FinalUnitMissesLineEnd { delta },
                );
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimingConfig;
    use crate::model::LyricUnit;
    use crate::synth::synthesize_line;

    fn timed_line(units: Vec<LyricUnit>, duration: f64) -> LyricLine {
        let mut line = LyricLine::new(0.0, units.iter().map(|u| u.text.clone()).collect());
        line.duration = Some(duration);
        line.units = Some(units);
        line
    }

    fn unit(text: &str, start: f64, end: f64) -> LyricUnit {
        LyricUnit {
            text: text.to_string(),
            start_time: start,
            end_time: end,
        }
    }

    #[test]
    fn test_synthesized_line_is_clean_of_errors() {
        let mut line = LyricLine::new(12.0, "一句正常速度的歌词".to_string());
        synthesize_line(&mut line, Some(3.0), Some(3.0), &TimingConfig::default());
        let report = validate(&[line]);
        assert!(!report.has_errors(), "{:?}", report.issues);
    }

    #[test]
    fn test_negative_duration_is_an_error() {
        let line = timed_line(vec![unit("a", 0.0, 0.5), unit("b", 0.5, 0.4)], 0.5);
        let report = validate(&[line]);
        assert!(report.has_errors());
        assert!(report
            .errors()
            .any(|i| i.kind == IssueKind::NonPositiveUnitDuration));
    }

    #[test]
    fn test_negative_start_is_an_error() {
        let line = timed_line(vec![unit("a", -0.1, 0.5)], 0.5);
        assert!(validate(&[line]).has_errors());
    }

    #[test]
    fn test_gap_and_overlap_are_warnings() {
        let gap = timed_line(vec![unit("a", 0.0, 0.3), unit("b", 0.5, 0.5 + 0.3)], 0.8);
        let report = validate(&[gap]);
        assert!(!report.has_errors());
        assert!(report
            .warnings()
            .any(|i| matches!(i.kind, IssueKind::GapBetweenUnits { .. })));

        let overlap = timed_line(vec![unit("a", 0.0, 0.4), unit("b", 0.35, 0.8)], 0.8);
        let report = validate(&[overlap]);
        assert!(report
            .warnings()
            .any(|i| matches!(i.kind, IssueKind::OverlappingUnits { .. })));
    }

    #[test]
    fn test_end_mismatch_warning() {
        // Precise imports can legitimately end before the declared line
        // duration; beyond tolerance it is flagged as a warning only.
        let line = timed_line(vec![unit("a", 0.0, 0.5)], 2.0);
        let report = validate(&[line]);
        assert!(!report.has_errors());
        assert!(report
            .warnings()
            .any(|i| matches!(i.kind, IssueKind::FinalUnitMissesLineEnd { .. })));
    }

    #[test]
    fn test_first_unit_offset_warning() {
        let line = timed_line(vec![unit("a", 0.2, 0.5)], 0.5);
        let report = validate(&[line]);
        assert!(report
            .warnings()
            .any(|i| matches!(i.kind, IssueKind::FirstUnitNotAtZero { .. })));
    }

    #[test]
    fn test_lines_without_units_are_ignored() {
        let line = LyricLine::new(5.0, "no units yet".to_string());
        assert!(validate(&[line]).is_clean());
    }
}
