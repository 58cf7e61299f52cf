//! Heuristic per-unit timing synthesis for line-level lyric sources.
//!
//! Given only a line's start time and the next timing boundary, this
//! distributes the line's duration across its display units: segment,
//! weight, classify the line's tempo, shape the weights per tempo band,
//! allocate clamped spans, then run local redistribution passes that
//! conserve the total. The result approximates unknown ground truth; the
//! contract is plausibility and numeric stability, not correctness.

use crate::config::TimingConfig;
use crate::model::{LyricLine, LyricUnit};
use crate::segment::segment_text;
use crate::weight::{is_punctuation_unit, unit_weight};
use tracing::trace;

/// Singing speed of a line relative to the baseline character rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TempoBand {
    Fast,
    Normal,
    Slow,
    VerySlow,
}

/// Trailing vocalization characters that plausibly carry an extended
/// note near the end of a line.
const VOCALIZATION_CHARS: &[char] = &[
    '啊', '哦', '噢', '呀', '哟', '耶', '哎', '呜', '嗯', '唉', '喔', '~', '～',
];

/// How many units from the end of a line a vocalization character still
/// counts as an extension point.
const EXTENSION_TAIL_UNITS: usize = 3;

/// Fill in per-unit timing for every line that lacks it.
///
/// `time_points` is the full ordered boundary list (rendered lines plus
/// special marks); each line's duration runs to the first boundary after
/// its start time, falling back to a fixed default for the last line.
/// Lines that already carry units (precise-format imports) are left
/// untouched.
pub fn synthesize(lines: &mut [LyricLine], time_points: &[f64], config: &TimingConfig) {
    let starts: Vec<f64> = lines.iter().map(|l| l.time).collect();

    for (i, line) in lines.iter_mut().enumerate() {
        if line.units.is_some() {
            continue;
        }
        let boundary = time_points
            .iter()
            .copied()
            .find(|&t| t > line.time)
            .map(|t| t - line.time);
        let next_line_gap = starts.get(i + 1).map(|next| next - line.time);
        synthesize_line(line, boundary, next_line_gap, config);
    }
}

/// Synthesize one line's units in place.
///
/// `available` is the span to the next boundary in seconds (`None` for
/// the last line); `next_line_gap` is the span to the next rendered
/// line, used only for phrase-end detection. Never fails: empty text
/// produces no units, out-of-range inputs are clamped.
pub fn synthesize_line(
    line: &mut LyricLine,
    available: Option<f64>,
    next_line_gap: Option<f64>,
    config: &TimingConfig,
) {
    let texts = segment_text(&line.text);
    if texts.is_empty() {
        line.units = Some(Vec::new());
        return;
    }

    let duration = match available {
        Some(d) if d > 0.0 => d,
        _ => config.default_line_duration,
    };

    let weights: Vec<f64> = texts.iter().map(|t| unit_weight(t)).collect();
    let total_weight: f64 = weights.iter().sum();

    let mut shaped = if total_weight > 0.0 {
        let ratio = duration / (total_weight * config.normal_char_duration);
        let band = classify_tempo(ratio, config);
        trace!(ratio, ?band, units = texts.len(), "tempo classified");
        shape_weights(&weights, &texts, band, config)
    } else {
        // Degenerate line (nothing weighable): uniform division.
        vec![1.0; texts.len()]
    };

    // Phrase-ending lines (long gap before the next line, or no next
    // line at all) get a stretched trailing unit.
    let phrase_end = next_line_gap.map_or(true, |gap| gap > config.long_pause_gap);
    if phrase_end {
        if let Some(last) = shaped.last_mut() {
            *last *= config.long_pause_factor;
        }
    }

    let mut spans = allocate_spans(&shaped, duration, config);

    let extended = extension_flags(&texts);
    borrow_for_extended(&mut spans, &extended, config);
    borrow_for_final(&mut spans, config);
    compress_punctuation(&mut spans, &texts, config);

    line.units = Some(build_units(texts, &spans, duration));
    line.duration = Some(duration);
}

fn classify_tempo(ratio: f64, config: &TimingConfig) -> TempoBand {
    if ratio < config.fast_ratio {
        TempoBand::Fast
    } else if ratio < config.slow_ratio {
        TempoBand::Normal
    } else if ratio < config.very_slow_ratio {
        TempoBand::Slow
    } else {
        TempoBand::VerySlow
    }
}

/// Per-band weight shaping over unit index.
///
/// Fast lines distribute nearly uniformly with a mild tail extension;
/// slow lines bias increasing duration toward the end with a power
/// curve, and further upweight likely-extended units.
fn shape_weights(
    weights: &[f64],
    texts: &[String],
    band: TempoBand,
    config: &TimingConfig,
) -> Vec<f64> {
    let n = weights.len();
    let extended = extension_flags(texts);

    let progress = |i: usize| -> f64 {
        if n <= 1 {
            1.0
        } else {
            i as f64 / (n - 1) as f64
        }
    };

    match band {
        TempoBand::Fast => {
            let mut shaped = vec![1.0; n];
            if let Some(last) = shaped.last_mut() {
                *last *= config.fast_tail_factor;
            }
            shaped
        }
        TempoBand::Normal => weights
            .iter()
            .enumerate()
            .map(|(i, &w)| if extended[i] { w * 1.3 } else { w })
            .collect(),
        TempoBand::Slow => weights
            .iter()
            .enumerate()
            .map(|(i, &w)| {
                let shaped = w * (1.0 + progress(i).powi(2));
                if extended[i] {
                    shaped * 2.0
                } else {
                    shaped
                }
            })
            .collect(),
        TempoBand::VerySlow => weights
            .iter()
            .enumerate()
            .map(|(i, &w)| {
                let shaped = w * (1.0 + progress(i).powi(3));
                if extended[i] {
                    shaped * 3.0
                } else {
                    shaped
                }
            })
            .collect(),
    }
}

/// Units likely to carry an extended vocal note. The final unit always
/// qualifies; vocalization characters within the last few units also do.
fn extension_flags(texts: &[String]) -> Vec<bool> {
    let n = texts.len();
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| {
            if i + 1 == n {
                return true;
            }
            i + EXTENSION_TAIL_UNITS >= n
                && text.chars().all(|c| VOCALIZATION_CHARS.contains(&c))
        })
        .collect()
}

/// Turn shaped weights into spans summing exactly to `duration`.
///
/// Each raw span is clamped to the configured range; the clamp residue
/// is then rescaled away (overshoot) or handed to the final unit
/// (undershoot), so the total is conserved and every span stays
/// positive.
fn allocate_spans(shaped: &[f64], duration: f64, config: &TimingConfig) -> Vec<f64> {
    let total: f64 = shaped.iter().sum();
    let mut spans: Vec<f64> = if total > 0.0 {
        shaped
            .iter()
            .map(|w| {
                (w / total * duration).clamp(config.min_unit_duration, config.max_unit_duration)
            })
            .collect()
    } else {
        vec![duration / shaped.len() as f64; shaped.len()]
    };

    let clamped_total: f64 = spans.iter().sum();
    if clamped_total > duration {
        let scale = duration / clamped_total;
        for span in &mut spans {
            *span *= scale;
        }
    } else if let Some(last) = spans.last_mut() {
        *last += duration - clamped_total;
    }
    spans
}

/// Pass (a): flagged extended units must reach a minimum multiple of
/// the base minimum, borrowing from later non-extended units with slack.
fn borrow_for_extended(spans: &mut [f64], extended: &[bool], config: &TimingConfig) {
    let target = config.min_unit_duration * config.extended_min_factor;
    let n = spans.len();
    if n < 2 {
        return;
    }

    for i in 0..n - 1 {
        if !extended[i] || spans[i] >= target {
            continue;
        }
        let mut need = target - spans[i];
        for j in i + 1..n {
            if extended[j] {
                continue;
            }
            let slack = spans[j] - config.min_unit_duration;
            if slack <= 0.0 {
                continue;
            }
            let take = slack.min(need);
            spans[j] -= take;
            spans[i] += take;
            need -= take;
            if need <= 0.0 {
                break;
            }
        }
    }
}

/// Pass (b): the final unit has its own larger minimum, borrowing from
/// preceding units with slack.
fn borrow_for_final(spans: &mut [f64], config: &TimingConfig) {
    let target = config.min_unit_duration * config.final_min_factor;
    let n = spans.len();
    if n < 2 || spans[n - 1] >= target {
        return;
    }

    let mut need = target - spans[n - 1];
    for j in (0..n - 1).rev() {
        let slack = spans[j] - config.min_unit_duration;
        if slack <= 0.0 {
            continue;
        }
        let take = slack.min(need);
        spans[j] -= take;
        spans[n - 1] += take;
        need -= take;
        if need <= 0.0 {
            break;
        }
    }
}

/// Pass (c): punctuation is a brief pause, not a sung beat. Compress
/// punctuation spans toward the minimum and push the freed time forward
/// onto subsequent units.
fn compress_punctuation(spans: &mut [f64], texts: &[String], config: &TimingConfig) {
    let n = spans.len();
    for i in 0..n {
        if !is_punctuation_unit(&texts[i]) || i + 1 == n {
            continue;
        }
        let freed = spans[i] - config.min_unit_duration;
        if freed <= 0.0 {
            continue;
        }
        spans[i] = config.min_unit_duration;

        let rest: f64 = spans[i + 1..].iter().sum();
        if rest > 0.0 {
            for span in &mut spans[i + 1..] {
                *span += freed * (*span / rest);
            }
        } else if let Some(next) = spans.get_mut(i + 1) {
            *next += freed;
        }
    }
}

/// Assign sequential `[start, end)` intervals, forcing the final unit's
/// end onto the line duration exactly to absorb floating-point drift.
fn build_units(texts: Vec<String>, spans: &[f64], duration: f64) -> Vec<LyricUnit> {
    let n = texts.len();
    let mut units = Vec::with_capacity(n);
    let mut cursor = 0.0;
    for (i, text) in texts.into_iter().enumerate() {
        let start = cursor;
        let end = if i + 1 == n { duration } else { cursor + spans[i] };
        units.push(LyricUnit {
            text,
            start_time: start,
            end_time: end,
        });
        cursor = end;
    }
    units
}
