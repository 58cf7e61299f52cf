//! Relative speaking-duration weights for display units.
//!
//! A CJK ideograph is the baseline "one beat" (1.0). The classification
//! order is load-bearing: spaces and punctuation must always resolve to
//! smaller-than-baseline weight, or the synthesizer starves sung
//! characters of time on punctuation-heavy lines.

/// Weight of a space (or empty) unit.
pub const SPACE_WEIGHT: f64 = 0.05;

/// Weight of a punctuation unit.
pub const PUNCTUATION_WEIGHT: f64 = 0.25;

/// Weight of a run of ASCII digits.
pub const DIGIT_RUN_WEIGHT: f64 = 0.6;

/// Baseline weight of a CJK ideograph (or any unclassified character).
pub const BASELINE_WEIGHT: f64 = 1.0;

const WORD_LENGTH_FACTOR: f64 = 0.5;
const WORD_BASE_WEIGHT: f64 = 0.5;
const WORD_WEIGHT_CAP: f64 = 3.0;

/// ASCII and CJK punctuation treated as a brief pause rather than a
/// sung beat.
const PUNCTUATION: &[char] = &[
    ',', '.', '!', '?', ';', ':', '\'', '"', '(', ')', '[', ']', '-', '~', '…', '、', '。', '，',
    '！', '？', '；', '：', '“', '”', '‘', '’', '（', '）', '《', '》', '「', '」', '·', '—',
];

/// Relative speaking-duration weight of one unit's text.
///
/// First match wins: space, punctuation, digit run, ASCII word (weight
/// scales with length up to a cap), then the CJK baseline.
#[must_use]
pub fn unit_weight(text: &str) -> f64 {
    if text.is_empty() || text.chars().all(|c| c == ' ') {
        return SPACE_WEIGHT;
    }

    if is_punctuation_unit(text) {
        return PUNCTUATION_WEIGHT;
    }

    if text.chars().all(|c| c.is_ascii_digit()) {
        return DIGIT_RUN_WEIGHT;
    }

    if text.chars().all(|c| c.is_ascii_alphanumeric()) {
        let len = text.len() as f64;
        return (len * WORD_LENGTH_FACTOR + WORD_BASE_WEIGHT).min(WORD_WEIGHT_CAP);
    }

    BASELINE_WEIGHT
}

/// Whether a character belongs to the enumerated punctuation set.
#[must_use]
pub fn is_punctuation(ch: char) -> bool {
    PUNCTUATION.contains(&ch)
}

/// Whether a unit is a punctuation unit (single enumerated punctuation
/// character).
#[must_use]
pub fn is_punctuation_unit(text: &str) -> bool {
    let mut chars = text.chars();
    matches!((chars.next(), chars.next()), (Some(ch), None) if is_punctuation(ch))
}
