//! Splits a line of mixed-script text into atomic display units.
//!
//! ASCII letters and digits merge greedily into one "word" unit, a run of
//! consecutive spaces becomes one unit, and every other character (CJK
//! ideograph, punctuation, emoji) is its own single-character unit. No
//! Unicode normalization is performed; joining the returned units
//! reproduces the input exactly.

/// Segment a line of raw text into unit texts, in order.
///
/// Pure function of the input; empty text yields an empty sequence.
#[must_use]
pub fn segment_text(text: &str) -> Vec<String> {
    let mut units = Vec::new();
    let mut current = String::new();
    let mut current_kind = CharKind::Other;

    for ch in text.chars() {
        let kind = classify(ch);
        match kind {
            CharKind::Alnum | CharKind::Space if kind == current_kind => {
                current.push(ch);
            }
            CharKind::Alnum | CharKind::Space => {
                if !current.is_empty() {
                    units.push(std::mem::take(&mut current));
                }
                current.push(ch);
                current_kind = kind;
            }
            CharKind::Other => {
                if !current.is_empty() {
                    units.push(std::mem::take(&mut current));
                }
                units.push(ch.to_string());
                current_kind = CharKind::Other;
            }
        }
    }

    if !current.is_empty() {
        units.push(current);
    }

    units
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharKind {
    /// ASCII letter or digit, merged into word runs.
    Alnum,
    /// Space, merged into one unit per run.
    Space,
    /// Everything else stands alone.
    Other,
}

fn classify(ch: char) -> CharKind {
    if ch.is_ascii_alphanumeric() {
        CharKind::Alnum
    } else if ch == ' ' {
        CharKind::Space
    } else {
        CharKind::Other
    }
}
