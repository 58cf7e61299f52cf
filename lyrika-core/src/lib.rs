//! Karaoke lyric timing engine.
//!
//! Parses line-level (`[mm:ss.xx]`) and precise per-character timed
//! lyric formats, synthesizes plausible per-unit timing where only line
//! timestamps exist, and answers per-frame highlight/progress queries
//! during playback. Pure, synchronous computation: no I/O, no clocks,
//! no global state.

pub mod config;
pub mod error;
pub mod highlight;
pub mod lrc;
pub mod lyrics;
pub mod model;
pub mod segment;
pub mod synth;
pub mod validate;
pub mod weight;
pub mod yrc;

pub use config::TimingConfig;
pub use error::{LyricsError, Result};
pub use highlight::{active_line_index, fill_progress, highlight_state, HighlightState};
pub use lrc::LrcDocument;
pub use lyrics::LyricsDocument;
pub use model::{LyricLine, LyricUnit, MetaInfo};
pub use segment::segment_text;
pub use synth::{synthesize, synthesize_line};
pub use validate::{validate, Issue, IssueKind, Severity, ValidationReport};
pub use weight::unit_weight;
