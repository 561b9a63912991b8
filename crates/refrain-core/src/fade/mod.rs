//! Fade Level Engine
//!
//! Progressive concealment of lyric words for recall practice.
//!
//! Each word gets a stable concealment key in `[0, 1)` built from two parts:
//! - **Importance**: function words and short words score low and fade first,
//!   long content words score high and stay on screen until the higher levels
//! - **Jitter**: a per-word value hashed from `(chunk id, line index, word index)`
//!   so equally important words don't all vanish together
//!
//! A fade level maps to two cut-offs. Words below the hide cut are blanked,
//! words below the hint cut show only their first letter, everything else is
//! visible. Both cut-offs only grow with the level, which is what makes the
//! concealed set monotonic: raising the level never brings a cue back.

mod engine;
mod level;
mod seed;

pub use engine::{render_line, FadeLevelEngine, LinePlan, RevealSet, WordState, WordVisibility};
pub use level::FadeLevel;
pub use seed::FadeSeed;
