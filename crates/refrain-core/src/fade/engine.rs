//! Visibility planning for lyric lines

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{FadeLevel, FadeSeed};
use crate::progress::ChunkRef;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Words that carry little recall value. These are the first to fade.
const FUNCTION_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "nor", "so", "yet", "of", "in", "on", "at", "to",
    "for", "by", "with", "from", "up", "as", "is", "am", "are", "was", "were", "be", "been",
    "it", "its", "i", "me", "my", "we", "us", "our", "you", "your", "he", "him", "his", "she",
    "her", "they", "them", "their", "this", "that", "these", "those", "do", "did", "not", "no",
    "oh", "ah", "o", "la", "if", "then", "than", "will", "shall", "can", "all", "into",
    "i'm", "i'll", "it's", "don't", "thy", "thee", "thou",
];

/// Share of the concealment key decided by word importance (rest is jitter)
pub const DEFAULT_IMPORTANCE_WEIGHT: f64 = 0.75;

/// `(hint_cut, hide_cut)` per fade level. Both columns are non-decreasing,
/// each hide cut stays at or below the previous level's hint cut, and level 4
/// hints every word that is not already hidden.
pub const DEFAULT_LEVEL_CUTS: [(f64, f64); 6] = [
    (0.00, 0.00),
    (0.30, 0.00),
    (0.55, 0.20),
    (0.80, 0.45),
    (1.00, 0.70),
    (1.00, 1.00),
];

// ============================================================================
// PLAN TYPES
// ============================================================================

/// Rendering instruction for a single token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordVisibility {
    pub visible: bool,
    pub show_first_letter: bool,
}

impl WordVisibility {
    pub const VISIBLE: WordVisibility = WordVisibility {
        visible: true,
        show_first_letter: false,
    };
    pub const HINT: WordVisibility = WordVisibility {
        visible: false,
        show_first_letter: true,
    };
    pub const HIDDEN: WordVisibility = WordVisibility {
        visible: false,
        show_first_letter: false,
    };

    /// True when the word is hinted or blanked.
    #[inline]
    pub fn is_concealed(&self) -> bool {
        !self.visible
    }

    pub fn state(&self) -> WordState {
        match (self.visible, self.show_first_letter) {
            (true, _) => WordState::Visible,
            (false, true) => WordState::Hint,
            (false, false) => WordState::Hidden,
        }
    }
}

/// One plan entry per token of a line
pub type LinePlan = Vec<WordVisibility>;

/// Three-tier view of a word's visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordState {
    Visible,
    Hint,
    Hidden,
}

impl From<WordState> for WordVisibility {
    fn from(state: WordState) -> Self {
        match state {
            WordState::Visible => WordVisibility::VISIBLE,
            WordState::Hint => WordVisibility::HINT,
            WordState::Hidden => WordVisibility::HIDDEN,
        }
    }
}

// ============================================================================
// ENGINE
// ============================================================================

/// Stateless planner that decides which words to conceal at a given level.
///
/// The engine holds only tuning constants, so a single instance can be
/// shared freely across threads and requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FadeLevelEngine {
    /// Weight of word importance in the concealment key (0.0 - 1.0)
    pub importance_weight: f64,
    /// `(hint_cut, hide_cut)` for levels 0 through 5
    pub level_cuts: [(f64, f64); 6],
}

impl Default for FadeLevelEngine {
    fn default() -> Self {
        Self {
            importance_weight: DEFAULT_IMPORTANCE_WEIGHT,
            level_cuts: DEFAULT_LEVEL_CUTS,
        }
    }
}

impl FadeLevelEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plan one line of tokens at the given level.
    ///
    /// Identical `(tokens, level, seed)` always yield an identical plan.
    /// With validated cuts a word is always hinted at the first level that
    /// conceals it.
    pub fn plan<S: AsRef<str>>(&self, tokens: &[S], level: FadeLevel, seed: FadeSeed) -> LinePlan {
        let (hint_cut, hide_cut) = self.cuts_for(level);

        tokens
            .iter()
            .enumerate()
            .map(|(index, token)| {
                let token = token.as_ref();
                if !has_letters(token) || level == FadeLevel::MIN {
                    return WordVisibility::VISIBLE;
                }
                if level.is_full_concealment() {
                    return WordVisibility::HIDDEN;
                }

                let key = self.concealment_key(token, seed, index);
                if key < hide_cut {
                    WordVisibility::HIDDEN
                } else if key < hint_cut || hint_cut >= 1.0 {
                    WordVisibility::HINT
                } else {
                    WordVisibility::VISIBLE
                }
            })
            .collect()
    }

    /// Plan every line of a chunk. Seeds come from the chunk id and line index.
    pub fn plan_chunk(&self, chunk: &ChunkRef, level: FadeLevel) -> Vec<LinePlan> {
        chunk
            .lines
            .iter()
            .enumerate()
            .map(|(line_index, tokens)| {
                self.plan(tokens, level, FadeSeed::for_line(&chunk.id, line_index))
            })
            .collect()
    }

    /// Concealment key in `[0, 1)`. Lower keys fade earlier.
    pub fn concealment_key(&self, token: &str, seed: FadeSeed, word_index: usize) -> f64 {
        let weight = if self.importance_weight.is_finite() {
            self.importance_weight.clamp(0.0, 1.0)
        } else {
            DEFAULT_IMPORTANCE_WEIGHT
        };
        weight * word_importance(token) + (1.0 - weight) * seed.word_jitter(word_index)
    }

    fn cuts_for(&self, level: FadeLevel) -> (f64, f64) {
        let (hint, hide) = self.level_cuts[level.get() as usize];
        // A hidden word is always at least hinted
        (hint.max(hide), hide)
    }
}

/// Recall difficulty proxy in `[0, 1]`: 0 for function words, growing with length.
pub fn word_importance(token: &str) -> f64 {
    let normalized: String = token
        .chars()
        .filter(|c| c.is_alphabetic() || *c == '\'')
        .flat_map(char::to_lowercase)
        .collect();
    let normalized = normalized.trim_matches('\'');

    if FUNCTION_WORDS.contains(&normalized) {
        return 0.0;
    }

    let letters = normalized.chars().filter(|c| c.is_alphabetic()).count();
    ((letters as f64 - 2.0) / 8.0).clamp(0.1, 1.0)
}

fn has_letters(token: &str) -> bool {
    token.chars().any(char::is_alphabetic)
}

// ============================================================================
// SESSION-LOCAL REVEALS
// ============================================================================

/// Words the user tapped to reveal during the current session.
///
/// Reveals are layered on top of a plan and never written back: the stored
/// fade level and the plan derived from it stay untouched.
#[derive(Debug, Clone, Default)]
pub struct RevealSet {
    revealed: HashSet<(usize, usize)>,
}

impl RevealSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reveal(&mut self, line_index: usize, word_index: usize) {
        self.revealed.insert((line_index, word_index));
    }

    pub fn is_revealed(&self, line_index: usize, word_index: usize) -> bool {
        self.revealed.contains(&(line_index, word_index))
    }

    pub fn len(&self) -> usize {
        self.revealed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revealed.is_empty()
    }

    pub fn clear(&mut self) {
        self.revealed.clear();
    }

    /// Return a copy of `plan` with revealed words made visible.
    pub fn apply(&self, line_index: usize, plan: &[WordVisibility]) -> LinePlan {
        plan.iter()
            .enumerate()
            .map(|(word_index, entry)| {
                if self.is_revealed(line_index, word_index) {
                    WordVisibility::VISIBLE
                } else {
                    *entry
                }
            })
            .collect()
    }
}

// ============================================================================
// TEXT RENDERING
// ============================================================================

/// Render a line as plain text: hints keep their first letter, every other
/// concealed letter becomes `_`. Punctuation is preserved.
pub fn render_line<S: AsRef<str>>(tokens: &[S], plan: &[WordVisibility]) -> String {
    tokens
        .iter()
        .zip(plan.iter().copied().chain(std::iter::repeat(WordVisibility::VISIBLE)))
        .map(|(token, entry)| mask_token(token.as_ref(), entry.state()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn mask_token(token: &str, state: WordState) -> String {
    match state {
        WordState::Visible => token.to_string(),
        WordState::Hint | WordState::Hidden => {
            let mut shown_first = state == WordState::Hidden;
            token
                .chars()
                .map(|c| {
                    if !c.is_alphabetic() {
                        c
                    } else if !shown_first {
                        shown_first = true;
                        c
                    } else {
                        '_'
                    }
                })
                .collect()
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
