//! Stable seeds for word fading
//!
//! Seeds come from stable identifiers only. Same chunk, same line, same word:
//! same jitter, in every process, on every request.

use sha2::{Digest, Sha256};

/// Per-line seed for the fade engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FadeSeed(u64);

impl FadeSeed {
    /// Derive the seed for one line of a chunk.
    pub fn for_line(chunk_id: &str, line_index: usize) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(chunk_id.as_bytes());
        hasher.update(b":");
        hasher.update((line_index as u64).to_le_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        FadeSeed(u64::from_le_bytes(bytes))
    }

    pub const fn from_raw(value: u64) -> Self {
        FadeSeed(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    /// Uniform value in `[0, 1)` for the word at `word_index`.
    pub fn word_jitter(self, word_index: usize) -> f64 {
        let mixed = splitmix64(self.0 ^ (word_index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        // Top 53 bits -> exact f64 mantissa
        (mixed >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// SplitMix64 finalizer
fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
