//! SM-2 core formulas
//!
//! Pure functions with no state. The scheduler composes them.

use chrono::{DateTime, Utc};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Ease factor assigned to a new chunk
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// SM-2 ease factor floor
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Intervals (days) for the first successful reviews before multiplicative growth
pub const DEFAULT_BOOTSTRAP_INTERVALS: [u32; 2] = [1, 3];

/// Upper bound on any scheduled interval
pub const DEFAULT_MAX_INTERVAL_DAYS: u32 = 365;

const SECONDS_PER_DAY: f64 = 86_400.0;

// ============================================================================
// EASE FACTOR
// ============================================================================

/// SM-2 ease factor delta for a quality score in 0..=5.
///
/// `EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02))`
#[inline]
pub fn sm2_ease_delta(quality: u8) -> f64 {
    let d = f64::from(5 - quality.min(5));
    0.1 - d * (0.08 + d * 0.02)
}

/// Next ease factor after a successful review, floored.
pub fn next_ease_factor(ease_factor: f64, quality: u8, floor: f64) -> f64 {
    (ease_factor + sm2_ease_delta(quality)).max(floor)
}

/// Read-side guard for a stored ease factor.
///
/// Non-finite values fall back to `default`; values under the floor are
/// lifted to the floor rather than rejected.
pub fn sanitize_ease_factor(ease_factor: f64, floor: f64, default: f64) -> f64 {
    if ease_factor.is_finite() {
        ease_factor.max(floor)
    } else {
        default.max(floor)
    }
}

/// Memory strength forced into `0..=100`. NaN counts as no strength.
pub fn clamp_memory_strength(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

// ============================================================================
// INTERVALS
// ============================================================================

/// Interval after a successful review.
///
/// `repetitions` is the number of consecutive successes *before* this one.
/// While it indexes into `bootstrap`, the fixed warm-up interval is used;
/// afterwards the previous interval is multiplied by the (already updated)
/// ease factor. Result is clamped to `1..=max_interval`.
pub fn next_interval(
    previous_interval: u32,
    ease_factor: f64,
    repetitions: u32,
    bootstrap: &[u32],
    max_interval: u32,
) -> u32 {
    let max_interval = max_interval.max(1);
    let raw = match bootstrap.get(repetitions as usize) {
        Some(&fixed) => fixed,
        None => {
            let grown = (f64::from(previous_interval.max(1)) * ease_factor).round();
            if grown.is_finite() && grown > 0.0 {
                grown.min(f64::from(max_interval)) as u32
            } else {
                1
            }
        }
    };
    raw.clamp(1, max_interval)
}

// ============================================================================
// LATENESS
// ============================================================================

/// Fractional days a review happened after its due time (0 when on time or early).
pub fn overdue_days(next_review_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let seconds = (now - next_review_at).num_seconds() as f64;
    (seconds / SECONDS_PER_DAY).max(0.0)
}

/// Strength lost to a late review: linear in days late, capped.
pub fn overdue_decay(days_overdue: f64, per_day: f64, cap: f64) -> f64 {
    if !days_overdue.is_finite() || days_overdue <= 0.0 {
        return 0.0;
    }
    (days_overdue * per_day.max(0.0)).min(cap.max(0.0))
}

// ============================================================================
// TESTS
// ============================================================================
