//! Review Scheduler (SM-2 variant)
//!
//! Decides when a chunk comes back and how hard the next attempt should be.
//!
//! ## Shape of the algorithm
//! - Ratings map to SM-2 quality: `nailed_it` = 5, `almost` = 3, `struggling` = 0
//! - Successful reviews bootstrap through fixed intervals (1 day, then 3 days),
//!   then grow as `interval * ease_factor`
//! - Ease factor follows the SM-2 update and never drops below 1.3
//! - A struggle resets the interval to 1 day and steps the fade level back
//! - Memory strength is a smoothed 0-100 score; late reviews cost strength
//!
//! The numeric constants live in [`SchedulerParams`] and are tuning, not contract.

mod algorithm;
mod scheduler;

pub use algorithm::{
    clamp_memory_strength, next_ease_factor, next_interval, overdue_days, overdue_decay, sanitize_ease_factor,
    sm2_ease_delta, DEFAULT_BOOTSTRAP_INTERVALS, DEFAULT_EASE_FACTOR, DEFAULT_MAX_INTERVAL_DAYS,
    MIN_EASE_FACTOR,
};

pub use scheduler::{PreviewResults, Rating, ReviewResult, ReviewScheduler, SchedulerParams};
