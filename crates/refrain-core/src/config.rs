//! Tuning configuration
//!
//! Every numeric constant of the practice loop in one serde document.
//! Missing keys fall back to the defaults, so a tuning file only needs the
//! values it changes:
//!
//! ```json
//! { "scheduler": { "maxIntervalDays": 180 }, "xp": { "nailedIt": 15 } }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::fade::FadeLevelEngine;
use crate::progress::RECENT_RATINGS_CAPACITY;
use crate::scheduler::{ReviewScheduler, SchedulerParams};
use crate::session::XpTable;
use crate::status::MemoryStatusClassifier;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PracticeConfig {
    pub scheduler: SchedulerParams,
    pub status: MemoryStatusClassifier,
    pub fade: FadeLevelEngine,
    pub xp: XpTable,
}

impl PracticeConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PracticeConfig = serde_json::from_str(json)
            .map_err(|e| Error::Validation(format!("Invalid tuning document: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a tuning file
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            Error::Validation(format!("Cannot read tuning file {}: {}", path.display(), e))
        })?;
        let config = Self::from_json_str(&json)?;
        tracing::info!(path = %path.display(), "Loaded tuning file");
        Ok(config)
    }

    /// Reject tunings that would break the scheduling or status invariants.
    pub fn validate(&self) -> Result<()> {
        let s = &self.scheduler;
        if s.bootstrap_intervals.iter().any(|&days| days == 0) {
            return Err(Error::Validation(
                "Bootstrap intervals must be at least one day".into(),
            ));
        }
        if s.max_interval_days == 0 {
            return Err(Error::Validation("maxIntervalDays must be positive".into()));
        }
        let non_negative = [
            ("failureEasePenalty", s.failure_ease_penalty),
            ("nailedItGain", s.nailed_it_gain),
            ("almostGain", s.almost_gain),
            ("strugglePenalty", s.struggle_penalty),
            ("overdueDecayPerDay", s.overdue_decay_per_day),
            ("maxOverdueDecay", s.max_overdue_decay),
        ];
        if let Some((name, _)) = non_negative
            .iter()
            .find(|(_, value)| !value.is_finite() || *value < 0.0)
        {
            return Err(Error::Validation(format!("{} must be a non-negative number", name)));
        }
        if s.almost_gain > s.nailed_it_gain {
            return Err(Error::Validation(
                "almostGain must not exceed nailedItGain".into(),
            ));
        }

        let c = &self.status;
        let thresholds = [
            c.shaky_threshold,
            c.developing_threshold,
            c.solid_threshold,
            c.locked_in_threshold,
        ];
        if thresholds.windows(2).any(|pair| !(pair[0] < pair[1])) {
            return Err(Error::Validation(
                "Status thresholds must be strictly increasing".into(),
            ));
        }

        if c.struggle_lookback == 0 || c.struggle_lookback > RECENT_RATINGS_CAPACITY {
            return Err(Error::Validation(format!(
                "struggleLookback must be between 1 and {}",
                RECENT_RATINGS_CAPACITY
            )));
        }

        let weight = self.fade.importance_weight;
        if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
            return Err(Error::Validation(
                "importanceWeight must be a number between 0 and 1".into(),
            ));
        }

        let cuts = &self.fade.level_cuts;
        if cuts.iter().any(|(hint, hide)| !hint.is_finite() || !hide.is_finite()) {
            return Err(Error::Validation("Fade level cuts must be finite".into()));
        }
        if cuts
            .windows(2)
            .any(|pair| pair[1].0 < pair[0].0 || pair[1].1 < pair[0].1)
        {
            return Err(Error::Validation(
                "Fade level cuts must not decrease with the level".into(),
            ));
        }
        if cuts.iter().any(|(hint, hide)| hide > hint) {
            return Err(Error::Validation(
                "A fade level cannot hide more words than it conceals".into(),
            ));
        }
        // A word may only be hidden once an earlier level has hinted it
        for level in 1..=4 {
            let earlier_hint = if level == 1 { 0.0 } else { cuts[level - 1].0 };
            if cuts[level].1 > earlier_hint {
                return Err(Error::Validation(format!(
                    "Fade level {} hides words that level {} never hinted",
                    level,
                    level - 1
                )));
            }
        }
        if cuts[4].0 < 1.0 {
            return Err(Error::Validation(
                "Fade level 4 must hint every word it does not hide".into(),
            ));
        }

        Ok(())
    }

    pub fn review_scheduler(&self) -> ReviewScheduler {
        ReviewScheduler::new(self.scheduler.clone(), self.status.clone())
    }
}
