//! Runtime knobs shared by the domain services.

use std::time::Duration;

use chrono::NaiveTime;

pub const DEFAULT_AUDIT_PAGE_SIZE: usize = 500;
pub const DEFAULT_DUPLICATE_RACE_WINDOW: Duration = Duration::from_secs(60);
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

/// Relative weight of each assignment scoring signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdvisorWeights {
    pub proximity: f64,
    pub workload: f64,
    pub rating: f64,
}

impl Default for AdvisorWeights {
    fn default() -> Self {
        Self {
            proximity: 0.4,
            workload: 0.35,
            rating: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TurnoverSettings {
    /// Used when a property has no checkout time of its own.
    pub default_checkout_time: NaiveTime,
    pub audit_page_size: usize,
    /// Creation timestamps closer than this mark a duplicate as a likely
    /// concurrent-sync race.
    pub duplicate_race_window: Duration,
    pub advisor_weights: AdvisorWeights,
    pub default_suggestion_limit: usize,
}

impl Default for TurnoverSettings {
    fn default() -> Self {
        Self {
            default_checkout_time: NaiveTime::from_hms_opt(10, 0, 0)
                .unwrap_or(NaiveTime::MIN),
            audit_page_size: DEFAULT_AUDIT_PAGE_SIZE,
            duplicate_race_window: DEFAULT_DUPLICATE_RACE_WINDOW,
            advisor_weights: AdvisorWeights::default(),
            default_suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
        }
    }
}
