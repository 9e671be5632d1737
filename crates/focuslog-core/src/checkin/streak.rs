//! Consecutive-day check-in streaks.
//!
//! A streak is the number of consecutive calendar days, ending today, on
//! which the accumulated session time met the daily goal. When nothing has
//! been logged today yet, the streak is anchored at yesterday instead of
//! being reported as broken.
//!
//! The calculator is a pure function over per-day totals supplied by the
//! storage layer (most recent date first, one entry per date). It never
//! sorts, deduplicates or fails.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Number of distinct dates considered when computing a streak.
///
/// The storage query truncates to the same window, so no streak longer
/// than this is ever reported.
pub const STREAK_WINDOW_DAYS: usize = 365;

/// Calendar date format used for all stored dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Accumulated completed-session time for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTotal {
    /// Raw `YYYY-MM-DD` text as produced by the query layer.
    pub date: String,
    /// Sum of completed session durations started on `date`.
    pub duration_secs: u64,
}

impl DailyTotal {
    pub fn new(date: impl Into<String>, duration_secs: u64) -> Self {
        Self {
            date: date.into(),
            duration_secs,
        }
    }

    /// The entry's date, or `None` if the stored text does not parse.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, DATE_FORMAT).ok()
    }
}

/// What to do with an entry whose date cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedDatePolicy {
    /// Ignore the entry; the next entry is checked against the same expected date.
    #[default]
    Skip,
    /// Treat the entry as a gap and end the streak there.
    Stop,
}

/// Configuration for streak calculation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreakConfig {
    #[serde(default)]
    pub malformed_dates: MalformedDatePolicy,
}

/// Streak calculator
#[derive(Debug, Clone, Default)]
pub struct StreakCalculator {
    config: StreakConfig,
}

impl StreakCalculator {
    /// Create a calculator with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: StreakConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StreakConfig {
        &self.config
    }

    /// Count consecutive qualifying days ending at `today`.
    ///
    /// # Arguments
    /// * `today` - Current calendar date
    /// * `totals` - Per-date totals, most recent first, at most one per date
    /// * `goal_secs` - Daily goal; a day qualifies when its total is `>= goal_secs`
    ///
    /// The first entry must be dated `today` or, when nothing has been logged
    /// today, `today - 1`. Every following entry must be exactly one day
    /// earlier than the one before it. The scan stops at the first gap or
    /// shortfall.
    pub fn calculate(&self, today: NaiveDate, totals: &[DailyTotal], goal_secs: u64) -> u32 {
        let mut anchor: Option<NaiveDate> = None;
        let mut streak: u32 = 0;

        for total in totals.iter().take(STREAK_WINDOW_DAYS) {
            let Some(date) = total.parsed_date() else {
                match self.config.malformed_dates {
                    MalformedDatePolicy::Skip => continue,
                    MalformedDatePolicy::Stop => break,
                }
            };

            if total.duration_secs < goal_secs {
                break;
            }

            let expected = match anchor {
                Some(start) => start - Duration::days(i64::from(streak)),
                None if date == today || date == today - Duration::days(1) => {
                    anchor = Some(date);
                    date
                }
                None => break,
            };

            if date != expected {
                break;
            }
            streak += 1;
        }

        streak
    }
}

/// Compute a streak with the default calculator.
pub fn calculate_streak(today: NaiveDate, totals: &[DailyTotal], goal_secs: u64) -> u32 {
    StreakCalculator::new().calculate(today, totals, goal_secs)
}
