//! Daily check-ins: goal evaluation and streak reporting.
//!
//! A day is a check-in when its completed session time reaches the user's
//! daily goal. [`CheckinStatus`] combines today's progress, the current
//! streak and the exam countdown into the response shown to the user.

mod streak;

pub use streak::{
    calculate_streak, DailyTotal, MalformedDatePolicy, StreakCalculator, StreakConfig,
    DATE_FORMAT, STREAK_WINDOW_DAYS,
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::models::UserSettings;
use crate::storage::Database;

/// Check-in summary for one user on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinStatus {
    /// Consecutive check-in days ending today (or yesterday).
    pub streak_days: u32,
    /// Completed session seconds started today.
    pub today_duration: u64,
    pub today_goal: u64,
    pub today_completed: bool,
    pub today_count: u64,
    pub exam_date: Option<String>,
    pub exam_name: String,
    /// Whole days from today to the exam. The exam day itself counts as 0,
    /// as does a past or unset exam.
    pub days_until_exam: i64,
}

impl CheckinStatus {
    /// Build the status from already-queried totals.
    ///
    /// `totals` is the most-recent-first daily series used for the streak;
    /// today's duration is taken from its entry dated `today`, if any.
    pub fn evaluate(
        today: NaiveDate,
        totals: &[DailyTotal],
        today_count: u64,
        settings: &UserSettings,
        calculator: &StreakCalculator,
    ) -> Self {
        let today_duration = totals
            .iter()
            .find(|t| t.parsed_date() == Some(today))
            .map_or(0, |t| t.duration_secs);

        let days_until_exam = settings
            .exam_day()
            .map_or(0, |exam| (exam - today).num_days().max(0));

        Self {
            streak_days: calculator.calculate(today, totals, settings.daily_goal),
            today_duration,
            today_goal: settings.daily_goal,
            today_completed: today_duration >= settings.daily_goal,
            today_count,
            exam_date: settings.exam_date.clone(),
            exam_name: settings.exam_name.clone(),
            days_until_exam,
        }
    }

    pub fn progress(&self) -> GoalProgress {
        GoalProgress::new(self.today_duration, self.today_goal)
    }
}

/// How far today's sessions are towards the daily goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub accumulated: u64,
    pub goal: u64,
    pub remaining: u64,
    /// Share of the goal reached, capped at 100.
    pub percent: f64,
}

impl GoalProgress {
    pub fn new(accumulated: u64, goal: u64) -> Self {
        let percent = if goal == 0 {
            100.0
        } else {
            (accumulated as f64 / goal as f64 * 100.0).min(100.0)
        };
        Self {
            accumulated,
            goal,
            remaining: goal.saturating_sub(accumulated),
            percent,
        }
    }

    pub fn is_met(&self) -> bool {
        self.accumulated >= self.goal
    }
}

impl Database {
    /// Query totals and settings for `user_id` and evaluate today's check-in.
    ///
    /// # Errors
    /// Returns an error if any of the underlying queries fail.
    pub fn checkin_status(
        &self,
        user_id: i64,
        today: NaiveDate,
        calculator: &StreakCalculator,
    ) -> Result<CheckinStatus> {
        let settings = self.get_settings(user_id)?;
        let totals = self.daily_totals(user_id, STREAK_WINDOW_DAYS)?;
        let (_, today_count) = self.today_totals(user_id, today)?;

        let status = CheckinStatus::evaluate(today, &totals, today_count, &settings, calculator);
        debug!(
            user_id,
            streak = status.streak_days,
            today_duration = status.today_duration,
            "evaluated check-in"
        );
        Ok(status)
    }

    /// Current streak for `user_id`, recomputed from stored sessions.
    ///
    /// # Errors
    /// Returns an error if the settings or totals query fails.
    pub fn streak(
        &self,
        user_id: i64,
        today: NaiveDate,
        calculator: &StreakCalculator,
    ) -> Result<u32> {
        let settings = self.get_settings(user_id)?;
        let totals = self.daily_totals(user_id, STREAK_WINDOW_DAYS)?;
        Ok(calculator.calculate(today, &totals, settings.daily_goal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn status_reports_today_and_streak() {
        let settings = UserSettings::defaults_for(1);
        let totals = vec![
            DailyTotal::new("2024-03-10", 7500),
            DailyTotal::new("2024-03-09", 8000),
        ];
        let status = CheckinStatus::evaluate(
            day("2024-03-10"),
            &totals,
            3,
            &settings,
            &StreakCalculator::new(),
        );
        assert_eq!(status.streak_days, 2);
        assert_eq!(status.today_duration, 7500);
        assert_eq!(status.today_goal, 7200);
        assert!(status.today_completed);
        assert_eq!(status.today_count, 3);
        assert_eq!(status.days_until_exam, 0);
    }

    #[test]
    fn nothing_today_keeps_yesterday_streak() {
        let settings = UserSettings::defaults_for(1);
        let totals = vec![DailyTotal::new("2024-03-09", 8000)];
        let status = CheckinStatus::evaluate(
            day("2024-03-10"),
            &totals,
            0,
            &settings,
            &StreakCalculator::new(),
        );
        assert_eq!(status.streak_days, 1);
        assert_eq!(status.today_duration, 0);
        assert!(!status.today_completed);
    }

    #[test]
    fn exam_countdown_never_negative() {
        let mut settings = UserSettings::defaults_for(1);
        settings.exam_date = Some("2024-03-20".into());
        let status =
            CheckinStatus::evaluate(day("2024-03-10"), &[], 0, &settings, &StreakCalculator::new());
        assert_eq!(status.days_until_exam, 10);

        let status =
            CheckinStatus::evaluate(day("2024-03-20"), &[], 0, &settings, &StreakCalculator::new());
        assert_eq!(status.days_until_exam, 0);

        let status =
            CheckinStatus::evaluate(day("2024-04-01"), &[], 0, &settings, &StreakCalculator::new());
        assert_eq!(status.days_until_exam, 0);

        settings.exam_date = Some("garbage".into());
        let status =
            CheckinStatus::evaluate(day("2024-03-10"), &[], 0, &settings, &StreakCalculator::new());
        assert_eq!(status.days_until_exam, 0);
    }

    #[test]
    fn progress_caps_at_hundred() {
        let p = GoalProgress::new(9000, 7200);
        assert_eq!(p.percent, 100.0);
        assert_eq!(p.remaining, 0);
        assert!(p.is_met());

        let p = GoalProgress::new(3600, 7200);
        assert_eq!(p.percent, 50.0);
        assert_eq!(p.remaining, 3600);
        assert!(!p.is_met());
    }

    #[test]
    fn zero_goal_is_always_met() {
        let p = GoalProgress::new(0, 0);
        assert_eq!(p.percent, 100.0);
        assert!(p.is_met());
    }
}
