//! Records stored per user: accounts, categories, timed sessions and settings.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::checkin::DATE_FORMAT;
use crate::error::ValidationError;

/// Wall-clock timestamp format used in the `sessions` table.
///
/// Timestamps are local and carry no offset so that `date(started_at)`
/// yields the user's calendar date.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Default pomodoro length in seconds (25 minutes).
pub const DEFAULT_DURATION_SECS: u32 = 1500;
/// Default daily goal in seconds (2 hours).
pub const DEFAULT_DAILY_GOAL_SECS: u64 = 7200;
/// Color given to categories created without one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#FF6B6B";

/// Categories every new account starts with.
pub const DEFAULT_CATEGORIES: [(&str, &str); 3] = [
    ("Study", "#FF6B6B"),
    ("Work", "#4ECDC4"),
    ("Exercise", "#95E1D3"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon: String,
}

/// A timed work session tagged with a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub category_name: String,
    /// Actual length in seconds; 0 until the session is finished.
    pub duration: u64,
    pub planned_duration: u32,
    pub completed: bool,
    pub started_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,
}

/// Filter for listing session history.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionFilter {
    pub category_id: Option<i64>,
    pub completed: Option<bool>,
}

/// Per-user timer and goal settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    pub user_id: i64,
    pub default_duration: u32,
    pub short_break: u32,
    pub long_break: u32,
    pub auto_start_break: bool,
    pub notification_enabled: bool,
    /// Seconds of completed sessions needed for a day to count as a check-in.
    pub daily_goal: u64,
    pub exam_date: Option<String>,
    pub exam_name: String,
}

impl UserSettings {
    pub fn defaults_for(user_id: i64) -> Self {
        Self {
            user_id,
            default_duration: DEFAULT_DURATION_SECS,
            short_break: 300,
            long_break: 900,
            auto_start_break: false,
            notification_enabled: true,
            daily_goal: DEFAULT_DAILY_GOAL_SECS,
            exam_date: None,
            exam_name: String::new(),
        }
    }

    /// The exam date, if one is set and well formed.
    pub fn exam_day(&self) -> Option<NaiveDate> {
        self.exam_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, DATE_FORMAT).ok())
    }
}

/// Partial settings update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub default_duration: Option<u32>,
    pub short_break: Option<u32>,
    pub long_break: Option<u32>,
    pub auto_start_break: Option<bool>,
    pub notification_enabled: Option<bool>,
    pub daily_goal: Option<u64>,
    /// An empty string clears the exam date.
    pub exam_date: Option<String>,
    pub exam_name: Option<String>,
}

impl SettingsUpdate {
    pub fn apply(self, settings: &mut UserSettings) -> Result<(), ValidationError> {
        if let Some(v) = self.default_duration {
            if v == 0 {
                return Err(ValidationError::invalid("default_duration", "must be positive"));
            }
            settings.default_duration = v;
        }
        if let Some(v) = self.short_break {
            settings.short_break = v;
        }
        if let Some(v) = self.long_break {
            settings.long_break = v;
        }
        if let Some(v) = self.auto_start_break {
            settings.auto_start_break = v;
        }
        if let Some(v) = self.notification_enabled {
            settings.notification_enabled = v;
        }
        if let Some(v) = self.daily_goal {
            settings.daily_goal = v;
        }
        if let Some(date) = self.exam_date {
            settings.exam_date = if date.is_empty() {
                None
            } else {
                Some(parse_date(&date)?.format(DATE_FORMAT).to_string())
            };
        }
        if let Some(name) = self.exam_name {
            settings.exam_name = name;
        }
        Ok(())
    }
}

/// Parse a `YYYY-MM-DD` date supplied by a caller.
pub fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| ValidationError::InvalidDate(s.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_defaults() {
        let s = UserSettings::defaults_for(7);
        assert_eq!(s.user_id, 7);
        assert_eq!(s.default_duration, 1500);
        assert_eq!(s.short_break, 300);
        assert_eq!(s.long_break, 900);
        assert_eq!(s.daily_goal, 7200);
        assert!(s.notification_enabled);
        assert!(!s.auto_start_break);
        assert!(s.exam_date.is_none());
    }

    #[test]
    fn update_touches_only_given_fields() {
        let mut s = UserSettings::defaults_for(1);
        SettingsUpdate {
            daily_goal: Some(3600),
            exam_name: Some("Finals".into()),
            ..Default::default()
        }
        .apply(&mut s)
        .unwrap();
        assert_eq!(s.daily_goal, 3600);
        assert_eq!(s.exam_name, "Finals");
        assert_eq!(s.default_duration, 1500);
    }

    #[test]
    fn update_validates_and_clears_exam_date() {
        let mut s = UserSettings::defaults_for(1);
        let bad = SettingsUpdate {
            exam_date: Some("12/24/2024".into()),
            ..Default::default()
        };
        assert!(matches!(bad.apply(&mut s), Err(ValidationError::InvalidDate(_))));

        SettingsUpdate {
            exam_date: Some("2024-12-24".into()),
            ..Default::default()
        }
        .apply(&mut s)
        .unwrap();
        assert_eq!(s.exam_day(), NaiveDate::from_ymd_opt(2024, 12, 24));

        SettingsUpdate {
            exam_date: Some(String::new()),
            ..Default::default()
        }
        .apply(&mut s)
        .unwrap();
        assert!(s.exam_date.is_none());
    }

    #[test]
    fn zero_default_duration_is_rejected() {
        let mut s = UserSettings::defaults_for(1);
        let update = SettingsUpdate {
            default_duration: Some(0),
            ..Default::default()
        };
        assert!(update.apply(&mut s).is_err());
    }
}
