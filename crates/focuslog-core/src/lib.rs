//! # focuslog Core Library
//!
//! Business logic for focuslog, a personal study tracker: timed work
//! sessions tagged by category, daily vocabulary logging, aggregate
//! statistics, a leaderboard and consecutive-day check-in streaks.
//! The `focuslog` CLI is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Check-ins**: a pure streak calculator over per-day totals, plus the
//!   daily-goal evaluation built on it
//! - **Storage**: SQLite persistence for users, categories, sessions,
//!   settings and word records; TOML-based configuration
//! - **Stats**: group-by/sum queries over completed sessions
//!
//! ## Key Components
//!
//! - [`StreakCalculator`]: consecutive-day streak evaluation
//! - [`CheckinStatus`]: today's progress, streak and exam countdown
//! - [`Database`]: persistence and aggregate queries
//! - [`Config`]: application configuration management

pub mod checkin;
pub mod error;
pub mod models;
pub mod stats;
pub mod storage;
pub mod words;

pub use checkin::{
    calculate_streak, CheckinStatus, DailyTotal, GoalProgress, MalformedDatePolicy,
    StreakCalculator, StreakConfig, STREAK_WINDOW_DAYS,
};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use models::{Category, Session, SessionFilter, SettingsUpdate, User, UserSettings};
pub use stats::{CategoryStats, DailyStats, LeaderboardEntry, StatsSummary};
pub use storage::{Config, Database};
pub use words::{SubmitOutcome, WordRecord, WordStats};
