//! Aggregate statistics over completed sessions.
//!
//! Only sessions finished with `completed = true` are counted. Durations
//! are in seconds.

use rusqlite::params;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::Database;

/// Time spent in one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub duration: u64,
    pub count: u64,
    /// Share of the user's total duration, 0-100. Only filled in by
    /// [`Database::stats_summary`].
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub total_duration: u64,
    pub total_count: u64,
    pub categories: Vec<CategoryStats>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: String,
    pub duration: u64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user_id: i64,
    pub username: String,
    pub total_count: u64,
    pub total_duration: u64,
}

impl Database {
    /// Totals plus a per-category breakdown with percentages.
    pub fn stats_summary(&self, user_id: i64) -> Result<StatsSummary> {
        let mut categories = self.category_stats(user_id)?;
        let total_duration: u64 = categories.iter().map(|c| c.duration).sum();
        let total_count: u64 = categories.iter().map(|c| c.count).sum();

        if total_duration > 0 {
            for c in &mut categories {
                c.percentage = c.duration as f64 / total_duration as f64 * 100.0;
            }
        }

        Ok(StatsSummary {
            total_duration,
            total_count,
            categories,
        })
    }

    pub fn total_duration(&self, user_id: i64) -> Result<u64> {
        let total = self.conn().query_row(
            "SELECT COALESCE(SUM(duration), 0) FROM sessions WHERE user_id = ?1 AND completed = 1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// Per-category totals, longest first. Percentages are left at 0.
    pub fn category_stats(&self, user_id: i64) -> Result<Vec<CategoryStats>> {
        let mut stmt = self.conn().prepare(
            "SELECT c.id, c.name, c.color, SUM(s.duration) AS total, COUNT(*)
             FROM sessions s
             JOIN categories c ON c.id = s.category_id AND c.user_id = s.user_id
             WHERE s.user_id = ?1 AND s.completed = 1
             GROUP BY c.id
             ORDER BY total DESC, c.id",
        )?;
        let stats = stmt
            .query_map(params![user_id], |row| {
                Ok(CategoryStats {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    color: row.get(2)?,
                    duration: row.get(3)?,
                    count: row.get(4)?,
                    percentage: 0.0,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(stats)
    }

    /// Per-date totals for the `limit` most recent active dates.
    pub fn daily_stats(&self, user_id: i64, limit: usize) -> Result<Vec<DailyStats>> {
        let mut stmt = self.conn().prepare(
            "SELECT date(started_at) AS day, SUM(duration), COUNT(*)
             FROM sessions
             WHERE user_id = ?1 AND completed = 1 AND date(started_at) IS NOT NULL
             GROUP BY day
             ORDER BY day DESC
             LIMIT ?2",
        )?;
        let stats = stmt
            .query_map(params![user_id, limit as i64], |row| {
                Ok(DailyStats {
                    date: row.get(0)?,
                    duration: row.get(1)?,
                    count: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(stats)
    }

    /// Users ranked by total completed time.
    pub fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>> {
        let mut stmt = self.conn().prepare(
            "SELECT u.id, u.username, COUNT(*), SUM(s.duration) AS total
             FROM sessions s
             JOIN users u ON u.id = s.user_id
             WHERE s.completed = 1
             GROUP BY u.id
             ORDER BY total DESC, u.id
             LIMIT ?1",
        )?;
        let entries = stmt
            .query_map(params![limit as i64], |row| {
                Ok(LeaderboardEntry {
                    user_id: row.get(0)?,
                    username: row.get(1)?,
                    total_count: row.get(2)?,
                    total_duration: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }
}
