//! Categories and timed sessions.
//!
//! Every query is scoped to a user id; a category or session owned by
//! another user is reported as not found.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};
use tracing::info;

use crate::checkin::{DailyTotal, DATE_FORMAT};
use crate::error::{CoreError, Result, ValidationError};
use crate::models::{Category, Session, SessionFilter, DEFAULT_CATEGORY_COLOR, TIMESTAMP_FORMAT};

use super::Database;

const SESSION_COLUMNS: &str = "s.id, s.user_id, s.category_id, COALESCE(c.name, ''), s.duration,
     s.planned_duration, s.completed, s.started_at, s.completed_at, s.note";

impl Database {
    // ── Categories ─────────────────────────────────────────────────────

    pub fn list_categories(&self, user_id: i64) -> Result<Vec<Category>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, user_id, name, color, icon FROM categories WHERE user_id = ?1 ORDER BY id",
        )?;
        let categories = stmt
            .query_map(params![user_id], category_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(categories)
    }

    /// # Errors
    /// Returns `NotFound` if the category does not exist for this user.
    pub fn get_category(&self, user_id: i64, id: i64) -> Result<Category> {
        self.conn()
            .query_row(
                "SELECT id, user_id, name, color, icon FROM categories WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
                category_from_row,
            )
            .optional()?
            .ok_or_else(|| CoreError::not_found("category", id))
    }

    /// # Errors
    /// Returns a validation error if `name` is blank.
    pub fn create_category(
        &self,
        user_id: i64,
        name: &str,
        color: Option<&str>,
        icon: Option<&str>,
    ) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::invalid("name", "must not be empty").into());
        }
        self.get_user(user_id)?;

        let color = color.filter(|c| !c.is_empty()).unwrap_or(DEFAULT_CATEGORY_COLOR);
        let icon = icon.unwrap_or_default();
        self.conn().execute(
            "INSERT INTO categories (user_id, name, color, icon) VALUES (?1, ?2, ?3, ?4)",
            params![user_id, name, color, icon],
        )?;
        let id = self.conn().last_insert_rowid();
        info!(user_id, category_id = id, category = name, "created category");

        Ok(Category {
            id,
            user_id,
            name: name.to_string(),
            color: color.to_string(),
            icon: icon.to_string(),
        })
    }

    /// Rename or recolor a category. Empty `name`/`color` keep the current
    /// value; `icon` always replaces it.
    ///
    /// # Errors
    /// Returns `NotFound` if the category does not exist for this user.
    pub fn update_category(
        &self,
        user_id: i64,
        id: i64,
        name: Option<&str>,
        color: Option<&str>,
        icon: Option<&str>,
    ) -> Result<Category> {
        let mut category = self.get_category(user_id, id)?;
        if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
            category.name = name.to_string();
        }
        if let Some(color) = color.filter(|c| !c.is_empty()) {
            category.color = color.to_string();
        }
        category.icon = icon.unwrap_or_default().to_string();

        self.conn().execute(
            "UPDATE categories SET name = ?1, color = ?2, icon = ?3 WHERE id = ?4 AND user_id = ?5",
            params![category.name, category.color, category.icon, id, user_id],
        )?;
        Ok(category)
    }

    /// # Errors
    /// Returns `NotFound` for an unknown category and `Conflict` while any
    /// session still references it.
    pub fn delete_category(&self, user_id: i64, id: i64) -> Result<()> {
        self.get_category(user_id, id)?;
        let sessions: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM sessions WHERE category_id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        if sessions > 0 {
            return Err(CoreError::Conflict(format!(
                "category {id} still has {sessions} session(s)"
            )));
        }
        self.conn().execute(
            "DELETE FROM categories WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        info!(user_id, category_id = id, "deleted category");
        Ok(())
    }

    // ── Sessions ───────────────────────────────────────────────────────

    /// Start a session in one of the user's categories.
    ///
    /// A missing or zero `planned_duration` falls back to the user's
    /// `default_duration` setting.
    ///
    /// # Errors
    /// Returns `NotFound` if the category does not belong to the user.
    pub fn start_session(
        &self,
        user_id: i64,
        category_id: i64,
        planned_duration: Option<u32>,
        note: &str,
        started_at: NaiveDateTime,
    ) -> Result<Session> {
        self.get_category(user_id, category_id)?;
        let planned = match planned_duration {
            Some(secs) if secs > 0 => secs,
            _ => self.get_settings(user_id)?.default_duration,
        };

        self.conn().execute(
            "INSERT INTO sessions (user_id, category_id, planned_duration, started_at, note)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user_id,
                category_id,
                planned,
                started_at.format(TIMESTAMP_FORMAT).to_string(),
                note,
            ],
        )?;
        let id = self.conn().last_insert_rowid();
        info!(user_id, session_id = id, category_id, planned, "started session");
        self.get_session(user_id, id)
    }

    /// Finish a session, recording its actual length.
    ///
    /// `completed = false` marks a cancelled session; its duration is still
    /// stored but it never counts towards statistics or check-ins.
    ///
    /// # Errors
    /// Returns `NotFound` if the session does not belong to the user.
    pub fn finish_session(
        &self,
        user_id: i64,
        id: i64,
        completed: bool,
        finished_at: NaiveDateTime,
    ) -> Result<Session> {
        let session = self.get_session(user_id, id)?;
        let duration = (finished_at - session.started_at).num_seconds().max(0);

        self.conn().execute(
            "UPDATE sessions SET completed = ?1, completed_at = ?2, duration = ?3
             WHERE id = ?4 AND user_id = ?5",
            params![
                completed,
                finished_at.format(TIMESTAMP_FORMAT).to_string(),
                duration,
                id,
                user_id,
            ],
        )?;
        info!(user_id, session_id = id, completed, duration, "finished session");
        self.get_session(user_id, id)
    }

    /// Insert a session that has already finished.
    ///
    /// # Errors
    /// Returns `NotFound` if the category does not belong to the user, and a
    /// validation error if `duration_secs` pushes the end time out of range.
    pub fn record_session(
        &self,
        user_id: i64,
        category_id: i64,
        started_at: NaiveDateTime,
        duration_secs: u64,
        completed: bool,
        note: &str,
    ) -> Result<Session> {
        self.get_category(user_id, category_id)?;
        let completed_at = i64::try_from(duration_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|d| started_at.checked_add_signed(d))
            .ok_or_else(|| ValidationError::invalid("duration", "out of range"))?;

        self.conn().execute(
            "INSERT INTO sessions
                (user_id, category_id, duration, planned_duration, completed, started_at, completed_at, note)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                user_id,
                category_id,
                duration_secs,
                self.get_settings(user_id)?.default_duration,
                completed,
                started_at.format(TIMESTAMP_FORMAT).to_string(),
                completed_at.format(TIMESTAMP_FORMAT).to_string(),
                note,
            ],
        )?;
        let id = self.conn().last_insert_rowid();
        self.get_session(user_id, id)
    }

    /// # Errors
    /// Returns `NotFound` if the session does not belong to the user.
    pub fn get_session(&self, user_id: i64, id: i64) -> Result<Session> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS}
             FROM sessions s LEFT JOIN categories c ON c.id = s.category_id
             WHERE s.id = ?1 AND s.user_id = ?2"
        );
        self.conn()
            .query_row(&sql, params![id, user_id], session_from_row)
            .optional()?
            .ok_or_else(|| CoreError::not_found("session", id))
    }

    /// Session history, newest first.
    pub fn list_sessions(
        &self,
        user_id: i64,
        filter: SessionFilter,
        limit: usize,
    ) -> Result<Vec<Session>> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS}
             FROM sessions s LEFT JOIN categories c ON c.id = s.category_id
             WHERE s.user_id = ?1
               AND (?2 IS NULL OR s.category_id = ?2)
               AND (?3 IS NULL OR s.completed = ?3)
             ORDER BY s.started_at DESC, s.id DESC
             LIMIT ?4"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let sessions = stmt
            .query_map(
                params![user_id, filter.category_id, filter.completed, limit as i64],
                session_from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sessions)
    }

    // ── Daily totals ───────────────────────────────────────────────────

    /// Completed session time per calendar date, most recent first.
    ///
    /// Dates come straight from `date(started_at)` and are not validated
    /// here; the streak calculator decides what to do with malformed ones.
    pub fn daily_totals(&self, user_id: i64, limit: usize) -> Result<Vec<DailyTotal>> {
        let mut stmt = self.conn().prepare(
            "SELECT COALESCE(date(started_at), started_at) AS day, SUM(duration)
             FROM sessions
             WHERE user_id = ?1 AND completed = 1
             GROUP BY day
             ORDER BY day DESC
             LIMIT ?2",
        )?;
        let totals = stmt
            .query_map(params![user_id, limit as i64], |row| {
                Ok(DailyTotal::new(row.get::<_, String>(0)?, row.get::<_, u64>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(totals)
    }

    /// Completed `(seconds, session count)` for sessions started on `day`.
    pub fn today_totals(&self, user_id: i64, day: NaiveDate) -> Result<(u64, u64)> {
        let totals = self.conn().query_row(
            "SELECT COALESCE(SUM(duration), 0), COUNT(*)
             FROM sessions
             WHERE user_id = ?1 AND completed = 1 AND date(started_at) = ?2",
            params![user_id, day.format(DATE_FORMAT).to_string()],
            |row| Ok((row.get::<_, u64>(0)?, row.get::<_, u64>(1)?)),
        )?;
        Ok(totals)
    }
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        color: row.get(3)?,
        icon: row.get(4)?,
    })
}

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<Session> {
    let completed_at = row
        .get::<_, Option<String>>(8)?
        .map(|s| parse_timestamp(8, &s))
        .transpose()?;

    Ok(Session {
        id: row.get(0)?,
        user_id: row.get(1)?,
        category_id: row.get(2)?,
        category_name: row.get(3)?,
        duration: row.get(4)?,
        planned_duration: row.get(5)?,
        completed: row.get(6)?,
        started_at: parse_timestamp(7, &row.get::<_, String>(7)?)?,
        completed_at,
        note: row.get(9)?,
    })
}

fn parse_timestamp(idx: usize, s: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
