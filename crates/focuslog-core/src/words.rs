//! Daily vocabulary logging.
//!
//! Each user has at most one record per calendar date; submitting again
//! for the same date overwrites the count and note.

use chrono::{Duration, NaiveDate};
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::checkin::DATE_FORMAT;
use crate::error::{CoreError, Result};
use crate::models::parse_date;
use crate::storage::Database;

/// Days covered by [`WordStats::last_7_days`].
const RECENT_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRecord {
    /// 0 for a day with nothing logged yet.
    pub id: i64,
    pub user_id: i64,
    pub date: String,
    pub word_count: u32,
    pub note: String,
}

/// Whether a submission created a new record or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordStats {
    pub total_words: u64,
    pub total_days: u64,
    pub avg_per_day: f64,
    pub last_7_days: Vec<WordRecord>,
}

impl Database {
    /// Create or replace the word count for `date` (today when `None`).
    ///
    /// # Errors
    /// Returns a validation error if `date` is not `YYYY-MM-DD`.
    pub fn submit_words(
        &self,
        user_id: i64,
        date: Option<&str>,
        today: NaiveDate,
        word_count: u32,
        note: &str,
    ) -> Result<(WordRecord, SubmitOutcome)> {
        let date = match date {
            Some(d) => parse_date(d)?,
            None => today,
        }
        .format(DATE_FORMAT)
        .to_string();
        self.get_user(user_id)?;

        let existing = self.word_record_on(user_id, &date)?;
        let outcome = match existing {
            Some(record) => {
                self.conn().execute(
                    "UPDATE word_records SET word_count = ?1, note = ?2 WHERE id = ?3",
                    params![word_count, note, record.id],
                )?;
                SubmitOutcome::Updated
            }
            None => {
                self.conn().execute(
                    "INSERT INTO word_records (user_id, date, word_count, note)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![user_id, date, word_count, note],
                )?;
                SubmitOutcome::Created
            }
        };

        let record = self
            .word_record_on(user_id, &date)?
            .ok_or_else(|| CoreError::not_found("word record", &date))?;
        info!(user_id, date = %record.date, word_count, ?outcome, "saved word count");
        Ok((record, outcome))
    }

    /// All of a user's word records, newest first.
    pub fn list_words(&self, user_id: i64) -> Result<Vec<WordRecord>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, user_id, date, word_count, note FROM word_records
             WHERE user_id = ?1 ORDER BY date DESC",
        )?;
        let records = stmt
            .query_map(params![user_id], word_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Today's record, or an empty one (id 0) if nothing was logged.
    pub fn today_words(&self, user_id: i64, today: NaiveDate) -> Result<WordRecord> {
        let date = today.format(DATE_FORMAT).to_string();
        Ok(self
            .word_record_on(user_id, &date)?
            .unwrap_or_else(|| WordRecord {
                id: 0,
                user_id,
                date,
                word_count: 0,
                note: String::new(),
            }))
    }

    pub fn word_stats(&self, user_id: i64, today: NaiveDate) -> Result<WordStats> {
        let (total_words, total_days): (u64, u64) = self.conn().query_row(
            "SELECT COALESCE(SUM(word_count), 0), COUNT(*) FROM word_records WHERE user_id = ?1",
            params![user_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let avg_per_day = if total_days > 0 {
            total_words as f64 / total_days as f64
        } else {
            0.0
        };

        let since = (today - Duration::days(RECENT_DAYS))
            .format(DATE_FORMAT)
            .to_string();
        let mut stmt = self.conn().prepare(
            "SELECT id, user_id, date, word_count, note FROM word_records
             WHERE user_id = ?1 AND date >= ?2 ORDER BY date DESC",
        )?;
        let last_7_days = stmt
            .query_map(params![user_id, since], word_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(WordStats {
            total_words,
            total_days,
            avg_per_day,
            last_7_days,
        })
    }

    /// # Errors
    /// Returns `NotFound` if the record does not belong to the user.
    pub fn delete_words(&self, user_id: i64, id: i64) -> Result<()> {
        let deleted = self.conn().execute(
            "DELETE FROM word_records WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        if deleted == 0 {
            return Err(CoreError::not_found("word record", id));
        }
        info!(user_id, record_id = id, "deleted word record");
        Ok(())
    }

    fn word_record_on(&self, user_id: i64, date: &str) -> Result<Option<WordRecord>> {
        let record = self
            .conn()
            .query_row(
                "SELECT id, user_id, date, word_count, note FROM word_records
                 WHERE user_id = ?1 AND date = ?2",
                params![user_id, date],
                word_from_row,
            )
            .optional()?;
        Ok(record)
    }
}

fn word_from_row(row: &Row<'_>) -> rusqlite::Result<WordRecord> {
    Ok(WordRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        date: row.get(2)?,
        word_count: row.get(3)?,
        note: row.get(4)?,
    })
}
