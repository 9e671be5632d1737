use chrono::{NaiveDateTime, TimeDelta};
use clap::Subcommand;
use focuslog_core::models::TIMESTAMP_FORMAT;
use focuslog_core::{Config, Database, SessionFilter};

use super::{now, print_json, resolve_user, CmdResult};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Start a session now
    Start {
        category_id: i64,
        /// Planned length in seconds (defaults to the user's setting)
        #[arg(long)]
        planned: Option<u32>,
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Finish a running session now
    Finish {
        id: i64,
        /// Mark the session as abandoned; it will not count towards stats
        #[arg(long)]
        cancel: bool,
    },
    /// Record a session that already happened
    Log {
        category_id: i64,
        /// Length in minutes
        #[arg(long)]
        minutes: u64,
        /// Start time as YYYY-MM-DDTHH:MM:SS (defaults to `minutes` ago)
        #[arg(long, value_parser = parse_timestamp)]
        started_at: Option<NaiveDateTime>,
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Session history, newest first
    List {
        #[arg(long)]
        category: Option<i64>,
        #[arg(long)]
        completed: Option<bool>,
        #[arg(long)]
        limit: Option<usize>,
    },
}

const DURATION_OUT_OF_RANGE: &str = "invalid value for 'duration': out of range";

fn parse_timestamp(s: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map_err(|e| format!("expected YYYY-MM-DDTHH:MM:SS: {e}"))
}

pub fn run(action: SessionAction, user: Option<&str>) -> CmdResult {
    let db = Database::open()?;
    let user = resolve_user(&db, user)?;

    match action {
        SessionAction::Start {
            category_id,
            planned,
            note,
        } => {
            let session = db.start_session(user.id, category_id, planned, &note, now())?;
            print_json(&session)?;
        }
        SessionAction::Finish { id, cancel } => {
            let session = db.finish_session(user.id, id, !cancel, now())?;
            print_json(&session)?;
        }
        SessionAction::Log {
            category_id,
            minutes,
            started_at,
            note,
        } => {
            let duration_secs = minutes.checked_mul(60).ok_or(DURATION_OUT_OF_RANGE)?;
            let started_at = match started_at {
                Some(at) => at,
                None => i64::try_from(duration_secs)
                    .ok()
                    .and_then(TimeDelta::try_seconds)
                    .and_then(|d| now().checked_sub_signed(d))
                    .ok_or(DURATION_OUT_OF_RANGE)?,
            };
            let session =
                db.record_session(user.id, category_id, started_at, duration_secs, true, &note)?;
            print_json(&session)?;
        }
        SessionAction::List {
            category,
            completed,
            limit,
        } => {
            let limit = limit.unwrap_or_else(|| Config::load_or_default().stats.history_limit);
            let filter = SessionFilter {
                category_id: category,
                completed,
            };
            print_json(&db.list_sessions(user.id, filter, limit)?)?;
        }
    }
    Ok(())
}
