//! Database schema migrations for focuslog.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};
use tracing::{info, warn};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    if current_version < SCHEMA_VERSION {
        info!(from = current_version, to = SCHEMA_VERSION, "database schema migrated");
    }
    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            warn!("failed to read schema_version: {e}");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: accounts, categories, sessions, settings and the kv store.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            username    TEXT NOT NULL UNIQUE,
            email       TEXT NOT NULL UNIQUE,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS categories (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     INTEGER NOT NULL REFERENCES users(id),
            name        TEXT NOT NULL,
            color       TEXT NOT NULL DEFAULT '#FF6B6B',
            icon        TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS sessions (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id          INTEGER NOT NULL REFERENCES users(id),
            category_id      INTEGER NOT NULL REFERENCES categories(id),
            duration         INTEGER NOT NULL DEFAULT 0,
            planned_duration INTEGER NOT NULL DEFAULT 1500,
            completed        INTEGER NOT NULL DEFAULT 0,
            started_at       TEXT NOT NULL,
            completed_at     TEXT,
            note             TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS settings (
            user_id              INTEGER PRIMARY KEY REFERENCES users(id),
            default_duration     INTEGER NOT NULL DEFAULT 1500,
            short_break          INTEGER NOT NULL DEFAULT 300,
            long_break           INTEGER NOT NULL DEFAULT 900,
            auto_start_break     INTEGER NOT NULL DEFAULT 0,
            notification_enabled INTEGER NOT NULL DEFAULT 1,
            daily_goal           INTEGER NOT NULL DEFAULT 7200
        );

        CREATE TABLE IF NOT EXISTS kv (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_categories_user ON categories(user_id);
        CREATE INDEX IF NOT EXISTS idx_sessions_user_started ON sessions(user_id, started_at);
        CREATE INDEX IF NOT EXISTS idx_sessions_user_completed ON sessions(user_id, completed);",
    )?;

    set_schema_version(&tx, 1)?;
    tx.commit()
}

/// Migration v2: exam countdown fields and daily word records.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "ALTER TABLE settings ADD COLUMN exam_date TEXT;
         ALTER TABLE settings ADD COLUMN exam_name TEXT NOT NULL DEFAULT '';

         CREATE TABLE IF NOT EXISTS word_records (
             id          INTEGER PRIMARY KEY AUTOINCREMENT,
             user_id     INTEGER NOT NULL REFERENCES users(id),
             date        TEXT NOT NULL,
             word_count  INTEGER NOT NULL DEFAULT 0,
             note        TEXT NOT NULL DEFAULT '',
             UNIQUE (user_id, date)
         );",
    )?;

    set_schema_version(&tx, 2)?;
    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrate_from_scratch() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), SCHEMA_VERSION);

        let tables: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master
                 WHERE type = 'table'
                   AND name IN ('users', 'categories', 'sessions', 'settings', 'kv', 'word_records')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 6);
    }

    #[test]
    fn test_migrate_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), SCHEMA_VERSION);
    }

    #[test]
    fn test_incremental_migration_keeps_settings() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema_version_table(&conn).unwrap();
        migrate_v1(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO users (username, email, created_at) VALUES ('ann', 'ann@x.io', '2024-01-01');
             INSERT INTO settings (user_id, daily_goal) VALUES (1, 3600);",
        )
        .unwrap();

        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), 2);

        let (goal, exam_name): (i64, String) = conn
            .query_row(
                "SELECT daily_goal, exam_name FROM settings WHERE user_id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(goal, 3600);
        assert_eq!(exam_name, "");
    }
}
