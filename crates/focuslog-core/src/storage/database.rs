//! SQLite-based storage for accounts, settings and application state.
//!
//! Provides persistent storage for:
//! - User accounts (each with default settings and categories)
//! - Per-user timer and goal settings
//! - Key-value store for application state
//!
//! Category, session and word queries live alongside the modules that use
//! them, as further `impl Database` blocks.

use std::path::Path;

use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use crate::error::{CoreError, DatabaseError, Result, ValidationError};
use crate::models::{
    SettingsUpdate, User, UserSettings, DEFAULT_CATEGORIES, TIMESTAMP_FORMAT,
};

use super::{data_dir, DefaultsConfig};

/// SQLite database holding every user's data.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/focuslog/focuslog.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("focuslog.db");
        Self::open_at(&path)
    }

    /// Open (or create) the database at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::init(conn)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        super::migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    // ── Users ──────────────────────────────────────────────────────────

    /// Register a user along with default settings and categories.
    ///
    /// # Errors
    /// Returns a validation error for a malformed username or email, and
    /// `Conflict` if either is already taken.
    pub fn create_user(&self, username: &str, email: &str) -> Result<User> {
        self.create_user_with_defaults(username, email, &DefaultsConfig::default())
    }

    /// Like [`Database::create_user`], seeding the goal and session length
    /// from the `[defaults]` config table.
    pub fn create_user_with_defaults(
        &self,
        username: &str,
        email: &str,
        config: &DefaultsConfig,
    ) -> Result<User> {
        let name_len = username.chars().count();
        if !(3..=20).contains(&name_len) {
            return Err(ValidationError::invalid("username", "must be 3 to 20 characters").into());
        }
        if !is_plausible_email(email) {
            return Err(ValidationError::invalid("email", "not a valid address").into());
        }

        let taken: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM users WHERE username = ?1 OR email = ?2",
            params![username, email],
            |row| row.get(0),
        )?;
        if taken > 0 {
            return Err(CoreError::Conflict("username or email already exists".into()));
        }

        let created_at = Local::now().naive_local().format(TIMESTAMP_FORMAT).to_string();
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO users (username, email, created_at) VALUES (?1, ?2, ?3)",
            params![username, email, created_at],
        )?;
        let user_id = tx.last_insert_rowid();

        let defaults = UserSettings {
            daily_goal: config.daily_goal,
            default_duration: config.default_duration,
            ..UserSettings::defaults_for(user_id)
        };
        write_settings(&tx, &defaults)?;
        for (name, color) in DEFAULT_CATEGORIES {
            tx.execute(
                "INSERT INTO categories (user_id, name, color) VALUES (?1, ?2, ?3)",
                params![user_id, name, color],
            )?;
        }
        tx.commit()?;

        info!(user_id, username, "registered user");
        Ok(User {
            id: user_id,
            username: username.to_string(),
            email: email.to_string(),
            created_at,
        })
    }

    /// # Errors
    /// Returns `NotFound` if no user has this id.
    pub fn get_user(&self, id: i64) -> Result<User> {
        self.conn
            .query_row(
                "SELECT id, username, email, created_at FROM users WHERE id = ?1",
                params![id],
                user_from_row,
            )
            .optional()?
            .ok_or_else(|| CoreError::not_found("user", id))
    }

    /// # Errors
    /// Returns `NotFound` if no user has this username.
    pub fn find_user(&self, username: &str) -> Result<User> {
        self.conn
            .query_row(
                "SELECT id, username, email, created_at FROM users WHERE username = ?1",
                params![username],
                user_from_row,
            )
            .optional()?
            .ok_or_else(|| CoreError::not_found("user", username))
    }

    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, username, email, created_at FROM users ORDER BY id")?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(users)
    }

    // ── Settings ───────────────────────────────────────────────────────

    /// Settings for `user_id`, or the defaults if none were ever saved.
    pub fn get_settings(&self, user_id: i64) -> Result<UserSettings> {
        let stored = self
            .conn
            .query_row(
                "SELECT user_id, default_duration, short_break, long_break, auto_start_break,
                        notification_enabled, daily_goal, exam_date, exam_name
                 FROM settings WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(UserSettings {
                        user_id: row.get(0)?,
                        default_duration: row.get(1)?,
                        short_break: row.get(2)?,
                        long_break: row.get(3)?,
                        auto_start_break: row.get(4)?,
                        notification_enabled: row.get(5)?,
                        daily_goal: row.get(6)?,
                        exam_date: row.get(7)?,
                        exam_name: row.get(8)?,
                    })
                },
            )
            .optional()?;
        Ok(stored.unwrap_or_else(|| UserSettings::defaults_for(user_id)))
    }

    /// Apply a partial update, creating the settings row if needed.
    ///
    /// # Errors
    /// Returns a validation error if a supplied value is rejected; nothing
    /// is written in that case.
    pub fn update_settings(&self, user_id: i64, update: SettingsUpdate) -> Result<UserSettings> {
        self.get_user(user_id)?;
        let mut settings = self.get_settings(user_id)?;
        update.apply(&mut settings)?;
        write_settings(&self.conn, &settings)?;
        info!(user_id, daily_goal = settings.daily_goal, "updated settings");
        Ok(settings)
    }

    // ── Key-value store ────────────────────────────────────────────────

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn write_settings(conn: &Connection, s: &UserSettings) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO settings
            (user_id, default_duration, short_break, long_break, auto_start_break,
             notification_enabled, daily_goal, exam_date, exam_name)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            s.user_id,
            s.default_duration,
            s.short_break,
            s.long_break,
            s.auto_start_break,
            s.notification_enabled,
            s.daily_goal,
            s.exam_date,
            s.exam_name,
        ],
    )?;
    Ok(())
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.contains('@'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_seeds_settings_and_categories() {
        let db = Database::open_memory().unwrap();
        let user = db.create_user("alice", "alice@example.com").unwrap();

        let settings = db.get_settings(user.id).unwrap();
        assert_eq!(settings, UserSettings::defaults_for(user.id));

        let categories = db.list_categories(user.id).unwrap();
        let names: Vec<_> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Study", "Work", "Exercise"]);
    }

    #[test]
    fn configured_defaults_seed_new_users() {
        let db = Database::open_memory().unwrap();
        let defaults = DefaultsConfig {
            daily_goal: 3600,
            default_duration: 3000,
        };
        let user = db
            .create_user_with_defaults("greta", "greta@example.com", &defaults)
            .unwrap();

        let settings = db.get_settings(user.id).unwrap();
        assert_eq!(settings.daily_goal, 3600);
        assert_eq!(settings.default_duration, 3000);
        assert_eq!(settings.short_break, 300);
    }

    #[test]
    fn duplicate_username_or_email_conflicts() {
        let db = Database::open_memory().unwrap();
        db.create_user("alice", "alice@example.com").unwrap();
        assert!(matches!(
            db.create_user("alice", "other@example.com"),
            Err(CoreError::Conflict(_))
        ));
        assert!(matches!(
            db.create_user("alicia", "alice@example.com"),
            Err(CoreError::Conflict(_))
        ));
    }

    #[test]
    fn user_input_is_validated() {
        let db = Database::open_memory().unwrap();
        assert!(matches!(
            db.create_user("al", "al@example.com"),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            db.create_user("alice", "not-an-email"),
            Err(CoreError::Validation(_))
        ));
        assert!(db.list_users().unwrap().is_empty());
    }

    #[test]
    fn find_missing_user_is_not_found() {
        let db = Database::open_memory().unwrap();
        assert!(matches!(
            db.find_user("ghost"),
            Err(CoreError::NotFound { entity: "user", .. })
        ));
    }

    #[test]
    fn settings_update_persists() {
        let db = Database::open_memory().unwrap();
        let user = db.create_user("bob", "bob@example.com").unwrap();
        db.update_settings(
            user.id,
            SettingsUpdate {
                daily_goal: Some(1800),
                exam_date: Some("2025-06-01".into()),
                ..Default::default()
            },
        )
        .unwrap();

        let settings = db.get_settings(user.id).unwrap();
        assert_eq!(settings.daily_goal, 1800);
        assert_eq!(settings.exam_date.as_deref(), Some("2025-06-01"));
        assert_eq!(settings.short_break, 300);
    }

    #[test]
    fn settings_for_unknown_user_fall_back_to_defaults() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.get_settings(99).unwrap().daily_goal, 7200);
        assert!(db.update_settings(99, SettingsUpdate::default()).is_err());
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
    }
}
