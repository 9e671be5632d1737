pub mod category;
pub mod checkin;
pub mod config;
pub mod session;
pub mod settings;
pub mod stats;
pub mod user;
pub mod words;

use chrono::{Local, NaiveDate, NaiveDateTime};
use focuslog_core::{Database, User};
use serde::Serialize;

/// kv key holding the username selected with `focuslog user use`.
pub const ACTIVE_USER_KEY: &str = "active_user";

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// The user named by `--user`, falling back to the active user.
pub fn resolve_user(db: &Database, name: Option<&str>) -> Result<User, Box<dyn std::error::Error>> {
    let name = match name {
        Some(n) => n.to_string(),
        None => db
            .kv_get(ACTIVE_USER_KEY)?
            .ok_or("no active user: pass --user or run `focuslog user use <name>`")?,
    };
    Ok(db.find_user(&name)?)
}

pub fn print_json<T: Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
