use clap::Subcommand;
use focuslog_core::{Config, Database};

use super::{print_json, resolve_user, CmdResult, ACTIVE_USER_KEY};

#[derive(Subcommand)]
pub enum UserAction {
    /// Register a user (creates default settings and categories)
    Add {
        /// Username, 3-20 characters
        username: String,
        email: String,
    },
    /// List all users
    List,
    /// Make a user the default for later commands
    Use { username: String },
    /// Show the current user
    Show,
}

pub fn run(action: UserAction, user: Option<&str>) -> CmdResult {
    let db = Database::open()?;

    match action {
        UserAction::Add { username, email } => {
            let defaults = Config::load_or_default().defaults;
            let created = db.create_user_with_defaults(&username, &email, &defaults)?;
            if db.kv_get(ACTIVE_USER_KEY)?.is_none() {
                db.kv_set(ACTIVE_USER_KEY, &created.username)?;
            }
            print_json(&created)?;
        }
        UserAction::List => print_json(&db.list_users()?)?,
        UserAction::Use { username } => {
            let found = db.find_user(&username)?;
            db.kv_set(ACTIVE_USER_KEY, &found.username)?;
            println!("active user: {}", found.username);
        }
        UserAction::Show => print_json(&resolve_user(&db, user)?)?,
    }
    Ok(())
}
