use clap::Subcommand;
use focuslog_core::{Config, Database};
use serde_json::json;

use super::{print_json, resolve_user, today, CmdResult};

#[derive(Subcommand)]
pub enum CheckinAction {
    /// Today's progress, streak and exam countdown
    Status,
    /// Current streak only
    Streak,
}

pub fn run(action: CheckinAction, user: Option<&str>) -> CmdResult {
    let db = Database::open()?;
    let user = resolve_user(&db, user)?;
    let calculator = Config::load_or_default().streak_calculator();

    match action {
        CheckinAction::Status => {
            let status = db.checkin_status(user.id, today(), &calculator)?;
            let progress = status.progress();
            print_json(&json!({ "status": status, "progress": progress }))?;
        }
        CheckinAction::Streak => {
            let streak = db.streak(user.id, today(), &calculator)?;
            print_json(&json!({ "streak_days": streak }))?;
        }
    }
    Ok(())
}
