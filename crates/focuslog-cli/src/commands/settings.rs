use clap::{Args, Subcommand};
use focuslog_core::{Database, SettingsUpdate};

use super::{print_json, resolve_user, CmdResult};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show the user's settings
    Show,
    /// Change one or more settings
    Set(SetArgs),
}

#[derive(Args)]
pub struct SetArgs {
    /// Default session length in seconds
    #[arg(long)]
    default_duration: Option<u32>,
    #[arg(long)]
    short_break: Option<u32>,
    #[arg(long)]
    long_break: Option<u32>,
    #[arg(long)]
    auto_start_break: Option<bool>,
    #[arg(long)]
    notifications: Option<bool>,
    /// Seconds of completed sessions needed for a check-in
    #[arg(long)]
    daily_goal: Option<u64>,
    /// YYYY-MM-DD; an empty string clears it
    #[arg(long)]
    exam_date: Option<String>,
    #[arg(long)]
    exam_name: Option<String>,
}

impl From<SetArgs> for SettingsUpdate {
    fn from(args: SetArgs) -> Self {
        SettingsUpdate {
            default_duration: args.default_duration,
            short_break: args.short_break,
            long_break: args.long_break,
            auto_start_break: args.auto_start_break,
            notification_enabled: args.notifications,
            daily_goal: args.daily_goal,
            exam_date: args.exam_date,
            exam_name: args.exam_name,
        }
    }
}

pub fn run(action: SettingsAction, user: Option<&str>) -> CmdResult {
    let db = Database::open()?;
    let user = resolve_user(&db, user)?;

    match action {
        SettingsAction::Show => print_json(&db.get_settings(user.id)?)?,
        SettingsAction::Set(args) => print_json(&db.update_settings(user.id, args.into())?)?,
    }
    Ok(())
}
