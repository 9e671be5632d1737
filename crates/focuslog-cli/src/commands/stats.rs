use clap::Subcommand;
use focuslog_core::{Config, Database};
use serde_json::json;

use super::{print_json, resolve_user, CmdResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Total time with a per-category breakdown
    Summary,
    /// Total completed seconds
    Total,
    /// Per-category totals
    Categories,
    /// Per-day totals, newest first
    Daily {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// All users ranked by total time
    Leaderboard {
        #[arg(long)]
        limit: Option<usize>,
    },
}

pub fn run(action: StatsAction, user: Option<&str>) -> CmdResult {
    let db = Database::open()?;
    let config = Config::load_or_default();

    match action {
        StatsAction::Summary => {
            let user = resolve_user(&db, user)?;
            print_json(&db.stats_summary(user.id)?)?;
        }
        StatsAction::Total => {
            let user = resolve_user(&db, user)?;
            print_json(&json!({ "total_duration": db.total_duration(user.id)? }))?;
        }
        StatsAction::Categories => {
            let user = resolve_user(&db, user)?;
            print_json(&db.category_stats(user.id)?)?;
        }
        StatsAction::Daily { limit } => {
            let user = resolve_user(&db, user)?;
            let limit = limit.unwrap_or(config.stats.daily_limit);
            print_json(&db.daily_stats(user.id, limit)?)?;
        }
        StatsAction::Leaderboard { limit } => {
            let limit = limit.unwrap_or(config.stats.leaderboard_limit);
            print_json(&db.leaderboard(limit)?)?;
        }
    }
    Ok(())
}
