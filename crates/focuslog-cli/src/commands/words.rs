use clap::Subcommand;
use focuslog_core::Database;
use serde_json::json;

use super::{print_json, resolve_user, today, CmdResult};

#[derive(Subcommand)]
pub enum WordsAction {
    /// Record the number of words learned on a day (replaces earlier entries)
    Submit {
        count: u32,
        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<String>,
        #[arg(long, default_value = "")]
        note: String,
    },
    /// All records, newest first
    List,
    /// Today's record
    Today,
    /// Totals, daily average and the last week
    Stats,
    /// Delete a record
    Delete { id: i64 },
}

pub fn run(action: WordsAction, user: Option<&str>) -> CmdResult {
    let db = Database::open()?;
    let user = resolve_user(&db, user)?;

    match action {
        WordsAction::Submit { count, date, note } => {
            let (record, outcome) =
                db.submit_words(user.id, date.as_deref(), today(), count, &note)?;
            print_json(&json!({ "outcome": outcome, "record": record }))?;
        }
        WordsAction::List => print_json(&db.list_words(user.id)?)?,
        WordsAction::Today => print_json(&db.today_words(user.id, today())?)?,
        WordsAction::Stats => print_json(&db.word_stats(user.id, today())?)?,
        WordsAction::Delete { id } => {
            db.delete_words(user.id, id)?;
            println!("deleted word record {id}");
        }
    }
    Ok(())
}
