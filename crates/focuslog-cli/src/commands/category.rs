use clap::Subcommand;
use focuslog_core::Database;

use super::{print_json, resolve_user, CmdResult};

#[derive(Subcommand)]
pub enum CategoryAction {
    /// List categories
    List,
    /// Create a category
    Add {
        name: String,
        /// Hex color, e.g. "#4ECDC4"
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Rename, recolor or change the icon of a category
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
        /// Replaces the icon; omitted clears it
        #[arg(long)]
        icon: Option<String>,
    },
    /// Delete a category with no sessions
    Delete { id: i64 },
}

pub fn run(action: CategoryAction, user: Option<&str>) -> CmdResult {
    let db = Database::open()?;
    let user = resolve_user(&db, user)?;

    match action {
        CategoryAction::List => print_json(&db.list_categories(user.id)?)?,
        CategoryAction::Add { name, color, icon } => {
            let category =
                db.create_category(user.id, &name, color.as_deref(), icon.as_deref())?;
            print_json(&category)?;
        }
        CategoryAction::Update {
            id,
            name,
            color,
            icon,
        } => {
            let category = db.update_category(
                user.id,
                id,
                name.as_deref(),
                color.as_deref(),
                icon.as_deref(),
            )?;
            print_json(&category)?;
        }
        CategoryAction::Delete { id } => {
            db.delete_category(user.id, id)?;
            println!("deleted category {id}");
        }
    }
    Ok(())
}
