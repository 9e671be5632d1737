use clap::{Parser, Subcommand};
use focuslog_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "focuslog", version, about = "Study session and check-in tracker")]
struct Cli {
    /// Act as this user instead of the active one
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User accounts
    User {
        #[command(subcommand)]
        action: commands::user::UserAction,
    },
    /// Session categories
    Category {
        #[command(subcommand)]
        action: commands::category::CategoryAction,
    },
    /// Timed work sessions
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Session statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Daily vocabulary log
    Words {
        #[command(subcommand)]
        action: commands::words::WordsAction,
    },
    /// Per-user timer and goal settings
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Daily goal and streak
    Checkin {
        #[command(subcommand)]
        action: commands::checkin::CheckinAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Config::load_or_default().logging.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let user = cli.user.as_deref();
    let result = match cli.command {
        Commands::User { action } => commands::user::run(action, user),
        Commands::Category { action } => commands::category::run(action, user),
        Commands::Session { action } => commands::session::run(action, user),
        Commands::Stats { action } => commands::stats::run(action, user),
        Commands::Words { action } => commands::words::run(action, user),
        Commands::Settings { action } => commands::settings::run(action, user),
        Commands::Checkin { action } => commands::checkin::run(action, user),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        tracing::debug!("command failed: {e:?}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
