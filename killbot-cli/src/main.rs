//! killbot CLI
//!
//! Inspect and maintain the kill notification bot's database: tracked
//! organizations, static-data lookups and ad-hoc queries.

mod commands;
mod error;

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use killbot_db::{DatabaseConfig, RelationalStore};

pub(crate) use error::CliError;

#[derive(Parser)]
#[command(name = "killbot")]
#[command(about = "Manage the kill notification bot's database", long_about = None)]
struct Cli {
    /// Use a local SQLite file instead of the configured database (tables are created if missing)
    #[arg(long, global = true)]
    sqlite: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage tracked organizations
    Orgs {
        #[command(subcommand)]
        action: OrgsAction,
    },

    /// Look up a ship type name
    Ship {
        /// Ship type ID
        type_id: i64,
    },

    /// Look up the region of a solar system
    Region {
        /// Solar system ID
        solar_system_id: i64,
    },

    /// Run a parameterized SELECT and print the rows as JSON
    Query {
        /// SQL text with `?` placeholders
        sql: String,

        /// Positional parameters (integers, floats, or text)
        params: Vec<String>,
    },

    /// Show database configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum OrgsAction {
    /// List all tracked organizations
    List {
        /// Print as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Show one organization with its ignored regions
    Show {
        /// Internal organization ID
        id: i64,

        /// Print as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Start tracking an organization
    Add {
        /// External corporation ID
        external_id: i64,

        /// Initial kill cursor
        #[arg(long, default_value_t = 0)]
        last_kill: i64,

        /// Initial loss cursor
        #[arg(long, default_value_t = 0)]
        last_loss: i64,
    },

    /// Move the kill/loss cursors of an organization
    SetCursors {
        /// Internal organization ID
        id: i64,

        /// New kill cursor
        #[arg(long)]
        kill: Option<i64>,

        /// New loss cursor
        #[arg(long)]
        loss: Option<i64>,

        /// Allow moving cursors backwards
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current settings and their sources
    Show,

    /// Print the config file path
    Path,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(cli.sqlite.as_deref()),
            ConfigAction::Path => commands::config::run_config_path(),
        },
        Commands::Orgs { action } => {
            let store = open_store(cli.sqlite)?;
            match action {
                OrgsAction::List { json } => commands::orgs::run_orgs_list(&store, json),
                OrgsAction::Show { id, json } => commands::orgs::run_orgs_show(&store, id, json),
                OrgsAction::Add {
                    external_id,
                    last_kill,
                    last_loss,
                } => commands::orgs::run_orgs_add(&store, external_id, last_kill, last_loss),
                OrgsAction::SetCursors {
                    id,
                    kill,
                    loss,
                    force,
                } => commands::orgs::run_orgs_set_cursors(&store, id, kill, loss, force),
            }
        }
        Commands::Ship { type_id } => {
            let store = open_store(cli.sqlite)?;
            commands::lookup::run_ship(&store, type_id)
        }
        Commands::Region { solar_system_id } => {
            let store = open_store(cli.sqlite)?;
            commands::lookup::run_region(&store, solar_system_id)
        }
        Commands::Query { sql, params } => {
            let store = open_store(cli.sqlite)?;
            commands::lookup::run_query(&store, &sql, &params)
        }
    }
}

/// Open the store named by `--sqlite`, or the configured one.
fn open_store(sqlite: Option<PathBuf>) -> Result<RelationalStore, CliError> {
    if let Some(path) = sqlite {
        return killbot_db::open_database(&path).map_err(|e| {
            CliError::database(format!("Failed to open {}: {}", path.display(), e))
        });
    }

    let config = DatabaseConfig::load()?;
    let mut store = RelationalStore::new(config);
    store.connect()?;
    Ok(store)
}
