mod commands;
mod config;
mod server;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::process;
use tracing_subscriber::{EnvFilter, fmt};

use crate::commands::{
    cmd_activity_list, cmd_activity_log, cmd_activity_total, cmd_add, cmd_catalog_import,
    cmd_catalog_list, cmd_clear, cmd_delete, cmd_goal_set, cmd_goal_show, cmd_list, cmd_summary,
    cmd_water_log, cmd_water_show,
};
use crate::config::Config;
use tally_core::catalog::Catalog;
use tally_core::db::Database;
use tally_core::memory::MemoryStore;
use tally_core::service::Tracker;

#[derive(Parser)]
#[command(
    name = "tally",
    version,
    about = "A simple calorie tracker CLI",
    long_about = "A simple calorie tracker: log foods from a built-in catalog, \
                  set daily goals, record activities and water, or serve it all over HTTP."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a quantity of a catalog food
    Add {
        /// Food name (case-insensitive, must match a catalog entry)
        food: String,
        /// Number of catalog units (e.g. 3 apples, 150 grams)
        quantity: f64,
        /// Date to log for (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List logged foods
    List {
        /// Only show entries for this date
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a logged food by ID
    Delete {
        /// Entry ID to delete
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete every logged food
    Clear {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Browse or extend the food catalog
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
    /// Manage daily calorie goals
    Goal {
        #[command(subcommand)]
        command: GoalCommands,
    },
    /// Track exercise
    Activity {
        #[command(subcommand)]
        command: ActivityCommands,
    },
    /// Track water intake
    Water {
        #[command(subcommand)]
        command: WaterCommands,
    },
    /// Show daily summary (defaults to today)
    Summary {
        /// Date to show (YYYY-MM-DD, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start the REST API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,
        /// Address to bind to (default: 127.0.0.1, use 0.0.0.0 to expose to network)
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: String,
        /// Disable API key authentication (for development/testing)
        #[arg(long)]
        no_auth: bool,
        /// Keep everything in memory; nothing survives a restart
        #[arg(long)]
        memory: bool,
    },
}

#[derive(Subcommand)]
enum CatalogCommands {
    /// List catalog foods
    List {
        /// Case-insensitive substring filter
        #[arg(short, long)]
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add or update catalog foods from a CSV file
    Import {
        /// CSV with columns name,calorie_per_unit,unit,kind[,protein,carbs,fat]
        file: std::path::PathBuf,
        /// Preview import without making changes
        #[arg(long)]
        dry_run: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum GoalCommands {
    /// Set the calorie goal for a day
    Set {
        /// Daily calorie goal
        calories: i64,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the calorie goal for a day
    Show {
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ActivityCommands {
    /// Log an activity
    Log {
        /// Activity name
        name: String,
        /// Duration in minutes
        #[arg(short, long, default_value = "0")]
        duration: i64,
        /// Calories burned
        #[arg(short = 'c', long, default_value = "0")]
        burned: i64,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List activities for a day
    List {
        /// Date (default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Total calories burned on a day
    Total {
        /// Date (default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum WaterCommands {
    /// Log water in millilitres
    Log {
        /// Amount in ml
        amount_ml: i64,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show water entries and total for a day
    Show {
        /// Date (default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn open_tracker(config: &Config) -> Result<Tracker> {
    let db = Database::open(&config.db_path)?;
    let catalog = db.load_catalog()?;
    Ok(Tracker::new(catalog, Box::new(db)))
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;

    match cli.command {
        Commands::Serve {
            port,
            bind,
            no_auth,
            memory,
        } => {
            let (api_key, new_api_key) = if no_auth {
                (None, false)
            } else {
                let (key, new) = config.load_or_create_api_key()?;
                (Some(key), new)
            };
            let tracker = if memory {
                tracing::info!("using in-memory store");
                Tracker::new(Catalog::builtin(), Box::new(MemoryStore::new()))
            } else {
                open_tracker(&config)?
            };
            server::start_server(tracker, port, &bind, api_key, new_api_key).await
        }
        Commands::Catalog {
            command:
                CatalogCommands::Import {
                    file,
                    dry_run,
                    json,
                },
        } => {
            let mut db = Database::open(&config.db_path)?;
            cmd_catalog_import(&mut db, &file, dry_run, json)
        }
        command => {
            let mut tracker = open_tracker(&config)?;
            run_tracker_command(&mut tracker, command)
        }
    }
}

fn run_tracker_command(tracker: &mut Tracker, command: Commands) -> Result<()> {
    match command {
        Commands::Add {
            food,
            quantity,
            date,
            json,
        } => cmd_add(tracker, &food, quantity, date, json),
        Commands::List { date, json } => cmd_list(tracker, date, json),
        Commands::Delete { id, json } => cmd_delete(tracker, id, json),
        Commands::Clear { json } => cmd_clear(tracker, json),
        Commands::Summary { date, json } => cmd_summary(tracker, date, json),
        Commands::Catalog { command } => match command {
            CatalogCommands::List { search, json } => {
                cmd_catalog_list(tracker.catalog(), search.as_deref(), json)
            }
            CatalogCommands::Import { .. } => bail!("catalog import needs the database directly"),
        },
        Commands::Goal { command } => match command {
            GoalCommands::Set {
                calories,
                date,
                json,
            } => cmd_goal_set(tracker, calories, date, json),
            GoalCommands::Show { date, json } => cmd_goal_show(tracker, date, json),
        },
        Commands::Activity { command } => match command {
            ActivityCommands::Log {
                name,
                duration,
                burned,
                date,
                json,
            } => cmd_activity_log(tracker, &name, duration, burned, date, json),
            ActivityCommands::List { date, json } => cmd_activity_list(tracker, date, json),
            ActivityCommands::Total { date, json } => cmd_activity_total(tracker, date, json),
        },
        Commands::Water { command } => match command {
            WaterCommands::Log {
                amount_ml,
                date,
                json,
            } => cmd_water_log(tracker, amount_ml, date, json),
            WaterCommands::Show { date, json } => cmd_water_show(tracker, date, json),
        },
        Commands::Serve { .. } => bail!("serve takes ownership of the tracker"),
    }
}
