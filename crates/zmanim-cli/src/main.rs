use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "zmanim", version, about = "Zmanim notification scheduler")]
struct Cli {
    /// Config file (default: ~/.config/zmanim-notify/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scheduler until interrupted
    Run,
    /// Fetch today's times and show the planned notifications
    Today {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the persisted current and hour records
    State {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Read one label's persisted record
    Read {
        /// Label key (e.g. "sunset", "sofZmanShma")
        label: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Run => commands::run::run(config),
        Commands::Today { json } => commands::today::run(config, json),
        Commands::State { json } => commands::state::run_state(config, json),
        Commands::Read { label, json } => commands::state::run_read(config, &label, json),
        Commands::Config { action } => commands::config::run(config, action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
