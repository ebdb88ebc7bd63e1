use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "studyplan", version, about = "Study task planner")]
struct Cli {
    /// Dataset JSON file (overrides data.dataset_path)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Show debug logs (STUDYPLAN_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build today's plan
    Plan(commands::plan::PlanArgs),
    /// Show open tasks by priority
    Score {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Exam readiness per course
    Readiness {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Unit mastery
    Mastery {
        /// Recompute one unit and mark it studied now
        #[arg(long, value_name = "UNIT", conflicts_with = "refresh")]
        update: Option<String>,
        /// Recompute every unit and save the dataset
        #[arg(long)]
        refresh: bool,
    },
    /// Review tasks for units with repeated mistakes
    Remediate {
        /// Add the review tasks to the dataset
        #[arg(long)]
        apply: bool,
    },
    /// Saved plans
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("STUDYPLAN_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let data = cli.data;
    let result = match cli.command {
        Commands::Plan(args) => commands::plan::run(args, data),
        Commands::Score { json } => commands::score::run(json, data),
        Commands::Readiness { json } => commands::readiness::run(json, data),
        Commands::Mastery { update, refresh } => commands::mastery::run(update, refresh, data),
        Commands::Remediate { apply } => commands::remediate::run(apply, data),
        Commands::History { action } => commands::history::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
