use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "healthquest-cli", version, about = "HealthQuest CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Daily health metrics
    Metrics {
        #[command(subcommand)]
        action: commands::metrics::MetricsAction,
    },
    /// Show the points breakdown for today's (or given) metrics
    Score(commands::score::ScoreArgs),
    /// Points and token rewards
    Rewards {
        #[command(subcommand)]
        action: commands::rewards::RewardsAction,
    },
    /// On-chain account registration and status
    Ledger {
        #[command(subcommand)]
        action: commands::ledger::LedgerAction,
    },
    /// Goal management
    Goal {
        #[command(subcommand)]
        action: commands::goal::GoalAction,
    },
    /// Health insights for today's metrics
    Insights(commands::insights::InsightsArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Body metrics calculators
    Profile {
        #[command(subcommand)]
        action: commands::profile::ProfileAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Metrics { action } => commands::metrics::run(action),
        Commands::Score(args) => commands::score::run(args),
        Commands::Rewards { action } => commands::rewards::run(action),
        Commands::Ledger { action } => commands::ledger::run(action),
        Commands::Goal { action } => commands::goal::run(action),
        Commands::Insights(args) => commands::insights::run(args),
        Commands::Config { action } => commands::config::run(action),
        Commands::Profile { action } => commands::profile::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
