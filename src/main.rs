use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use configuration::Config;
use core_types::Profile;
use database::{DbRepository, MemoryRepository, StatsStore};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

/// The main entry point for the Dugout stat tracker.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = configuration::load_config(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    // Keeps the file writer flushing until the process exits.
    let _guard = configuration::init_tracing(&config.logging)?;

    match cli.command {
        Commands::Serve(args) => handle_serve(args, &config).await,
        Commands::Migrate => handle_migrate(&config).await,
        Commands::Summary(args) => handle_summary(args, &config).await,
        Commands::Report(args) => handle_report(args, &config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Track batting and pitching stats and serve them over HTTP.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Missing files fall back to defaults.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Apply pending database migrations and exit.
    Migrate,
    /// Print a player's totals and rate stats.
    Summary(PlayerArgs),
    /// Print a player's full text report.
    Report(PlayerArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Keep all data in memory instead of PostgreSQL. Nothing survives a restart.
    #[arg(long)]
    in_memory: bool,
}

#[derive(Args)]
struct PlayerArgs {
    /// The player's user id.
    #[arg(long)]
    user: Uuid,

    /// Limit the stats to a single date (format: YYYY-MM-DD).
    #[arg(long)]
    date: Option<NaiveDate>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn postgres_store(config: &Config) -> anyhow::Result<DbRepository> {
    let pool = database::connect(&config.database).await?;
    database::run_migrations(&pool).await?;
    Ok(DbRepository::new(pool))
}

async fn handle_serve(args: ServeArgs, config: &Config) -> anyhow::Result<()> {
    let store: Arc<dyn StatsStore> = if args.in_memory {
        tracing::warn!("Serving from an in-memory store; data is lost on shutdown.");
        Arc::new(MemoryRepository::new())
    } else {
        Arc::new(postgres_store(config).await?)
    };
    web_server::run_server(config, store).await
}

async fn handle_migrate(config: &Config) -> anyhow::Result<()> {
    let pool = database::connect(&config.database).await?;
    database::run_migrations(&pool).await?;
    tracing::info!("Database migrations applied.");
    Ok(())
}

async fn handle_summary(args: PlayerArgs, config: &Config) -> anyhow::Result<()> {
    let store = postgres_store(config).await?;
    let summary = load_summary(&store, &args).await?;

    println!("{}", reporter::summary_table(&summary));
    Ok(())
}

async fn handle_report(args: PlayerArgs, config: &Config) -> anyhow::Result<()> {
    let store = postgres_store(config).await?;
    let profile = store
        .get_profile(args.user)
        .await?
        .unwrap_or_else(|| Profile::new(args.user, Profile::DEFAULT_NAME));
    let summary = load_summary(&store, &args).await?;

    print!("{}", reporter::render_report(&profile, &summary, Utc::now()));
    Ok(())
}

async fn load_summary(
    store: &dyn StatsStore,
    args: &PlayerArgs,
) -> anyhow::Result<analytics::StatSummary> {
    let batting = store.batting_for(args.user, args.date).await?;
    let pitching = store.pitching_for(args.user, args.date).await?;
    Ok(analytics::StatsCalculator::new().summarize(&batting, &pitching, args.date))
}
