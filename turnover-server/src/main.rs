//! # Turnover Server
//!
//! Administrative surface of the turnover engine.
//!
//! ## Overview
//!
//! - **Booking sync**: reconciles booking-feed tuples into cleanings
//! - **Cascades**: cancel, move and force-delete across cleanings, the
//!   exclusion ledger and linen orders
//! - **Audits**: consistency reports and targeted backfills, over HTTP or as
//!   one-shot CLI commands
//! - **Assignment**: operator assignment and ranked suggestions
//!
//! ## Architecture
//!
//! The server is built on Axum and uses PostgreSQL for persistent storage.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand};
use sqlx::PgPool;
use tracing::{info, warn};
use turnover_core::{
    MIGRATOR, TurnoverUnitOfWork,
    domain::{
        audit::{AuditOptions, ConsistencyAuditor},
        notifications::TracingNotifier,
    },
};
use turnover_model::PropertyId;

use turnover_server::{
    infra::{
        app_state::AppState,
        config::{Config, ConfigLoad, ConfigLoader},
        telemetry::init_tracing,
    },
    routes::create_app,
};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "turnover-server")]
#[command(about = "Cleaning and linen turnover engine for short-term rentals")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true, env = "TURNOVER_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Dotenv file to load instead of `./.env`
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve(ServeArgs),
    #[command(subcommand)]
    Db(DbCommand),
    /// Run a consistency audit and print the JSON report
    Reconcile(ReconcileArgs),
    /// Backfill missing orders and prices for recent cleanings
    Backfill(BackfillArgs),
}

#[derive(ClapArgs, Debug, Clone, Default)]
struct ServeArgs {
    /// Server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[derive(ClapArgs, Debug, Clone)]
struct ReconcileArgs {
    /// Report without repairing
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Restrict to one property
    #[arg(long)]
    property: Option<PropertyId>,

    /// First scheduled date to include (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last scheduled date to include (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,
}

#[derive(ClapArgs, Debug, Clone)]
struct BackfillArgs {
    /// How many days back from today to repair
    #[arg(long)]
    days_back: u32,

    /// Report without repairing
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = load_runtime_config(cli.config, cli.env_file)?;

    match cli.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => run_server(config, args).await,
        Command::Db(DbCommand::Migrate) => run_db_migrate(&config).await,
        Command::Reconcile(args) => run_reconcile(&config, args).await,
        Command::Backfill(args) => run_backfill(&config, args).await,
    }
}

fn load_runtime_config(
    config_path: Option<PathBuf>,
    env_file: Option<PathBuf>,
) -> anyhow::Result<Config> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = config_path {
        loader = loader.with_config_path(path);
    }
    if let Some(path) = env_file {
        loader = loader.with_env_file(path);
    }
    let ConfigLoad { config, warnings } = loader.load().context("failed to load configuration")?;

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "configuration file loaded");
    }
    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => {
                warn!(message = %warning.message, hint = %hint, "configuration warning")
            }
            None => warn!(message = %warning.message, "configuration warning"),
        }
    }

    Ok(config)
}

async fn connect_database(config: &Config) -> anyhow::Result<PgPool> {
    let url = config
        .database
        .url
        .as_deref()
        .context("DATABASE_URL (or [database].url) must be provided")?;
    turnover_core::database::connect(url, config.database.max_connections)
        .await
        .context("failed to connect to PostgreSQL")
}

async fn migrated_unit_of_work(config: &Config) -> anyhow::Result<Arc<TurnoverUnitOfWork>> {
    let pool = connect_database(config).await?;
    MIGRATOR
        .run(&pool)
        .await
        .context("database migration failed")?;
    let unit_of_work = TurnoverUnitOfWork::from_postgres(pool).map_err(anyhow::Error::msg)?;
    Ok(Arc::new(unit_of_work))
}

async fn run_db_migrate(config: &Config) -> anyhow::Result<()> {
    let pool = connect_database(config).await?;
    MIGRATOR
        .run(&pool)
        .await
        .context("database migration failed")?;
    info!("Database migrations applied successfully");
    Ok(())
}

async fn run_reconcile(config: &Config, args: ReconcileArgs) -> anyhow::Result<()> {
    let unit_of_work = migrated_unit_of_work(config).await?;
    let auditor = ConsistencyAuditor::new(unit_of_work, config.turnover_settings());
    let report = auditor
        .audit(AuditOptions {
            dry_run: args.dry_run,
            property_id: args.property,
            from: args.from,
            to: args.to,
        })
        .await
        .context("consistency audit failed")?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn run_backfill(config: &Config, args: BackfillArgs) -> anyhow::Result<()> {
    let unit_of_work = migrated_unit_of_work(config).await?;
    let auditor = ConsistencyAuditor::new(unit_of_work, config.turnover_settings());
    let report = auditor
        .backfill(args.days_back, args.dry_run)
        .await
        .context("backfill failed")?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn run_server(mut config: Config, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }

    let unit_of_work = migrated_unit_of_work(&config).await?;
    info!("Database schema initialized successfully");

    let config = Arc::new(config);
    let state = AppState::new(unit_of_work, config.clone(), Arc::new(TracingNotifier));
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port))
        .await
        .with_context(|| {
            format!(
                "failed to bind {}:{}",
                config.server.host, config.server.port
            )
        })?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        "turnover server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("turnover server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
