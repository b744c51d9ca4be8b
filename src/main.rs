use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use sqlx::migrate::Migrator;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use secureflow_core::adapters::PostgresTransactionStore;
use secureflow_core::cli::{Cli, Commands, DbCommands};
use secureflow_core::config::Config;
use secureflow_core::ledger::AuditLedgerClient;
use secureflow_core::scoring::FraudScoringClient;
use secureflow_core::services::TransactionPipeline;
use secureflow_core::{AppState, create_app, db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Db(DbCommands::Migrate) => migrate(config).await,
        Commands::Config => {
            tracing::info!(
                server_port = config.server_port,
                scoring_service_url = %config.scoring_service_url,
                ledger_service_url = %config.ledger_service_url,
                "configuration is valid"
            );
            Ok(())
        }
    }
}

async fn migrate(config: Config) -> anyhow::Result<()> {
    let pool = db::create_pool(&config).await?;
    let migrator = Migrator::new(Path::new("./migrations")).await?;
    migrator.run(&pool).await?;
    tracing::info!("Database migrations completed");
    Ok(())
}

async fn serve(config: Config) -> anyhow::Result<()> {
    // Database pool
    let pool = db::create_pool(&config).await?;

    // Run migrations
    let migrator = Migrator::new(Path::new("./migrations")).await?;
    migrator.run(&pool).await?;
    tracing::info!("Database migrations completed");

    // External service clients
    let scoring_client = FraudScoringClient::new(
        config.scoring_service_url.clone(),
        Duration::from_secs(config.scoring_timeout_secs),
    );
    tracing::info!(
        "Scoring client initialized with URL: {}",
        config.scoring_service_url
    );

    let ledger_client = AuditLedgerClient::new(
        config.ledger_service_url.clone(),
        Duration::from_secs(config.ledger_timeout_secs),
    );
    tracing::info!(
        "Ledger client initialized with URL: {}",
        config.ledger_service_url
    );

    let store = Arc::new(PostgresTransactionStore::new(pool.clone()));
    let pipeline = Arc::new(TransactionPipeline::new(
        store.clone(),
        Arc::new(scoring_client),
        Arc::new(ledger_client),
    ));

    let app_state = AppState {
        db: pool,
        store,
        pipeline,
    };
    let app = create_app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
