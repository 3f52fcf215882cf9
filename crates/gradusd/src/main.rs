use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use gradus_api::{AppState, TokenBucketLimiter, build_router};
use gradus_config::{config_path, db_path, ensure_config};
use gradus_service::ThesisService;
use gradus_store::SqliteStore;
use gradusd::cli::{Cli, Commands, LogFormat, ServeArgs};
use gradusd::seed;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(log_format(&cli.command));

    match cli.command {
        Commands::Serve(args) => serve(&cli.data_dir, args).await,
        Commands::Init => init(&cli.data_dir),
        Commands::Seed => seed::run(&cli.data_dir),
    }
}

fn log_format(command: &Commands) -> LogFormat {
    match command {
        Commands::Serve(args) => args.log_format,
        Commands::Init | Commands::Seed => LogFormat::default(),
    }
}

fn init_tracing(format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Human => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .init(),
    }
}

async fn serve(data_root: &Path, args: ServeArgs) -> Result<()> {
    let mut config =
        ensure_config(data_root).context("failed to prepare the data directory")?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let store = SqliteStore::open(data_root).context("failed to open the store")?;
    let service = ThesisService::new(store, config.alerts);
    let limiter = Arc::new(TokenBucketLimiter::new(config.rate_limit));
    let app = build_router(AppState::new(service, limiter));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}

fn init(data_root: &Path) -> Result<()> {
    ensure_config(data_root).context("failed to write the default config")?;
    SqliteStore::open(data_root).context("failed to create the database")?;

    tracing::info!(
        config = %config_path(data_root).display(),
        database = %db_path(data_root).display(),
        "data directory ready"
    );
    Ok(())
}
