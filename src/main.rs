use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use iptv_epg::{
    config::Config,
    database::{
        Database,
        repositories::{EpgProgrammeSeaOrmRepository, PlaylistSeaOrmRepository},
    },
    scheduler::EpgRefreshScheduler,
    services::EpgRefreshService,
};

#[derive(Parser)]
#[command(name = "iptv-epg")]
#[command(about = "IPTV playlist ingestion and EPG scheduling service")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Database URL (overrides config file)
    #[arg(short = 'd', long, value_name = "URL")]
    database_url: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("iptv_epg={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting iptv-epg v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);
    if let Some(database_url) = cli.database_url {
        config.database.url = database_url;
    }

    // Validate durations up front so a typo fails at startup, not mid-cycle.
    let refresh_interval = config.ingestion.refresh_interval()?;
    let startup_delay = config.ingestion.startup_delay()?;
    let download_timeout = config.ingestion.download_timeout()?;

    let database = Database::new(&config.database).await?;
    database.migrate().await?;
    info!("Database connection established and migrations applied");

    let mut programme_repo = EpgProgrammeSeaOrmRepository::new(database.connection().clone());
    if let Some(batch) = config
        .database
        .batch_sizes
        .as_ref()
        .and_then(|b| b.epg_programmes)
    {
        programme_repo = programme_repo.with_insert_batch(batch);
    }

    let scheduler = EpgRefreshScheduler::new(
        PlaylistSeaOrmRepository::new(database.connection().clone()),
        EpgRefreshService::new(programme_repo, download_timeout),
        refresh_interval,
        startup_delay,
    );
    let scheduler_handle = tokio::spawn(scheduler.run());

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, stopping");
    scheduler_handle.abort();

    Ok(())
}
