//! Unified application entry point: loads configuration, runs migrations, wires every
//! collaborator client and repository into the Orchestrator, starts the tick Scheduler, and
//! serves the internal HTTP facade (§6, §10.3).

use std::sync::{Arc, RwLock};
use std::time::Duration;

use acquisitiond_api::{create_router, AppState, StatusSnapshot};
use acquisitiond_catalog::{CatalogClient, CatalogConfig};
use acquisitiond_core::{PipelineError, Result};
use acquisitiond_downloaders::{DownloaderClient, DownloaderConfig};
use acquisitiond_filesystem::{FilesystemConfig, FilesystemService};
use acquisitiond_indexers::{IndexerClient, IndexerConfig};
use acquisitiond_infrastructure::{
    create_pool, run_migrations, DatabaseConfig, PostgresDownloadJobRepository,
    PostgresScanRecordRepository, PostgresWatchUserRepository,
};
use acquisitiond_metadata::{MetadataClient, MetadataConfig};
use acquisitiond_orchestrator::{MatchingConfig, Orchestrator, Scheduler, SchedulerConfig};
use acquisitiond_scanner::{ScannerClient, ScannerConfig};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;

use config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;
    init_logging(&config.logging);
    config.validate()?;
    info!("starting acquisitiond");

    let pool = create_pool(&DatabaseConfig {
        database_url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..DatabaseConfig::default()
    })
    .await?;
    run_migrations(&pool).await?;
    info!("database migrations complete");

    let orchestrator = Arc::new(build_orchestrator(&config, pool)?);
    info!("collaborators wired");

    let mut scheduler = Scheduler::new(
        SchedulerConfig { tick_interval: config.tick_interval() },
        orchestrator.clone(),
    );
    scheduler.start();
    let scheduler = Arc::new(scheduler);
    info!(interval_secs = config.tick_interval_secs, "scheduler started");

    let downloader = orchestrator.downloader.clone();
    let app_state = AppState {
        orchestrator,
        scheduler,
        downloader,
        api_key: config.server.api_key.clone(),
        status: Arc::new(RwLock::new(StatusSnapshot::default())),
    };

    let app = create_router(app_state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| PipelineError::Configuration {
        field: "server.host/port".to_string(),
        message: format!("failed to bind {addr}: {e}"),
    })?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| PipelineError::Transport { service: "http_server".to_string(), message: e.to_string() })?;

    info!("acquisitiond shutting down");
    Ok(())
}

fn init_logging(config: &config::LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_new(&config.level)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if config.json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn build_orchestrator(
    config: &AppConfig,
    pool: acquisitiond_infrastructure::DatabasePool,
) -> Result<Orchestrator> {
    let catalog = CatalogClient::new(CatalogConfig {
        base_url: config.catalog.base_url.clone(),
        timeout: Duration::from_secs(config.catalog.timeout_secs),
    })?;

    let indexers = IndexerClient::new(IndexerConfig {
        base_url: config.indexer.base_url.clone(),
        api_key: config.indexer.api_key.clone(),
        timeout: Duration::from_secs(config.indexer.timeout_secs),
        max_requests_per_minute: config.indexer.max_requests_per_minute,
    })?;

    let downloader = DownloaderClient::new(DownloaderConfig {
        base_url: config.downloader.base_url.clone(),
        username: config.downloader.username.clone(),
        password: config.downloader.password.clone(),
        timeout: Duration::from_secs(config.downloader.timeout_secs),
    })?;

    let scanner = ScannerClient::new(ScannerConfig {
        base_url: config.scanner.base_url.clone(),
        timeout: Duration::from_secs(config.scanner.timeout_secs),
    })?;

    let metadata = MetadataClient::new(MetadataConfig {
        base_url: config.metadata.base_url.clone(),
        api_key: config.metadata.api_key.clone(),
    });

    let filesystem = FilesystemService::new(FilesystemConfig {
        quarantine_root: config.filesystem.quarantine_root.clone(),
        movie_root: config.filesystem.movie_root.clone(),
        show_root: config.filesystem.show_root.clone(),
    });

    if !config.filesystem.quarantine_root.exists() {
        warn!(path = ?config.filesystem.quarantine_root, "quarantine root does not exist yet");
    }

    Ok(Orchestrator {
        watch_users: Arc::new(PostgresWatchUserRepository::new(pool.clone())),
        download_jobs: Arc::new(PostgresDownloadJobRepository::new(pool.clone())),
        scan_records: Arc::new(PostgresScanRecordRepository::new(pool)),
        catalog: Arc::new(catalog),
        indexers: Arc::new(indexers),
        downloader: Arc::new(downloader),
        scanner: Arc::new(scanner),
        metadata: Arc::new(metadata),
        filesystem: Arc::new(filesystem),
        matching: MatchingConfig {
            similarity_threshold: config.matching.similarity_threshold,
            appearance_window_secs: config.matching.appearance_window_secs,
            ..MatchingConfig::default()
        },
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
