use std::sync::{Arc, RwLock};

use acquisitiond_core::{
    DownloadJob, DownloadJobRepository, Result, ScanRecord, ScanRecordRepository, WatchUser,
    WatchUserRepository,
};
use acquisitiond_downloaders::{DownloaderClient, DownloaderConfig};
use async_trait::async_trait;
use axum_test::TestServer;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::routes::create_router;
use crate::state::{AppState, StatusSnapshot};

#[derive(Default)]
struct EmptyWatchUserRepository;

#[async_trait]
impl WatchUserRepository for EmptyWatchUserRepository {
    async fn list_active(&self) -> Result<Vec<WatchUser>> {
        Ok(Vec::new())
    }
    async fn get(&self, _id: Uuid) -> Result<Option<WatchUser>> {
        Ok(None)
    }
    async fn create(&self, user: &WatchUser) -> Result<WatchUser> {
        Ok(user.clone())
    }
    async fn update(&self, user: &WatchUser) -> Result<WatchUser> {
        Ok(user.clone())
    }
    async fn delete(&self, _id: Uuid) -> Result<()> {
        Ok(())
    }
}

#[derive(Default)]
struct EmptyDownloadJobRepository;

#[async_trait]
impl DownloadJobRepository for EmptyDownloadJobRepository {
    async fn get(&self, _torrent_hash: &str) -> Result<Option<DownloadJob>> {
        Ok(None)
    }
    async fn get_by_guid(&self, _guid: &str) -> Result<Vec<DownloadJob>> {
        Ok(Vec::new())
    }
    async fn get_by_release_guid(&self, _release_guid: &str) -> Result<Vec<DownloadJob>> {
        Ok(Vec::new())
    }
    async fn is_guid_in_flight(&self, _guid: &str) -> Result<bool> {
        Ok(false)
    }
    async fn create(&self, job: &DownloadJob) -> Result<DownloadJob> {
        Ok(job.clone())
    }
    async fn update(&self, job: &DownloadJob) -> Result<DownloadJob> {
        Ok(job.clone())
    }
    async fn delete(&self, _job_id: Uuid) -> Result<()> {
        Ok(())
    }
    async fn list_all(&self) -> Result<Vec<DownloadJob>> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
struct EmptyScanRecordRepository;

#[async_trait]
impl ScanRecordRepository for EmptyScanRecordRepository {
    async fn has_infected(&self, _release_guid: &str) -> Result<bool> {
        Ok(false)
    }
    async fn create(&self, record: &ScanRecord) -> Result<ScanRecord> {
        Ok(record.clone())
    }
    async fn update(&self, record: &ScanRecord) -> Result<ScanRecord> {
        Ok(record.clone())
    }
    async fn get(&self, _scan_id: Uuid) -> Result<Option<ScanRecord>> {
        Ok(None)
    }
}

async fn idle_downloader() -> (MockServer, Arc<DownloaderClient>) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Ok."))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/torrents/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;
    let client = DownloaderClient::new(DownloaderConfig { base_url: server.uri(), ..Default::default() }).unwrap();
    (server, Arc::new(client))
}

#[tokio::test]
async fn health_is_reachable_without_an_api_key() {
    let (_server, downloader) = idle_downloader().await;
    let state = test_state(downloader);
    let app = create_router(state);
    let server = TestServer::new(app).unwrap();

    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_json(&serde_json::json!({ "status": "healthy" }));
}

#[tokio::test]
async fn protected_route_without_api_key_is_rejected() {
    let (_server, downloader) = idle_downloader().await;
    let state = test_state(downloader);
    let app = create_router(state);
    let server = TestServer::new(app).unwrap();

    let response = server.get("/downloader/torrents").await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn protected_route_with_correct_api_key_succeeds() {
    let (_server, downloader) = idle_downloader().await;
    let state = test_state(downloader);
    let app = create_router(state);
    let server = TestServer::new(app).unwrap();

    let response = server.get("/downloader/torrents").add_header("X-Api-Key", "test-secret").await;
    response.assert_status_ok();
}

fn test_state(downloader: Arc<DownloaderClient>) -> AppState {
    let orchestrator = Arc::new(acquisitiond_orchestrator::Orchestrator {
        watch_users: Arc::new(EmptyWatchUserRepository),
        download_jobs: Arc::new(EmptyDownloadJobRepository),
        scan_records: Arc::new(EmptyScanRecordRepository),
        catalog: Arc::new(
            acquisitiond_catalog::CatalogClient::new(acquisitiond_catalog::CatalogConfig::default()).unwrap(),
        ),
        indexers: Arc::new(
            acquisitiond_indexers::IndexerClient::new(acquisitiond_indexers::IndexerConfig::default()).unwrap(),
        ),
        downloader: downloader.clone(),
        scanner: Arc::new(acquisitiond_scanner::ScannerClient::new(acquisitiond_scanner::ScannerConfig::default()).unwrap()),
        metadata: Arc::new(acquisitiond_metadata::MetadataClient::new(acquisitiond_metadata::MetadataConfig::default())),
        filesystem: Arc::new(acquisitiond_filesystem::FilesystemService::new(acquisitiond_filesystem::FilesystemConfig {
            quarantine_root: std::env::temp_dir().join("acquisitiond-test-quarantine"),
            movie_root: std::env::temp_dir().join("acquisitiond-test-movies"),
            show_root: std::env::temp_dir().join("acquisitiond-test-shows"),
        })),
        matching: acquisitiond_orchestrator::MatchingConfig::default(),
    });

    let scheduler = Arc::new(acquisitiond_orchestrator::Scheduler::new(
        acquisitiond_orchestrator::SchedulerConfig::default(),
        orchestrator.clone(),
    ));

    AppState {
        orchestrator,
        scheduler,
        downloader,
        api_key: "test-secret".to_string(),
        status: Arc::new(RwLock::new(StatusSnapshot::default())),
    }
}
