//! Repository traits (§4.9). Each exposes only the operations the orchestrator/reconciler
//! need; no raw query language is exposed upward. Concrete implementations live in
//! `acquisitiond-infrastructure`; in-memory stand-ins for tests live next to their consumers.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{DownloadJob, ScanRecord, WatchUser};

#[async_trait]
pub trait WatchUserRepository: Send + Sync {
    async fn list_active(&self) -> Result<Vec<WatchUser>>;
    async fn get(&self, id: Uuid) -> Result<Option<WatchUser>>;
    async fn create(&self, user: &WatchUser) -> Result<WatchUser>;
    async fn update(&self, user: &WatchUser) -> Result<WatchUser>;
    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait DownloadJobRepository: Send + Sync {
    async fn get(&self, torrent_hash: &str) -> Result<Option<DownloadJob>>;
    async fn get_by_guid(&self, guid: &str) -> Result<Vec<DownloadJob>>;
    async fn get_by_release_guid(&self, release_guid: &str) -> Result<Vec<DownloadJob>>;
    async fn is_guid_in_flight(&self, guid: &str) -> Result<bool>;
    async fn create(&self, job: &DownloadJob) -> Result<DownloadJob>;
    async fn update(&self, job: &DownloadJob) -> Result<DownloadJob>;
    async fn delete(&self, job_id: Uuid) -> Result<()>;
    async fn list_all(&self) -> Result<Vec<DownloadJob>>;
}

#[async_trait]
pub trait ScanRecordRepository: Send + Sync {
    async fn has_infected(&self, release_guid: &str) -> Result<bool>;
    async fn create(&self, record: &ScanRecord) -> Result<ScanRecord>;
    async fn update(&self, record: &ScanRecord) -> Result<ScanRecord>;
    async fn get(&self, scan_id: Uuid) -> Result<Option<ScanRecord>>;
}
