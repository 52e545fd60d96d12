//! In-memory repository stand-ins for orchestrator unit tests, in the same
//! `Arc<RwLock<HashMap<..>>>`-backed style as this workspace's other mock repositories.

use std::collections::HashMap;
use std::sync::RwLock;

use acquisitiond_core::{
    DownloadJob, DownloadJobRepository, Result, ScanRecord, ScanRecordRepository, WatchUser,
    WatchUserRepository,
};
use async_trait::async_trait;
use uuid::Uuid;

#[derive(Default)]
pub struct MockWatchUserRepository {
    users: RwLock<HashMap<Uuid, WatchUser>>,
}

impl MockWatchUserRepository {
    pub fn seeded(users: Vec<WatchUser>) -> Self {
        let map = users.into_iter().map(|u| (u.id, u)).collect();
        Self { users: RwLock::new(map) }
    }
}

#[async_trait]
impl WatchUserRepository for MockWatchUserRepository {
    async fn list_active(&self) -> Result<Vec<WatchUser>> {
        Ok(self.users.read().unwrap().values().filter(|u| u.active).cloned().collect())
    }

    async fn get(&self, id: Uuid) -> Result<Option<WatchUser>> {
        Ok(self.users.read().unwrap().get(&id).cloned())
    }

    async fn create(&self, user: &WatchUser) -> Result<WatchUser> {
        self.users.write().unwrap().insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn update(&self, user: &WatchUser) -> Result<WatchUser> {
        self.users.write().unwrap().insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.users.write().unwrap().remove(&id);
        Ok(())
    }
}

#[derive(Default)]
pub struct MockDownloadJobRepository {
    jobs: RwLock<HashMap<Uuid, DownloadJob>>,
}

impl MockDownloadJobRepository {
    pub fn seeded(jobs: Vec<DownloadJob>) -> Self {
        let map = jobs.into_iter().map(|j| (j.job_id, j)).collect();
        Self { jobs: RwLock::new(map) }
    }
}

#[async_trait]
impl DownloadJobRepository for MockDownloadJobRepository {
    async fn get(&self, torrent_hash: &str) -> Result<Option<DownloadJob>> {
        Ok(self.jobs.read().unwrap().values().find(|j| j.torrent_hash == torrent_hash).cloned())
    }

    async fn get_by_guid(&self, guid: &str) -> Result<Vec<DownloadJob>> {
        Ok(self.jobs.read().unwrap().values().filter(|j| j.guid == guid).cloned().collect())
    }

    async fn get_by_release_guid(&self, release_guid: &str) -> Result<Vec<DownloadJob>> {
        Ok(self
            .jobs
            .read()
            .unwrap()
            .values()
            .filter(|j| j.release_guid == release_guid)
            .cloned()
            .collect())
    }

    async fn is_guid_in_flight(&self, guid: &str) -> Result<bool> {
        Ok(self.jobs.read().unwrap().values().any(|j| j.guid == guid))
    }

    async fn create(&self, job: &DownloadJob) -> Result<DownloadJob> {
        self.jobs.write().unwrap().insert(job.job_id, job.clone());
        Ok(job.clone())
    }

    async fn update(&self, job: &DownloadJob) -> Result<DownloadJob> {
        self.jobs.write().unwrap().insert(job.job_id, job.clone());
        Ok(job.clone())
    }

    async fn delete(&self, job_id: Uuid) -> Result<()> {
        self.jobs.write().unwrap().remove(&job_id);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<DownloadJob>> {
        Ok(self.jobs.read().unwrap().values().cloned().collect())
    }
}

#[derive(Default)]
pub struct MockScanRecordRepository {
    records: RwLock<HashMap<Uuid, ScanRecord>>,
}

impl MockScanRecordRepository {
    pub fn seeded(records: Vec<ScanRecord>) -> Self {
        let map = records.into_iter().map(|r| (r.scan_id, r)).collect();
        Self { records: RwLock::new(map) }
    }
}

#[async_trait]
impl ScanRecordRepository for MockScanRecordRepository {
    async fn has_infected(&self, release_guid: &str) -> Result<bool> {
        Ok(self
            .records
            .read()
            .unwrap()
            .values()
            .any(|r| r.release_guid == release_guid && r.infected))
    }

    async fn create(&self, record: &ScanRecord) -> Result<ScanRecord> {
        self.records.write().unwrap().insert(record.scan_id, record.clone());
        Ok(record.clone())
    }

    async fn update(&self, record: &ScanRecord) -> Result<ScanRecord> {
        self.records.write().unwrap().insert(record.scan_id, record.clone());
        Ok(record.clone())
    }

    async fn get(&self, scan_id: Uuid) -> Result<Option<ScanRecord>> {
        Ok(self.records.read().unwrap().get(&scan_id).cloned())
    }
}
