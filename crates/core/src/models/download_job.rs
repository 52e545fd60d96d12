use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::MediaKind;

/// The durable record that an entry is being acquired (§3). Created once the downloader has
/// accepted a torrent; deleted by the reconciler once the downloader no longer reports it, or
/// by the orchestrator when the payload is found infected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadJob {
    pub job_id: Uuid,
    /// The downloader's identifier for this torrent; unique across all non-terminal rows.
    pub torrent_hash: String,
    /// Catalog-stable identifier of the watchlist entry this job satisfies.
    pub guid: String,
    /// Indexer-issued identifier for the release that was enqueued.
    pub release_guid: String,
    /// Catalog-local handle needed to modify the watchlist entry, carried for re-queue.
    pub rating_key: String,
    /// Access token of the user whose watchlist add triggered this job, carried for re-queue.
    pub access_token: String,
    pub title: String,
    pub year: Option<i32>,
    pub kind: MediaKind,
    /// Most recent name reported by the downloader; refreshed on every reconciliation tick.
    pub file_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DownloadJob {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        torrent_hash: impl Into<String>,
        guid: impl Into<String>,
        release_guid: impl Into<String>,
        rating_key: impl Into<String>,
        access_token: impl Into<String>,
        title: impl Into<String>,
        year: Option<i32>,
        kind: MediaKind,
        file_name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            job_id: Uuid::new_v4(),
            torrent_hash: torrent_hash.into(),
            guid: guid.into(),
            release_guid: release_guid.into(),
            rating_key: rating_key.into(),
            access_token: access_token.into(),
            title: title.into(),
            year,
            kind,
            file_name: file_name.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// True when the job still carries the pair needed to re-queue the entry on infection (§4.10).
    pub fn can_requeue(&self) -> bool {
        !self.rating_key.is_empty() && !self.access_token.is_empty()
    }

    /// Refresh the downloader-authoritative fields (currently just `file_name`) from a
    /// reconciliation snapshot.
    pub fn refresh_from_downloader(&mut self, file_name: impl Into<String>) {
        self.file_name = file_name.into();
        self.updated_at = Utc::now();
    }
}
