//! Prunes stale `DownloadJob`s against the downloader's live torrent list (§4.11). Runs at the
//! head of every Orchestrator tick, and is also exposed standalone via `/orchestrator/reconcile`.

use std::collections::HashMap;

use acquisitiond_core::{DownloadJobRepository, Result};
use acquisitiond_downloaders::DownloaderClient;
use serde::Serialize;
use tracing::debug;

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileSummary {
    pub removed: usize,
    pub updated: usize,
    pub total_checked: usize,
}

/// Step 1-4 of §4.11: delete jobs whose hash the downloader no longer reports; refresh the
/// downloader-authoritative fields (currently just `file_name`) on the rest.
pub async fn reconcile(
    jobs: &dyn DownloadJobRepository,
    downloader: &DownloaderClient,
) -> Result<ReconcileSummary> {
    let tracked = jobs.list_all().await?;
    let active = downloader.list_active().await?;
    let by_hash: HashMap<&str, &acquisitiond_downloaders::TorrentStatus> =
        active.iter().map(|t| (t.hash.as_str(), t)).collect();

    let mut summary = ReconcileSummary { total_checked: tracked.len(), ..Default::default() };

    for mut job in tracked {
        match by_hash.get(job.torrent_hash.as_str()) {
            None => {
                jobs.delete(job.job_id).await?;
                summary.removed += 1;
                debug!(hash = %job.torrent_hash, "torrent no longer present, removed job");
            }
            Some(status) => {
                if job.file_name != status.name {
                    job.refresh_from_downloader(status.name.clone());
                    jobs.update(&job).await?;
                    summary.updated += 1;
                }
            }
        }
    }

    Ok(summary)
}
