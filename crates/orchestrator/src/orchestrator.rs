//! The per-tick pipeline controller (§4.10): reconciles stale jobs, walks the union watchlist,
//! and descends each entry's candidate list until one sticks or all are exhausted.

use std::sync::Arc;
use std::time::Duration;

use acquisitiond_catalog::CatalogClient;
use acquisitiond_core::{
    mask_secret, select_candidates, similarity, DownloadJob, DownloadJobRepository,
    PipelineError, Result, ScanRecord, ScanRecordRepository, WatchUserRepository,
    DEFAULT_APPEARANCE_WINDOW_SECS, DEFAULT_SIMILARITY_THRESHOLD,
};
use acquisitiond_downloaders::DownloaderClient;
use acquisitiond_filesystem::FilesystemService;
use acquisitiond_indexers::IndexerClient;
use acquisitiond_metadata::MetadataClient;
use acquisitiond_scanner::ScannerClient;
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::reconciler::{reconcile, ReconcileSummary};

/// Summary returned by one `/orchestrator/run` tick (§6).
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct TickSummary {
    pub processed: usize,
    pub searched: usize,
    pub added_to_downloader: usize,
    pub errors: Vec<String>,
}

/// Tunable overrides for the similarity matching rule (§4.10, §6's `similarity_threshold` /
/// `appearance_window_secs` options).
#[derive(Debug, Clone)]
pub struct MatchingConfig {
    pub similarity_threshold: f64,
    pub appearance_window_secs: i64,
    pub appearance_check_delay: Duration,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            appearance_window_secs: DEFAULT_APPEARANCE_WINDOW_SECS,
            appearance_check_delay: Duration::from_secs(2),
        }
    }
}

/// Wires every collaborator client and repository the tick needs. Holds no mutable state of its
/// own; all durable state lives behind the repositories (§5).
pub struct Orchestrator {
    pub watch_users: Arc<dyn WatchUserRepository>,
    pub download_jobs: Arc<dyn DownloadJobRepository>,
    pub scan_records: Arc<dyn ScanRecordRepository>,
    pub catalog: Arc<CatalogClient>,
    pub indexers: Arc<IndexerClient>,
    pub downloader: Arc<DownloaderClient>,
    pub scanner: Arc<ScannerClient>,
    pub metadata: Arc<MetadataClient>,
    pub filesystem: Arc<FilesystemService>,
    pub matching: MatchingConfig,
}

impl Orchestrator {
    /// Runs one tick: reconcile, then process every distinct watchlist entry across active
    /// users (§4.10 steps 1-3).
    pub async fn run_tick(&self) -> Result<TickSummary> {
        let reconciled = reconcile(self.download_jobs.as_ref(), self.downloader.as_ref()).await?;
        info!(
            removed = reconciled.removed,
            updated = reconciled.updated,
            total = reconciled.total_checked,
            "reconciliation complete before new work"
        );

        let entries = self.collect_union_watchlist().await?;
        let mut summary = TickSummary::default();

        for (entry, token) in entries {
            summary.processed += 1;
            match self.process_entry(&entry, &token).await {
                Ok(outcome) => {
                    if outcome.searched {
                        summary.searched += 1;
                    }
                    if outcome.queued {
                        summary.added_to_downloader += 1;
                    }
                }
                Err(err) => {
                    warn!(guid = %entry.guid, error = %err, "failed to process watchlist entry");
                    summary.errors.push(format!("{}: {err}", entry.guid));
                }
            }
        }

        Ok(summary)
    }

    /// Step 2: union of every active user's watchlist, deduplicated by `guid`, keeping the
    /// first-encountered `(rating_key, token)` pair per entry.
    async fn collect_union_watchlist(
        &self,
    ) -> Result<Vec<(acquisitiond_core::WatchlistEntry, UserHandle)>> {
        let users = self.watch_users.list_active().await?;
        let mut seen = std::collections::HashSet::new();
        let mut entries = Vec::new();

        for user in users {
            let masked = mask_secret(&user.access_token);
            let watchlist = match self.catalog.fetch_watchlist(&user.access_token).await {
                Ok(list) => list,
                Err(err) => {
                    warn!(user = user.user_id, token = %masked, error = %err, "failed to fetch watchlist");
                    continue;
                }
            };
            for entry in watchlist {
                if seen.insert(entry.guid.clone()) {
                    let handle = UserHandle {
                        rating_key: entry.rating_key.clone(),
                        access_token: user.access_token.clone(),
                    };
                    entries.push((entry, handle));
                }
            }
        }

        Ok(entries)
    }

    /// Steps 3a-3f: the per-entry gate-and-descend algorithm.
    async fn process_entry(
        &self,
        entry: &acquisitiond_core::WatchlistEntry,
        user: &UserHandle,
    ) -> Result<EntryOutcome> {
        // 3a. Library gate.
        if self.catalog.exists_in_library(&user.access_token, entry).await? {
            self.catalog.remove_from_watchlist(&user.access_token, &user.rating_key).await?;
            debug!(guid = %entry.guid, "already in library, removed from watchlist");
            return Ok(EntryOutcome::default());
        }

        // 3b. Duplicate gate.
        if self.download_jobs.is_guid_in_flight(&entry.guid).await? {
            self.catalog.remove_from_watchlist(&user.access_token, &user.rating_key).await?;
            debug!(guid = %entry.guid, "already queued in an earlier tick, removed from watchlist");
            return Ok(EntryOutcome::default());
        }

        // 3c. Search query construction.
        let Some(year) = entry.year else {
            debug!(guid = %entry.guid, "no release year available, skipping entry");
            return Ok(EntryOutcome::default());
        };
        let query = self.build_search_query(entry, year).await;

        // 3d. Candidate enumeration.
        let results = self.indexers.search(&query, entry.kind).await?;
        let candidates = select_candidates(results);
        let mut outcome = EntryOutcome { searched: true, queued: false };
        if candidates.is_empty() {
            debug!(guid = %entry.guid, query = %query, "no candidates found");
            return Ok(outcome);
        }

        // 3e. Descend the candidate list.
        for candidate in &candidates {
            if self.scan_records.has_infected(&candidate.result.release_guid).await? {
                debug!(release_guid = %candidate.result.release_guid, "previously found infected, skipping candidate");
                continue;
            }

            if let Err(err) = self
                .indexers
                .enqueue(&candidate.result.release_guid, candidate.result.indexer_id)
                .await
            {
                debug!(release_guid = %candidate.result.release_guid, error = %err, "enqueue failed, trying next candidate");
                continue;
            }

            tokio::time::sleep(self.matching.appearance_check_delay).await;

            let Some(torrent) = self.find_matching_torrent(&candidate.result.title).await? else {
                debug!(release_guid = %candidate.result.release_guid, "no matching torrent appeared, trying next candidate");
                continue;
            };

            let job = DownloadJob::new(
                torrent.hash.clone(),
                entry.guid.clone(),
                candidate.result.release_guid.clone(),
                user.rating_key.clone(),
                user.access_token.clone(),
                entry.title.clone(),
                Some(year),
                entry.kind,
                torrent.name.clone(),
            );
            self.download_jobs.create(&job).await?;
            self.catalog.remove_from_watchlist(&user.access_token, &user.rating_key).await?;
            info!(guid = %entry.guid, hash = %torrent.hash, "queued download");
            outcome.queued = true;
            return Ok(outcome);
        }

        // 3f. All candidates failed; leave on watchlist for the next tick.
        debug!(guid = %entry.guid, "exhausted all candidates, retrying next tick");
        Ok(outcome)
    }

    async fn build_search_query(&self, entry: &acquisitiond_core::WatchlistEntry, year: i32) -> String {
        let base = match self
            .metadata
            .original_title_and_language(&entry.title, entry.year, entry.kind)
            .await
        {
            Some(original) if original.language_code != "en" => original.title,
            _ => entry.title.clone(),
        };
        format!("{base} {year}")
    }

    /// The similarity matching rule from §4.10: a time-window match wins even at low
    /// similarity; otherwise fall back to similarity alone.
    async fn find_matching_torrent(
        &self,
        candidate_title: &str,
    ) -> Result<Option<acquisitiond_downloaders::TorrentStatus>> {
        let active = self.downloader.list_active().await?;
        let now = Utc::now().timestamp();

        let windowed = active.iter().find(|t| {
            let age = now - t.time_added;
            age >= 0 && age <= self.matching.appearance_window_secs
        });
        if let Some(t) = windowed {
            return Ok(Some(t.clone()));
        }

        Ok(active
            .into_iter()
            .find(|t| similarity(&t.name, candidate_title) >= self.matching.similarity_threshold))
    }

    /// Runs the scan pipeline for one job (the `/scanner/scan` trigger, §6): looks up the job,
    /// submits its quarantine payload to the scanner, and dispatches to the infection- or
    /// clean-handling algorithm depending on the verdict (§4.10).
    pub async fn run_scan(&self, torrent_hash: &str) -> Result<ScanOutcome> {
        let job = self.download_jobs.get(torrent_hash).await?.ok_or_else(|| {
            PipelineError::NotFound { resource: format!("download job for hash {torrent_hash}") }
        })?;

        let quarantine_path = self.filesystem.quarantine_path(&job.file_name);
        let verdict = self.scanner.scan(&quarantine_path.to_string_lossy()).await?;

        if verdict.infected {
            self.handle_infected(&job, &quarantine_path, verdict.threat_name.clone()).await?;
            Ok(ScanOutcome { infected: true, threat_name: verdict.threat_name, destination_path: None })
        } else {
            let destination = self.handle_clean(&job).await?;
            Ok(ScanOutcome { infected: false, threat_name: None, destination_path: Some(destination) })
        }
    }

    /// Infection-handling algorithm (§4.10), steps 2-7. Step 1 (job lookup) is done by the
    /// caller since a missing job means there is no scan to run at all.
    async fn handle_infected(
        &self,
        job: &DownloadJob,
        quarantine_path: &std::path::Path,
        threat_name: Option<String>,
    ) -> Result<()> {
        let quarantine_str = quarantine_path.to_string_lossy().to_string();
        if let Err(err) = self.filesystem.strip_non_media(quarantine_path).await {
            warn!(path = %quarantine_str, error = %err, "failed to strip non-media files from infected payload");
        }

        let record = ScanRecord::new(job.release_guid.clone(), quarantine_str, true, threat_name);
        self.scan_records.create(&record).await?;

        self.downloader.remove(&job.torrent_hash, true).await?;
        self.download_jobs.delete(job.job_id).await?;

        if job.can_requeue() {
            self.catalog.add_to_watchlist(&job.access_token, &job.rating_key).await?;
            info!(guid = %job.guid, "re-queued watchlist entry after infection");
        } else {
            warn!(guid = %job.guid, "infected job had no rating_key/token to re-queue, leaving as-is");
        }

        Ok(())
    }

    /// Clean-handling algorithm (§4.10): files the payload into the library and leaves the
    /// `DownloadJob` in place for the reconciler to eventually purge.
    async fn handle_clean(&self, job: &DownloadJob) -> Result<String> {
        let source = self.filesystem.quarantine_path(&job.file_name);
        let destination = self.filesystem.library_destination(job.kind, &job.file_name);

        let record = ScanRecord::new(job.release_guid.clone(), source.to_string_lossy().to_string(), false, None);
        let record = self.scan_records.create(&record).await?;

        self.filesystem.move_path(&source, &destination).await?;

        let destination_str = destination.to_string_lossy().to_string();
        let record = record.with_destination(destination_str.clone());
        self.scan_records.update(&record).await?;

        Ok(destination_str)
    }
}

/// Result of one `run_scan` call, mirroring the `/scanner/scan` response shape (§6).
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScanOutcome {
    pub infected: bool,
    pub threat_name: Option<String>,
    pub destination_path: Option<String>,
}

struct UserHandle {
    rating_key: String,
    access_token: String,
}

#[derive(Debug, Default)]
struct EntryOutcome {
    searched: bool,
    queued: bool,
}
