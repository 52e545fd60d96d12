use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single result returned by the indexer aggregator for a search query (§4.4), after the
/// client has normalized the tolerant seeder field (§9) to one canonical name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerResult {
    pub release_guid: String,
    pub indexer_id: u32,
    pub title: String,
    pub seeders: i64,
    pub published_at: DateTime<Utc>,
}

/// An [`IndexerResult`] annotated with a [`crate::quality::QualityFacets`] score, produced by
/// the [`crate::selector`] (§4.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub result: IndexerResult,
    pub facets: crate::quality::QualityFacets,
    pub score: i64,
}
