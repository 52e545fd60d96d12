use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The outcome of scanning a completed payload (§3). Written once per scan; never mutated
/// except to record the post-move destination path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    pub scan_id: Uuid,
    pub release_guid: String,
    pub source_path: String,
    pub destination_path: Option<String>,
    pub infected: bool,
    pub threat_name: Option<String>,
    pub scanned_at: DateTime<Utc>,
}

impl ScanRecord {
    pub fn new(
        release_guid: impl Into<String>,
        source_path: impl Into<String>,
        infected: bool,
        threat_name: Option<String>,
    ) -> Self {
        Self {
            scan_id: Uuid::new_v4(),
            release_guid: release_guid.into(),
            source_path: source_path.into(),
            destination_path: None,
            infected,
            threat_name,
            scanned_at: Utc::now(),
        }
    }

    pub fn with_destination(mut self, destination_path: impl Into<String>) -> Self {
        self.destination_path = Some(destination_path.into());
        self
    }
}
