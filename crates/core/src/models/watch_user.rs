use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A member of the household whose catalog watchlist the orchestrator polls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchUser {
    pub id: Uuid,
    pub user_id: i64,
    pub display_name: String,
    /// Opaque catalog access token. Never logged unmasked; see [`crate::mask::mask_secret`].
    pub access_token: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WatchUser {
    pub fn new(user_id: i64, display_name: impl Into<String>, access_token: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            display_name: display_name.into(),
            access_token: access_token.into(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.updated_at = Utc::now();
    }
}
