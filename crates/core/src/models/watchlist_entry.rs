use serde::{Deserialize, Serialize};

/// The kind of media a watchlist entry refers to, used to pick a category code and a library root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Movie,
    Show,
}

impl MediaKind {
    /// The indexer aggregator's category code for this kind (§4.4).
    pub fn category_code(&self) -> u32 {
        match self {
            MediaKind::Movie => 2000,
            MediaKind::Show => 5000,
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Movie => write!(f, "movie"),
            MediaKind::Show => write!(f, "show"),
        }
    }
}

/// A single media item a user wants acquired. Transient: sourced fresh from the catalog on
/// every tick, never persisted in this shape (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub guid: String,
    pub rating_key: String,
    pub title: String,
    pub year: Option<i32>,
    pub kind: MediaKind,
}

impl WatchlistEntry {
    pub fn new(
        guid: impl Into<String>,
        rating_key: impl Into<String>,
        title: impl Into<String>,
        year: Option<i32>,
        kind: MediaKind,
    ) -> Self {
        Self {
            guid: guid.into(),
            rating_key: rating_key.into(),
            title: title.into(),
            year,
            kind,
        }
    }
}
