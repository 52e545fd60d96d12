//! Client for the catalog service that owns each user's watchlist and library membership
//! (§4.3). Modeled on the same typed-config + `reqwest::Client` + `handle_response` idiom as
//! the indexer and downloader clients in this workspace.

use std::time::Duration;

use acquisitiond_core::{MediaKind, PipelineError, Result, WatchlistEntry};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:32400".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WatchlistItem {
    guid: String,
    #[serde(rename = "ratingKey")]
    rating_key: Option<String>,
    title: Option<String>,
    year: Option<i32>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WatchlistResponse {
    items: Vec<WatchlistItem>,
}

#[derive(Debug, Deserialize)]
pub struct AccountInfo {
    pub username: String,
    pub uuid: String,
}

pub struct CatalogClient {
    config: CatalogConfig,
    client: Client,
    base_url: Url,
}

impl CatalogClient {
    pub fn new(config: CatalogConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| PipelineError::Configuration {
            field: "catalog.base_url".to_string(),
            message: e.to_string(),
        })?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PipelineError::Transport {
                service: "catalog".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self { config, client, base_url })
    }

    pub async fn fetch_watchlist(&self, token: &str) -> Result<Vec<WatchlistEntry>> {
        let url = self
            .base_url
            .join("/watchlist")
            .map_err(|e| transport_err("catalog", e))?;
        debug!(%url, "fetching watchlist");

        let response = self
            .client
            .get(url)
            .header("X-Plex-Token", token)
            .send()
            .await
            .map_err(|e| transport_err("catalog", e))?;

        let body: WatchlistResponse = self.handle_response(response).await?;
        Ok(body
            .items
            .into_iter()
            .filter_map(|item| {
                let rating_key = item.rating_key.unwrap_or_default();
                let title = item.title.unwrap_or_default();
                let kind = match item.kind.as_deref() {
                    Some("movie") => MediaKind::Movie,
                    Some("show") | Some("season") | Some("episode") => MediaKind::Show,
                    _ => return None,
                };
                Some(WatchlistEntry::new(item.guid, rating_key, title, item.year, kind))
            })
            .collect())
    }

    /// True iff the catalog reports exactly one entry with the same `guid` already in the
    /// user's library.
    pub async fn exists_in_library(&self, token: &str, entry: &WatchlistEntry) -> Result<bool> {
        let mut url = self
            .base_url
            .join("/library/search")
            .map_err(|e| transport_err("catalog", e))?;
        url.query_pairs_mut().append_pair("guid", &entry.guid);

        let response = self
            .client
            .get(url)
            .header("X-Plex-Token", token)
            .send()
            .await
            .map_err(|e| transport_err("catalog", e))?;

        #[derive(Deserialize)]
        struct LibrarySearchResponse {
            items: Vec<serde_json::Value>,
        }
        let body: LibrarySearchResponse = self.handle_response(response).await?;
        Ok(body.items.len() == 1)
    }

    pub async fn remove_from_watchlist(&self, token: &str, rating_key: &str) -> Result<()> {
        let url = self
            .base_url
            .join(&format!("/watchlist/{rating_key}"))
            .map_err(|e| transport_err("catalog", e))?;
        let response = self
            .client
            .delete(url)
            .header("X-Plex-Token", token)
            .send()
            .await
            .map_err(|e| transport_err("catalog", e))?;
        self.handle_empty_response(response).await
    }

    pub async fn add_to_watchlist(&self, token: &str, rating_key: &str) -> Result<()> {
        let url = self
            .base_url
            .join(&format!("/watchlist/{rating_key}"))
            .map_err(|e| transport_err("catalog", e))?;
        let response = self
            .client
            .put(url)
            .header("X-Plex-Token", token)
            .send()
            .await
            .map_err(|e| transport_err("catalog", e))?;
        self.handle_empty_response(response).await
    }

    /// Used only for health checks; never called on the hot path.
    pub async fn account_info(&self, token: &str) -> Result<AccountInfo> {
        let url = self
            .base_url
            .join("/account")
            .map_err(|e| transport_err("catalog", e))?;
        let response = self
            .client
            .get(url)
            .header("X-Plex-Token", token)
            .send()
            .await
            .map_err(|e| transport_err("catalog", e))?;
        self.handle_response(response).await
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(PipelineError::AuthRejected { service: "catalog".to_string() });
        }
        if status == StatusCode::NOT_FOUND {
            return Err(PipelineError::NotFound { resource: "catalog entry".to_string() });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Transport {
                service: "catalog".to_string(),
                message: format!("HTTP {status}: {body}"),
            });
        }
        let text = response.text().await.map_err(|e| transport_err("catalog", e))?;
        serde_json::from_str(&text).map_err(|e| PipelineError::MalformedResponse {
            service: "catalog".to_string(),
            message: e.to_string(),
        })
    }

    async fn handle_empty_response(&self, response: Response) -> Result<()> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(PipelineError::AuthRejected { service: "catalog".to_string() });
        }
        if status == StatusCode::NOT_FOUND {
            return Err(PipelineError::NotFound { resource: "catalog entry".to_string() });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Transport {
                service: "catalog".to_string(),
                message: format!("HTTP {status}: {body}"),
            });
        }
        Ok(())
    }
}

fn transport_err(service: &str, err: impl std::fmt::Display) -> PipelineError {
    PipelineError::Transport { service: service.to_string(), message: err.to_string() }
}
