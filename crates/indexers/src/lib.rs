//! Client for the indexer aggregator (§4.4): search, enqueue-to-downloader, and health.
//!
//! Grounded on the rate-limited `reqwest` client idiom used elsewhere in this workspace for
//! collaborator HTTP APIs: one shared `Client`, a sliding-window limiter guarding bursts
//! against an upstream that itself fronts many third-party trackers, and a single
//! `handle_response` helper mapping transport/HTTP outcomes onto the domain error taxonomy.

use std::time::{Duration, Instant};

use acquisitiond_core::{IndexerResult, MediaKind, PipelineError, Result};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone)]
pub struct IndexerConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
    pub max_requests_per_minute: u32,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9696".to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(60),
            max_requests_per_minute: 60,
        }
    }
}

#[derive(Debug)]
struct RateLimiter {
    max_requests: u32,
    window: Duration,
    requests: Mutex<Vec<Instant>>,
}

impl RateLimiter {
    fn new(max_requests_per_minute: u32) -> Self {
        Self {
            max_requests: max_requests_per_minute,
            window: Duration::from_secs(60),
            requests: Mutex::new(Vec::new()),
        }
    }

    async fn wait_if_needed(&self) {
        let mut requests = self.requests.lock().await;
        let now = Instant::now();
        requests.retain(|&t| now.duration_since(t) < self.window);

        if requests.len() >= self.max_requests as usize {
            let oldest = requests[0];
            let wait = self.window.saturating_sub(now.duration_since(oldest));
            if !wait.is_zero() {
                drop(requests);
                tokio::time::sleep(wait).await;
                requests = self.requests.lock().await;
                let now = Instant::now();
                requests.retain(|&t| now.duration_since(t) < self.window);
            }
        }
        requests.push(Instant::now());
    }
}

#[derive(Debug, Deserialize)]
struct RawSearchResult {
    #[serde(rename = "guid")]
    release_guid: String,
    #[serde(rename = "indexerId")]
    indexer_id: u32,
    title: String,
    seeders: Option<i64>,
    #[serde(rename = "seedCount")]
    seed_count: Option<i64>,
    seeds: Option<i64>,
    #[serde(rename = "publishDate")]
    published_at: chrono::DateTime<chrono::Utc>,
}

impl RawSearchResult {
    /// The aggregator's schema reports seeders under one of several field names depending on
    /// which upstream tracker produced the result; normalize to one.
    fn normalized_seeders(&self) -> i64 {
        self.seeders.or(self.seed_count).or(self.seeds).unwrap_or(0)
    }
}

#[derive(Debug, Deserialize)]
pub struct IndexerInfo {
    pub id: u32,
    pub name: String,
    pub enabled: bool,
}

pub struct IndexerClient {
    config: IndexerConfig,
    client: Client,
    base_url: Url,
    rate_limiter: RateLimiter,
}

impl IndexerClient {
    pub fn new(config: IndexerConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| PipelineError::Configuration {
            field: "indexer.base_url".to_string(),
            message: e.to_string(),
        })?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| transport_err(e))?;
        let rate_limiter = RateLimiter::new(config.max_requests_per_minute);
        Ok(Self { config, client, base_url, rate_limiter })
    }

    pub async fn search(&self, query: &str, kind: MediaKind) -> Result<Vec<IndexerResult>> {
        self.rate_limiter.wait_if_needed().await;

        let mut url = self.base_url.join("/api/v1/search").map_err(|e| transport_err(e))?;
        url.query_pairs_mut()
            .append_pair("query", query)
            .append_pair("categories", &kind.category_code().to_string());

        debug!(%url, "searching indexer aggregator");
        let response = self
            .client
            .get(url)
            .header("X-Api-Key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| transport_err(e))?;

        let raw: Vec<RawSearchResult> = self.handle_response(response).await?;
        Ok(raw
            .into_iter()
            .map(|r| IndexerResult {
                release_guid: r.release_guid.clone(),
                indexer_id: r.indexer_id,
                title: r.title.clone(),
                seeders: r.normalized_seeders(),
                published_at: r.published_at,
            })
            .collect())
    }

    pub async fn enqueue(&self, release_guid: &str, indexer_id: u32) -> Result<()> {
        self.rate_limiter.wait_if_needed().await;
        let url = self.base_url.join("/api/v1/search").map_err(|e| transport_err(e))?;

        #[derive(serde::Serialize)]
        struct EnqueueRequest<'a> {
            guid: &'a str,
            #[serde(rename = "indexerId")]
            indexer_id: u32,
        }

        let response = self
            .client
            .post(url)
            .header("X-Api-Key", &self.config.api_key)
            .json(&EnqueueRequest { guid: release_guid, indexer_id })
            .send()
            .await
            .map_err(|e| transport_err(e))?;

        self.handle_empty_response(response).await
    }

    pub async fn test_connection(&self) -> Result<bool> {
        let url = self.base_url.join("/api/v1/system/status").map_err(|e| transport_err(e))?;
        let response = self
            .client
            .get(url)
            .header("X-Api-Key", &self.config.api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map_err(|e| transport_err(e))?;
        Ok(response.status().is_success())
    }

    pub async fn list_indexers(&self) -> Result<Vec<IndexerInfo>> {
        let url = self.base_url.join("/api/v1/indexer").map_err(|e| transport_err(e))?;
        let response = self
            .client
            .get(url)
            .header("X-Api-Key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| transport_err(e))?;
        self.handle_response(response).await
    }

    pub async fn count_enabled_indexers(&self) -> Result<usize> {
        Ok(self.list_indexers().await?.into_iter().filter(|i| i.enabled).count())
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(PipelineError::AuthRejected { service: "indexer".to_string() });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Transport {
                service: "indexer".to_string(),
                message: format!("HTTP {status}: {body}"),
            });
        }
        let text = response.text().await.map_err(|e| transport_err(e))?;
        serde_json::from_str(&text).map_err(|e| PipelineError::MalformedResponse {
            service: "indexer".to_string(),
            message: e.to_string(),
        })
    }

    async fn handle_empty_response(&self, response: Response) -> Result<()> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(PipelineError::AuthRejected { service: "indexer".to_string() });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Transport {
                service: "indexer".to_string(),
                message: format!("HTTP {status}: {body}"),
            });
        }
        Ok(())
    }
}

fn transport_err(err: impl std::fmt::Display) -> PipelineError {
    PipelineError::Transport { service: "indexer".to_string(), message: err.to_string() }
}
