//! Client resolving a release's original title and language for search-query construction
//! (§4.7, §4.10c). Grounded on this workspace's metadata-service client, but with a soft-failure
//! contract the original client lacked: any failure, including a missing API credential,
//! degrades to `None` rather than propagating an error, since the orchestrator's fallback
//! (use the display title as-is) is always safe.

use acquisitiond_core::{CircuitBreaker, CircuitBreakerConfig, MediaKind};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct MetadataConfig {
    pub base_url: String,
    /// `None` means the integration is unconfigured; every call then returns `None` immediately.
    pub api_key: Option<String>,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self { base_url: "https://api.themoviedb.org/3".to_string(), api_key: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalTitle {
    pub title: String,
    pub language_code: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchResultItem>,
}

#[derive(Debug, Deserialize)]
struct SearchResultItem {
    #[serde(alias = "original_title", alias = "original_name")]
    original_title: String,
    original_language: String,
}

pub struct MetadataClient {
    config: MetadataConfig,
    client: Client,
    circuit_breaker: CircuitBreaker,
}

impl MetadataClient {
    pub fn new(config: MetadataConfig) -> Self {
        let circuit_breaker = CircuitBreaker::new(
            CircuitBreakerConfig::new("metadata")
                .with_failure_threshold(5)
                .with_success_threshold(2),
        );
        Self { config, client: Client::new(), circuit_breaker }
    }

    /// Returns `None` whenever the lookup cannot be trusted: no credential configured, the
    /// upstream is unreachable, or nothing matched. Never returns an error (§4.7).
    pub async fn original_title_and_language(
        &self,
        title: &str,
        year: Option<i32>,
        kind: MediaKind,
    ) -> Option<OriginalTitle> {
        let Some(api_key) = self.config.api_key.clone() else {
            debug!("metadata client has no credential configured, skipping lookup");
            return None;
        };

        let base_url = self.config.base_url.clone();
        let client = self.client.clone();
        let title = title.to_string();
        let endpoint = match kind {
            MediaKind::Movie => "search/movie",
            MediaKind::Show => "search/tv",
        };

        let result = self
            .circuit_breaker
            .call(async move {
                let url = format!("{base_url}/{endpoint}");
                let mut query = vec![("api_key".to_string(), api_key), ("query".to_string(), title)];
                if let Some(year) = year {
                    query.push(("year".to_string(), year.to_string()));
                }

                let response = client
                    .get(&url)
                    .query(&query)
                    .send()
                    .await
                    .map_err(|e| acquisitiond_core::PipelineError::Transport {
                        service: "metadata".to_string(),
                        message: e.to_string(),
                    })?;

                if !response.status().is_success() {
                    return Err(acquisitiond_core::PipelineError::Transport {
                        service: "metadata".to_string(),
                        message: format!("HTTP {}", response.status()),
                    });
                }

                let body: SearchResponse = response.json().await.map_err(|e| {
                    acquisitiond_core::PipelineError::MalformedResponse {
                        service: "metadata".to_string(),
                        message: e.to_string(),
                    }
                })?;
                Ok(body.results.into_iter().next())
            })
            .await;

        match result {
            Ok(Some(item)) => Some(OriginalTitle {
                title: item.original_title,
                language_code: item.original_language,
            }),
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, "metadata lookup failed, falling back to display title");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_credential_skips_the_call_entirely() {
        let client = MetadataClient::new(MetadataConfig { base_url: "http://localhost:1".to_string(), api_key: None });
        let result = client.original_title_and_language("Amelie", Some(2001), MediaKind::Movie).await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn unreachable_upstream_degrades_to_none() {
        let client = MetadataClient::new(MetadataConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            api_key: Some("key".to_string()),
        });
        let result = client.original_title_and_language("Amelie", Some(2001), MediaKind::Movie).await;
        assert!(result.is_none());
    }
}
