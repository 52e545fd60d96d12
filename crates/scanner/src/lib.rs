//! Client for the payload scan sidecar (§4.6). The scanner auto-detects whether the submitted
//! path is a file or a directory and aggregates recursively; calls may take minutes, so the
//! timeout here is deliberately generous and distinct from the other collaborator clients.

use std::time::Duration;

use acquisitiond_core::{PipelineError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8090".to_string(),
            timeout: Duration::from_secs(600),
        }
    }
}

/// Outcome of scanning a file or directory (§4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanVerdict {
    pub infected: bool,
    pub threat_name: Option<String>,
    pub signature_matches: Vec<String>,
    pub scanned_files: Vec<String>,
    pub infected_files: Vec<String>,
}

pub struct ScannerClient {
    config: ScannerConfig,
    client: Client,
    base_url: Url,
}

impl ScannerClient {
    pub fn new(config: ScannerConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| PipelineError::Configuration {
            field: "scanner.base_url".to_string(),
            message: e.to_string(),
        })?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| transport_err(e))?;
        Ok(Self { config, client, base_url })
    }

    pub async fn scan(&self, path: &str) -> Result<ScanVerdict> {
        #[derive(Serialize)]
        struct ScanRequest<'a> {
            path: &'a str,
        }

        let url = self.base_url.join("/scan").map_err(|e| transport_err(e))?;
        debug!(%url, path, "submitting scan request");

        let response = self
            .client
            .post(url)
            .json(&ScanRequest { path })
            .send()
            .await
            .map_err(|e| transport_err(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::ScanError { message: format!("HTTP {status}: {body}") });
        }

        let text = response.text().await.map_err(|e| transport_err(e))?;
        serde_json::from_str(&text)
            .map_err(|e| PipelineError::ScanError { message: format!("malformed scan response: {e}") })
    }

    pub async fn test_connection(&self) -> Result<bool> {
        let url = self.base_url.join("/health").map_err(|e| transport_err(e))?;
        let response = self
            .client
            .get(url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map_err(|e| transport_err(e))?;
        Ok(response.status().is_success())
    }
}

fn transport_err(err: impl std::fmt::Display) -> PipelineError {
    PipelineError::Transport { service: "scanner".to_string(), message: err.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn scan_parses_infected_verdict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/scan"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "infected": true,
                "threat_name": "Eicar-Test-Signature",
                "signature_matches": ["Eicar-Test-Signature"],
                "scanned_files": ["movie.mkv"],
                "infected_files": ["movie.mkv"]
            })))
            .mount(&server)
            .await;

        let client = ScannerClient::new(ScannerConfig { base_url: server.uri(), ..Default::default() }).unwrap();
        let verdict = client.scan("/quarantine/movie").await.unwrap();
        assert!(verdict.infected);
        assert_eq!(verdict.threat_name.as_deref(), Some("Eicar-Test-Signature"));
    }

    #[tokio::test]
    async fn scan_failure_maps_to_scan_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/scan"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = ScannerClient::new(ScannerConfig { base_url: server.uri(), ..Default::default() }).unwrap();
        let result = client.scan("/quarantine/movie").await;
        assert!(matches!(result, Err(PipelineError::ScanError { .. })));
    }
}
