//! Client for the download daemon (§4.5): one lazily-opened, lazily-reauthenticated session
//! over its cookie-authenticated HTTP API. On an auth error mid-call the client re-authenticates
//! once and retries before surfacing the failure, mirroring this workspace's qBittorrent client.

use std::sync::Arc;
use std::time::{Duration, Instant};

use acquisitiond_core::{PipelineError, Result};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            username: "admin".to_string(),
            password: String::new(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct TorrentStatus {
    pub hash: String,
    pub name: String,
    pub state: String,
    pub progress: f64,
    pub eta: i64,
    #[serde(rename = "added_on")]
    pub time_added: i64,
}

#[derive(Debug, Default)]
struct SessionState {
    authenticated: bool,
    last_auth_at: Option<Instant>,
}

pub struct DownloaderClient {
    config: DownloaderConfig,
    client: Client,
    base_url: Url,
    session: Arc<RwLock<SessionState>>,
}

impl DownloaderClient {
    pub fn new(config: DownloaderConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| PipelineError::Configuration {
            field: "downloader.base_url".to_string(),
            message: e.to_string(),
        })?;
        let client = Client::builder()
            .timeout(config.timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| transport_err(e))?;
        Ok(Self { config, client, base_url, session: Arc::new(RwLock::new(SessionState::default())) })
    }

    async fn ensure_authenticated(&self) -> Result<()> {
        if self.session.read().await.authenticated {
            return Ok(());
        }
        self.login().await
    }

    async fn login(&self) -> Result<()> {
        let url = self.base_url.join("api/v2/auth/login").map_err(|e| transport_err(e))?;
        let mut form = std::collections::HashMap::new();
        form.insert("username", &self.config.username);
        form.insert("password", &self.config.password);

        debug!(%url, "authenticating with downloader");
        let response = self
            .client
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(|e| transport_err(e))?;

        if response.status() == reqwest::StatusCode::FORBIDDEN {
            return Err(PipelineError::AuthRejected { service: "downloader".to_string() });
        }
        if !response.status().is_success() {
            return Err(PipelineError::Transport {
                service: "downloader".to_string(),
                message: format!("login failed with status {}", response.status()),
            });
        }

        let body = response.text().await.map_err(|e| transport_err(e))?;
        if body.to_lowercase().contains("fail") {
            return Err(PipelineError::AuthRejected { service: "downloader".to_string() });
        }

        let mut state = self.session.write().await;
        state.authenticated = true;
        state.last_auth_at = Some(Instant::now());
        Ok(())
    }

    async fn reset_auth(&self) {
        let mut state = self.session.write().await;
        state.authenticated = false;
    }

    fn is_auth_error(err: &PipelineError) -> bool {
        matches!(err, PipelineError::AuthRejected { .. })
    }

    /// Run `op`, retrying once after a fresh login if the first attempt failed on auth.
    async fn with_session<T, F, Fut>(&self, op: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        self.ensure_authenticated().await?;
        match op().await {
            Err(err) if Self::is_auth_error(&err) => {
                warn!("downloader rejected session, re-authenticating and retrying once");
                self.reset_auth().await;
                self.ensure_authenticated().await?;
                op().await
            }
            other => other,
        }
    }

    pub async fn list_active(&self) -> Result<Vec<TorrentStatus>> {
        self.with_session(|| async {
            let url = self.base_url.join("api/v2/torrents/info").map_err(|e| transport_err(e))?;
            let response = self.client.get(url).send().await.map_err(|e| transport_err(e))?;
            self.handle_response(response).await
        })
        .await
    }

    pub async fn status(&self, hash: &str) -> Result<Option<TorrentStatus>> {
        let all = self.list_active().await?;
        Ok(all.into_iter().find(|t| t.hash.eq_ignore_ascii_case(hash)))
    }

    pub async fn remove(&self, hash: &str, also_delete_data: bool) -> Result<()> {
        let hash = hash.to_string();
        self.with_session(|| {
            let hash = hash.clone();
            async move {
                let url = self.base_url.join("api/v2/torrents/delete").map_err(|e| transport_err(e))?;
                let mut form = std::collections::HashMap::new();
                form.insert("hashes", hash.clone());
                form.insert("deleteFiles", also_delete_data.to_string());
                let response = self
                    .client
                    .post(url)
                    .form(&form)
                    .send()
                    .await
                    .map_err(|e| transport_err(e))?;
                self.handle_empty_response(response).await
            }
        })
        .await
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status == reqwest::StatusCode::FORBIDDEN || status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(PipelineError::AuthRejected { service: "downloader".to_string() });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Transport {
                service: "downloader".to_string(),
                message: format!("HTTP {status}: {body}"),
            });
        }
        let text = response.text().await.map_err(|e| transport_err(e))?;
        serde_json::from_str(&text).map_err(|e| PipelineError::MalformedResponse {
            service: "downloader".to_string(),
            message: e.to_string(),
        })
    }

    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();
        if status == reqwest::StatusCode::FORBIDDEN || status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(PipelineError::AuthRejected { service: "downloader".to_string() });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Transport {
                service: "downloader".to_string(),
                message: format!("HTTP {status}: {body}"),
            });
        }
        Ok(())
    }
}

fn transport_err(err: impl std::fmt::Display) -> PipelineError {
    PipelineError::Transport { service: "downloader".to_string(), message: err.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn list_active_logs_in_then_lists() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Ok."))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/torrents/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"hash": "abc", "name": "Movie", "state": "downloading", "progress": 0.5, "eta": 100, "added_on": 123}
            ])))
            .mount(&server)
            .await;

        let client = DownloaderClient::new(DownloaderConfig { base_url: server.uri(), ..Default::default() }).unwrap();
        let torrents = client.list_active().await.unwrap();
        assert_eq!(torrents.len(), 1);
        assert_eq!(torrents[0].hash, "abc");
    }

    #[tokio::test]
    async fn status_returns_none_when_hash_missing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Ok."))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/torrents/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let client = DownloaderClient::new(DownloaderConfig { base_url: server.uri(), ..Default::default() }).unwrap();
        assert!(client.status("missing").await.unwrap().is_none());
    }
}
