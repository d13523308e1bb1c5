//! HTTP client for the slskd daemon.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::config::SlskdConfig;

use super::{FileListing, Offer, SearchState, SlskdError, SoulseekClient};

const API_KEY_HEADER: &str = "X-API-Key";

/// slskd HTTP API client.
pub struct SlskdClient {
    client: Client,
    config: SlskdConfig,
}

impl SlskdClient {
    /// Create a new client from daemon connection settings.
    pub fn new(config: SlskdConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn searches_url(&self) -> String {
        format!("{}/api/v0/searches", self.base_url())
    }

    fn search_url(&self, id: &str) -> String {
        format!("{}/api/v0/searches/{}", self.base_url(), id)
    }

    fn responses_url(&self, id: &str) -> String {
        format!("{}/api/v0/searches/{}/responses", self.base_url(), id)
    }

    fn downloads_url(&self, username: &str) -> String {
        format!(
            "{}/api/v0/transfers/downloads/{}",
            self.base_url(),
            urlencoding::encode(username)
        )
    }

    fn transport_error(e: reqwest::Error) -> SlskdError {
        if e.is_timeout() {
            SlskdError::Transport("request timed out".to_string())
        } else if e.is_connect() {
            SlskdError::Transport(format!("connection failed: {}", e))
        } else {
            SlskdError::Transport(e.to_string())
        }
    }

    /// Check an HTTP status, draining the body into the error on failure.
    async fn check_status(response: Response) -> Result<Response, SlskdError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SlskdError::Transport(format!(
                "authentication rejected (HTTP {})",
                status.as_u16()
            )));
        }
        let body = response.text().await.unwrap_or_default();
        Err(SlskdError::Transport(format!(
            "HTTP {}: {}",
            status,
            body.chars().take(200).collect::<String>()
        )))
    }
}

#[async_trait]
impl SoulseekClient for SlskdClient {
    fn name(&self) -> &str {
        "slskd"
    }

    async fn start_search(&self, query: &str) -> Result<String, SlskdError> {
        if query.trim().is_empty() {
            return Err(SlskdError::InvalidQuery);
        }

        // slskd accepts a client-supplied session id on creation
        let id = Uuid::new_v4().to_string();
        debug!(query = query, id = %id, "starting slskd search");

        let response = self
            .client
            .post(self.searches_url())
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&json!({ "id": id, "searchText": query }))
            .send()
            .await
            .map_err(Self::transport_error)?;

        let response = Self::check_status(response).await?;

        // The daemon echoes the session back; trust its id in case it
        // rewrote ours.
        let started: StartedSearch = response
            .json()
            .await
            .map_err(|e| SlskdError::InvalidResponse(format!("search creation: {}", e)))?;

        Ok(started.id)
    }

    async fn search_state(&self, id: &str) -> Result<SearchState, SlskdError> {
        let response = self
            .client
            .get(self.search_url(id))
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await
            .map_err(Self::transport_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SlskdError::NotFound(id.to_string()));
        }
        let response = Self::check_status(response).await?;

        let body: SearchStateBody = response
            .json()
            .await
            .map_err(|e| SlskdError::InvalidResponse(format!("search state: {}", e)))?;

        SearchState::parse(&body.state)
    }

    async fn search_responses(&self, id: &str) -> Result<Vec<Offer>, SlskdError> {
        let response = self
            .client
            .get(self.responses_url(id))
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await
            .map_err(Self::transport_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SlskdError::NotFound(id.to_string()));
        }
        let response = Self::check_status(response).await?;

        let offers: Vec<Offer> = response
            .json()
            .await
            .map_err(|e| SlskdError::InvalidResponse(format!("search responses: {}", e)))?;

        debug!(id = id, offers = offers.len(), "search responses fetched");
        Ok(offers)
    }

    async fn enqueue_download(
        &self,
        username: &str,
        file: &FileListing,
    ) -> Result<(), SlskdError> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct DownloadRequest<'a> {
            filename: &'a str,
            size: u64,
        }

        debug!(username = username, filename = %file.filename, "enqueueing transfer");

        let response = self
            .client
            .post(self.downloads_url(username))
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&[DownloadRequest {
                filename: &file.filename,
                size: file.size,
            }])
            .send()
            .await
            .map_err(Self::transport_error)?;

        Self::check_status(response).await?;
        Ok(())
    }
}

// slskd API response fragments
#[derive(Debug, Deserialize)]
struct StartedSearch {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SearchStateBody {
    state: String,
}
