//! GDC REST API client
//!
//! Thin wrapper over `reqwest` for the search endpoints (`/files`,
//! `/cases`, `/annotations`), the data endpoint (`/data/{uuid}`) and
//! streamed downloads from arbitrary mirrors.

use crate::cli::config::Config;
use crate::display;
use crate::errors::{FetchError, Result};
use crate::gdc::filters::QueryParams;
use crate::gdc::types::SearchResponse;
use crate::retry::RetryManager;
use futures_util::StreamExt;
use reqwest::{header, Client, Response};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Default GDC API endpoint
pub const DEFAULT_GDC_URL: &str = crate::cli::config::DEFAULT_GDC_URL;

/// Search request timeout (60 seconds)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// File download timeout (5 minutes)
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Result of a streamed download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub bytes_written: u64,
    pub content_type: Option<String>,
}

impl DownloadOutcome {
    /// Whether the server labelled the payload as an HTML page
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.to_lowercase().contains("html"))
            .unwrap_or(false)
    }
}

/// HTTP client for the GDC API
#[derive(Debug, Clone)]
pub struct GdcClient {
    client: Client,
    base_url: String,
    retry: RetryManager,
    request_timeout: Duration,
    download_timeout: Duration,
    show_progress: bool,
}

impl GdcClient {
    /// Create new client with default settings
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_GDC_URL)
    }

    /// Create client against a custom API root
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(FetchError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry: RetryManager::new(),
            request_timeout: REQUEST_TIMEOUT,
            download_timeout: DOWNLOAD_TIMEOUT,
            show_progress: false,
        })
    }

    /// Create client from loaded configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut client = Self::with_base_url(&config.gdc.base_url)?;
        client.retry = RetryManager::with_config(config.retry.max_retries, config.retry.base_delay_ms)
            .with_jitter(config.retry.jitter);
        client.request_timeout = Duration::from_secs(config.gdc.request_timeout_sec);
        client.download_timeout = Duration::from_secs(config.gdc.download_timeout_sec);
        Ok(client)
    }

    /// Render progress bars for downloads
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the raw file behind a GDC file UUID
    pub fn data_url(&self, file_id: &str) -> String {
        format!("{}/data/{}", self.base_url, file_id)
    }

    /// Query a search endpoint (e.g. `/files`, `/cases`) with retries
    pub async fn query(&self, endpoint: &str, params: &QueryParams) -> Result<serde_json::Value> {
        let url = format!("{}{}", self.base_url, endpoint);
        let pairs = params.to_pairs();

        self.retry
            .execute_with_retry(|| self.query_once(&url, &pairs))
            .await
    }

    async fn query_once(&self, url: &str, pairs: &[(&'static str, String)]) -> Result<serde_json::Value> {
        debug!(%url, "GDC query");
        let response = self
            .client
            .get(url)
            .query(pairs)
            .timeout(self.request_timeout)
            .send()
            .await?;

        let response = check_status(response)?;
        Ok(response.json().await?)
    }

    /// Query a search endpoint and decode `data.hits`
    pub async fn hits<T: DeserializeOwned>(&self, endpoint: &str, params: &QueryParams) -> Result<Vec<T>> {
        let body = self.query(endpoint, params).await?;
        let envelope: SearchResponse<T> = serde_json::from_value(body)?;

        envelope.into_hits().ok_or_else(|| FetchError::MissingHits {
            endpoint: endpoint.to_string(),
        })
    }

    /// GET `/status`
    pub async fn status(&self) -> Result<serde_json::Value> {
        let url = format!("{}/status", self.base_url);
        self.retry
            .execute_with_retry(|| self.query_once(&url, &[]))
            .await
    }

    /// Start a GET for a download, failing on non-success status
    pub async fn open(&self, url: &str) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .timeout(self.download_timeout)
            .send()
            .await?;
        check_status(response)
    }

    /// Stream an opened response into `dest`.
    ///
    /// Bytes land in `<dest>.part` and are renamed onto `dest` only once
    /// the body is complete; the part file is removed on error.
    pub async fn save(&self, response: Response, dest: &Path) -> Result<DownloadOutcome> {
        let partial = partial_path(dest);
        match self.stream_to(response, &partial).await {
            Ok(outcome) => {
                tokio::fs::rename(&partial, dest).await?;
                info!(path = %dest.display(), bytes = outcome.bytes_written, "Downloaded");
                Ok(outcome)
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&partial).await;
                Err(e)
            }
        }
    }

    async fn stream_to(&self, response: Response, dest: &Path) -> Result<DownloadOutcome> {
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let total = response.content_length();

        let pb = display::download_bar(total, self.show_progress);
        let mut file = tokio::fs::File::create(dest).await?;
        let mut written = 0u64;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk: bytes::Bytes = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    pb.abandon();
                    return Err(e.into());
                }
            };
            if chunk.is_empty() {
                continue;
            }
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
            pb.set_position(written);
        }
        file.flush().await?;
        pb.finish_and_clear();

        Ok(DownloadOutcome {
            bytes_written: written,
            content_type,
        })
    }

    /// Stream `url` into `dest`
    pub async fn download(&self, url: &str, dest: &Path) -> Result<DownloadOutcome> {
        let response = self.open(url).await?;
        self.save(response, dest).await
    }
}

/// `<dest>.part`, the in-flight name of a download
pub fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(FetchError::Api {
            status: status.as_u16(),
            url: response.url().to_string(),
        })
    }
}
