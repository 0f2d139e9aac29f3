//! Routing engine HTTP client.
//!
//! Sends shaped requests to the engine and hands back its response body
//! untouched. Transport failures, timeouts and non-success statuses all
//! surface as [`ValhallaError`].

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::error::ValhallaError;
use super::request::{IsochroneRequest, RouteRequest};

/// Default routing engine address.
const DEFAULT_BASE_URL: &str = "http://localhost:8002";

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for the liveness probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 16;

/// Configuration for the routing engine client.
#[derive(Debug, Clone)]
pub struct ValhallaConfig {
    /// Base URL, without trailing slash
    pub base_url: String,
    /// Timeout for route and isochrone requests
    pub timeout: Duration,
    /// Timeout for the liveness probe
    pub probe_timeout: Duration,
    /// Maximum concurrent route and isochrone requests
    pub max_concurrent: usize,
}

impl ValhallaConfig {
    /// Create a config for the engine at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: trim_base_url(base_url.into()),
            timeout: DEFAULT_TIMEOUT,
            probe_timeout: PROBE_TIMEOUT,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the liveness probe timeout.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }
}

impl Default for ValhallaConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

fn trim_base_url(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

/// Routing engine client.
///
/// Cheap to clone; clones share the connection pool and concurrency limit.
#[derive(Debug, Clone)]
pub struct ValhallaClient {
    http: reqwest::Client,
    base_url: String,
    probe_timeout: Duration,
    semaphore: Arc<Semaphore>,
}

impl ValhallaClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ValhallaConfig) -> Result<Self, ValhallaError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ValhallaError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url,
            probe_timeout: config.probe_timeout,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    /// The engine's base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Compute a route. Returns the engine's response body as sent.
    pub async fn route(&self, request: &RouteRequest) -> Result<String, ValhallaError> {
        debug!(costing = %request.costing, "requesting route");
        self.post("route", request).await
    }

    /// Compute isochrones. Returns the engine's response body as sent.
    pub async fn isochrone(&self, request: &IsochroneRequest) -> Result<String, ValhallaError> {
        debug!(
            costing = %request.costing,
            contours = request.contours.len(),
            "requesting isochrone"
        );
        self.post("isochrone", request).await
    }

    /// Best-effort liveness check against `GET /status`.
    ///
    /// Never fails: any error or non-success status reads as `false`.
    pub async fn probe(&self) -> bool {
        let url = format!("{}/status", self.base_url);

        match self
            .http
            .get(&url)
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "routing engine probe failed");
                false
            }
        }
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<String, ValhallaError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| ValhallaError::Client("semaphore closed".to_string()))?;

        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self.http.post(&url).json(body).send().await.map_err(|e| {
            warn!(%url, error = %e, "routing engine request failed");
            ValhallaError::from(e)
        })?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%url, status = status.as_u16(), "routing engine returned an error");
            return Err(ValhallaError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.text().await?)
    }
}
