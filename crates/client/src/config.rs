// crates/client/src/config.rs
//! Client configuration with environment overrides.

use std::path::PathBuf;
use std::time::Duration;

/// Default API base when `MORPHBOX_API_URL` is unset.
const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Fixed polling cadence for the job list.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Per-request timeout. Uploads can be large, so this is generous.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Configuration for the conversion-service client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL, without a trailing slash.
    pub base_url: String,
    /// Job polling cadence (client-chosen, server-independent).
    pub poll_interval: Duration,
    /// Timeout applied to every request.
    pub request_timeout: Duration,
    /// Credentials file override. `None` = platform default location.
    pub credentials_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let base_url = std::env::var("MORPHBOX_API_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let poll_interval = std::env::var("MORPHBOX_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_POLL_INTERVAL);
        Self {
            base_url,
            poll_interval,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            credentials_path: None,
        }
    }
}

impl ClientConfig {
    /// Config pointed at an explicit base URL (tests, `--api-url`).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Base URL with any trailing slash removed, ready for path joins.
    pub fn trimmed_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
