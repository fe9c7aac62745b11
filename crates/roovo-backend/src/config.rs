//! Backend connection settings.

use std::time::Duration;

use url::Url;

use crate::BackendError;

/// Environment variable read for the API base URL.
pub const API_BASE_URL_ENV: &str = "ROOVO_API_BASE_URL";

/// API base URL used when nothing is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3002";

/// Phoenix protocol version sent on connect.
pub const REALTIME_VSN: &str = "1.0.0";

/// Backend connection settings.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// REST API base, e.g. `http://localhost:3002`.
    pub api_base_url: String,
    /// Realtime websocket endpoint, e.g.
    /// `wss://project.supabase.co/realtime/v1/websocket`. `None` disables
    /// push delivery.
    pub realtime_url: Option<String>,
    /// Public API key sent with the realtime handshake and joins.
    pub anon_key: Option<String>,
    /// Per-request timeout for REST calls.
    pub request_timeout: Duration,
    /// Interval between realtime heartbeats.
    pub heartbeat_interval: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            realtime_url: None,
            anon_key: None,
            request_timeout: Duration::from_secs(10),
            heartbeat_interval: Duration::from_secs(30),
        }
    }
}

impl BackendConfig {
    /// Parsed API base URL.
    pub fn api_base(&self) -> Result<Url, BackendError> {
        Ok(Url::parse(&self.api_base_url)?)
    }

    /// Realtime URL with `apikey` and `vsn` query parameters, if configured.
    pub fn realtime_endpoint(&self) -> Result<Option<Url>, url::ParseError> {
        let Some(raw) = &self.realtime_url else {
            return Ok(None);
        };
        let mut url = Url::parse(raw)?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(key) = &self.anon_key {
                query.append_pair("apikey", key);
            }
            query.append_pair("vsn", REALTIME_VSN);
        }
        Ok(Some(url))
    }
}
