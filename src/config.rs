use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

/// Intake endpoint of the local verification agent.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8002/rest/post";

pub const CONTENT_TYPE_JSON: &str = "application/json";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuerConfig {
    pub endpoint: String,
    /// `None` leaves the transport's own default in place.
    pub timeout: Option<Duration>,
}

impl IssuerConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_http_url(&self.endpoint).map_err(|reason| {
            Error::config(format!("endpoint {:?}: {reason}", self.endpoint))
        })?;
        if self.timeout == Some(Duration::ZERO) {
            return Err(Error::config("timeout must be greater than zero"));
        }
        Ok(())
    }
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

/// Accepts absolute `http`/`https` URLs with a host.
pub(crate) fn check_http_url(raw: &str) -> std::result::Result<Url, String> {
    let url = Url::parse(raw).map_err(|err| err.to_string())?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme {other:?}")),
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err("missing host".to_string());
    }
    Ok(url)
}
