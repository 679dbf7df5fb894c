//! HTTP host talking to an agent's paging endpoint.
//!
//! Requests are plain `GET {base_url}{endpoint}?path=..&offset=..&length=..`
//! calls. A 404 is handed back as a response so the file layer can classify
//! it; any other non-success status is a transport error.

use crate::config::HttpHostConfig;
use crate::error::HostError;
use crate::host::{Host, HostResponse, ReadParams};
use async_trait::async_trait;
use hyper::client::HttpConnector;
use hyper::{Client, StatusCode, Uri};
use tokio::time::timeout;

/// [`Host`] backed by a hyper HTTP client.
#[derive(Debug, Clone)]
pub struct HttpHost {
    client: Client<HttpConnector>,
    config: HttpHostConfig,
    key: String,
}

impl HttpHost {
    /// Create a host for the agent at `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL does not parse or has no authority.
    pub fn new(config: HttpHostConfig) -> Result<Self, HostError> {
        let uri = config
            .base_url
            .parse::<Uri>()
            .map_err(|e| HostError::InvalidUri(format!("{}: {e}", config.base_url)))?;

        let key = uri
            .authority()
            .map(|a| a.to_string())
            .ok_or_else(|| HostError::InvalidUri(format!("{}: missing host", config.base_url)))?;

        tracing::debug!(base_url = %config.base_url, key = %key, "Created HTTP host");

        Ok(Self {
            client: Client::new(),
            config,
            key,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &HttpHostConfig {
        &self.config
    }

    fn request_uri(&self, endpoint: &str, params: &ReadParams) -> Result<Uri, HostError> {
        let url = format!(
            "{}{}?{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint,
            params.to_query()?
        );
        url.parse::<Uri>()
            .map_err(|e| HostError::InvalidUri(format!("{url}: {e}")))
    }
}

#[async_trait]
impl Host for HttpHost {
    fn key(&self) -> String {
        self.key.clone()
    }

    async fn fetch(&self, endpoint: &str, params: &ReadParams) -> Result<HostResponse, HostError> {
        let uri = self.request_uri(endpoint, params)?;
        tracing::trace!(uri = %uri, "Sending paging request");

        let response = match timeout(self.config.timeout, self.client.get(uri)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::warn!(host = %self.key, path = %params.path, error = %e, "Paging request failed");
                return Err(e.into());
            }
            Err(_) => {
                tracing::warn!(
                    host = %self.key,
                    path = %params.path,
                    timeout_secs = self.config.timeout.as_secs(),
                    "Paging request timeout"
                );
                return Err(HostError::Timeout(self.config.timeout));
            }
        };

        let status = response.status();
        let body = hyper::body::to_bytes(response.into_body()).await?;

        if !status.is_success() && status != StatusCode::NOT_FOUND {
            let body = String::from_utf8_lossy(&body).into_owned();
            tracing::warn!(host = %self.key, status = %status, body = %body, "Unexpected paging status");
            return Err(HostError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::trace!(status = %status, body_len = body.len(), "Paging response received");
        Ok(HostResponse {
            status: status.as_u16(),
            body: body.to_vec(),
        })
    }
}
