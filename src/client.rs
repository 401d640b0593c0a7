//! Core client type, configuration and error taxonomy.

use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use thiserror::Error;

use crate::http::{add_extra_headers, build_http_client};
use crate::options::TransportOptions;

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The server answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        status: StatusCode,
        /// Machine-readable error code from the response body, if any.
        code: Option<String>,
        message: String,
    },

    /// The response body failed mid-stream, before a clean end-of-stream.
    #[error("transport error while streaming: {0}")]
    Transport(String),

    /// One SSE frame could not be decoded into the expected event shape.
    /// The stream stopped at that frame.
    #[error("failed to decode frame {frame:?}: {message}")]
    Decode { frame: String, message: String },

    /// The consumer cancelled the stream.
    #[error("stream cancelled")]
    Cancelled,

    #[error("configuration error: {0}")]
    Config(String),
}

/// Per-client configuration: credentials and base address.
///
/// Always passed explicitly to [`Client::new`]; there is no process-wide
/// default.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Dify API, e.g. `https://api.dify.ai`.
    pub base_url: String,
    /// Application API key, sent as a bearer token.
    pub api_key: String,
}

/// Dify API client.
///
/// Cheap to clone; the underlying HTTP connection pool is shared between
/// clones. Operations live in the per-endpoint modules: [`chat`],
/// [`completion`] and [`workflow`].
///
/// [`chat`]: crate::chat
/// [`completion`]: crate::completion
/// [`workflow`]: crate::workflow
#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
    transport_options: TransportOptions,
    http: reqwest::Client,
}

impl Client {
    /// Create a client with default transport options.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Self::with_transport(config, TransportOptions::default())
    }

    /// Create a client with explicit transport options.
    pub fn with_transport(
        config: ClientConfig,
        transport_options: TransportOptions,
    ) -> Result<Self, ClientError> {
        if config.base_url.is_empty() || config.api_key.is_empty() {
            return Err(ClientError::Config(
                "base_url and api_key must be provided".to_string(),
            ));
        }
        let http = build_http_client(&transport_options)?;
        Ok(Self {
            config,
            transport_options,
            http,
        })
    }

    /// Build an authenticated POST request against an API path.
    pub(crate) fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url, path);
        let request = self
            .http
            .post(url)
            .bearer_auth(&self.config.api_key)
            .header(CONTENT_TYPE, "application/json");
        add_extra_headers(request, &self.transport_options)
    }
}
