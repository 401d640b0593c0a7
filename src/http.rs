//! HTTP plumbing shared by the blocking and streaming call paths.

use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;

use crate::client::ClientError;
use crate::options::TransportOptions;

/// Build a configured HTTP client from transport options.
pub(crate) fn build_http_client(options: &TransportOptions) -> Result<Client, ClientError> {
    let mut builder = Client::builder();

    if let Some(timeout) = options.timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(proxy_url) = &options.proxy {
        let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| {
            ClientError::Config(format!("invalid proxy URL {proxy_url:?}: {e}"))
        })?;
        builder = builder.proxy(proxy);
    }

    Ok(builder.build()?)
}

/// Add extra headers to a request if specified in transport options.
pub(crate) fn add_extra_headers(
    mut request: RequestBuilder,
    options: &TransportOptions,
) -> RequestBuilder {
    if let Some(headers) = &options.headers {
        for (key, value) in headers {
            request = request.header(key, value);
        }
    }
    request
}

/// Extension trait for `RequestBuilder` that logs the request body.
pub trait RequestBuilderExt {
    /// Set the JSON request body and log it. Returns the builder for chaining.
    fn json_logged<T: serde::Serialize + ?Sized>(self, json: &T) -> Self;
}

impl RequestBuilderExt for RequestBuilder {
    fn json_logged<T: serde::Serialize + ?Sized>(self, json: &T) -> Self {
        if let Ok(body) = serde_json::to_string(json) {
            tracing::debug!("API request body ({} bytes): {}", body.len(), body);
        }

        self.json(json)
    }
}

/// Error body shape returned by the API, e.g.
/// `{"status": 400, "code": "invalid_param", "message": "..."}`.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: Option<String>,
    message: Option<String>,
}

/// Pass a successful response through; map anything else to
/// [`ClientError::Api`], consuming the body for diagnostics.
pub(crate) async fn require_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!("API error response ({}): {}", status, body);

    match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(parsed) => Err(ClientError::Api {
            status,
            code: parsed.code,
            message: parsed.message.unwrap_or(body),
        }),
        Err(_) => Err(ClientError::Api {
            status,
            code: None,
            message: body,
        }),
    }
}

/// Read a response body as JSON, logging it. Consumes the response.
pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    response: Response,
) -> Result<T, ClientError> {
    let bytes = response.bytes().await?;

    if let Ok(text) = std::str::from_utf8(&bytes) {
        tracing::debug!("API response ({} bytes): {}", text.len(), text);
    }

    serde_json::from_slice(&bytes).map_err(ClientError::from)
}
