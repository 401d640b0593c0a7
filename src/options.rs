//! Transport configuration options.

use std::collections::HashMap;
use std::time::Duration;

/// Transport configuration.
///
/// Controls how requests are sent over the network. Each [`Client`]
/// carries its own copy, so independently configured clients can coexist
/// in one process.
///
/// [`Client`]: crate::client::Client
#[derive(Debug, Clone, Default)]
pub struct TransportOptions {
    /// Request timeout. If `None`, the default client timeout is used.
    ///
    /// Note that this bounds the whole request, including reading the
    /// response body, so it is usually left unset for streaming calls.
    pub timeout: Option<Duration>,
    /// HTTP proxy URL.
    pub proxy: Option<String>,
    /// Additional HTTP headers to send with every request.
    pub headers: Option<HashMap<String, String>>,
}

impl TransportOptions {
    /// Create new default transport options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Set the proxy.
    pub fn with_proxy(mut self, proxy_url: String) -> Self {
        self.proxy = Some(proxy_url);
        self
    }

    /// Add a header.
    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(key, value);
        self
    }
}
