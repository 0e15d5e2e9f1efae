//! HTTP transport
//!
//! The client talks to the network only through the [`Transport`] trait, so
//! tests can substitute a recording mock and assert that nothing was sent.

use crate::builder::SignedRequest;
use common::{Error, Method, TransportErrorKind};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default `User-Agent` header
pub const DEFAULT_USER_AGENT: &str = concat!("exchange-rest/", env!("CARGO_PKG_VERSION"));

/// Response as returned by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Vec<(String, String)>,
    /// Response body text
    pub body: String,
}

impl RawResponse {
    /// Response with no headers, mostly for tests
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// True for 2xx statuses
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Deserialize the body as JSON
    ///
    /// # Errors
    /// Returns the `serde_json` error if the body does not match `T`
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.body)
    }

    /// Case-insensitive header lookup
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Transport failure before a response was received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    /// Failure class
    pub kind: TransportErrorKind,
    /// Detail from the HTTP library
    pub message: String,
}

impl TransportFailure {
    /// Create a failure
    #[must_use]
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Per-call transport options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Overrides the transport timeout for this call
    pub timeout: Option<Duration>,
    /// Extra headers appended after the signature headers
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    /// Set the timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Sends assembled requests
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send + Sync {
    /// Execute one request, blocking until a response or failure
    ///
    /// # Errors
    /// Returns a [`TransportFailure`] if no response was received
    fn execute(
        &self,
        request: &SignedRequest,
        options: &RequestOptions,
    ) -> Result<RawResponse, TransportFailure>;
}

/// Settings of the HTTP transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Default timeout for every request
    pub timeout: Duration,
    /// Proxy URL applied to all schemes
    pub proxy: Option<String>,
    /// `User-Agent` header
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            proxy: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Blocking `reqwest` transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a transport from its settings
    ///
    /// # Errors
    /// Returns `Config` if the proxy URL is invalid or the TLS backend fails
    /// to initialise
    pub fn new(config: &TransportConfig) -> common::Result<Self> {
        let mut builder = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone());
        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy).map_err(|e| Error::Config {
                path: "proxy".to_string(),
                reason: e.to_string(),
            })?;
            builder = builder.proxy(proxy);
        }
        let client = builder.build().map_err(|e| Error::Config {
            path: "transport".to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { client })
    }
}

fn classify(error: &reqwest::Error) -> TransportErrorKind {
    if error.is_timeout() {
        TransportErrorKind::Timeout
    } else if error.is_connect() {
        TransportErrorKind::ConnectionFailed
    } else if error.is_body() || error.is_decode() {
        TransportErrorKind::Body
    } else {
        TransportErrorKind::Request
    }
}

impl Transport for HttpTransport {
    fn execute(
        &self,
        request: &SignedRequest,
        options: &RequestOptions,
    ) -> Result<RawResponse, TransportFailure> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in request.headers.iter().chain(&options.headers) {
            builder = builder.header(name, value);
        }
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .map_err(|e| TransportFailure::new(classify(&e), e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
            .collect();
        let body = response
            .text()
            .map_err(|e| TransportFailure::new(TransportErrorKind::Body, e.to_string()))?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
