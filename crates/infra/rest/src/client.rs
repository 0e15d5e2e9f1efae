//! Low-level exchange API client

use crate::builder::{RequestBuilder, SignedRequest};
use crate::config::ExchangeConfig;
use crate::conventions::Conventions;
use crate::transport::{HttpTransport, RawResponse, RequestOptions, Transport, TransportConfig};
use auth::{Credentials, NonceGenerator, Signer, signer_for};
use common::{Error, ExchangeId, Method, Params, Result};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// One client per exchange and credential set
///
/// Safe to share between threads; the nonce generator is the only mutable
/// state and serializes allocation internally.
pub struct ApiClient {
    builder: RequestBuilder,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    /// Client with built-in conventions and the default HTTP transport
    ///
    /// # Errors
    /// Returns `Config` if the HTTP transport cannot be created
    pub fn new(exchange: ExchangeId, credentials: Option<Credentials>) -> Result<Self> {
        let transport = HttpTransport::new(&TransportConfig::default())?;
        Ok(Self::with_transport(exchange, credentials, Arc::new(transport)))
    }

    /// Client with built-in conventions and a custom transport
    #[must_use]
    pub fn with_transport(
        exchange: ExchangeId,
        credentials: Option<Credentials>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let conventions = Conventions::for_exchange(exchange);
        let nonces = NonceGenerator::new(conventions.nonce);
        Self::with_parts(conventions, signer_for(exchange), credentials, nonces, transport)
    }

    /// Client assembled from explicit parts
    #[must_use]
    pub fn with_parts(
        conventions: Conventions,
        signer: Box<dyn Signer>,
        credentials: Option<Credentials>,
        nonces: NonceGenerator,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            builder: RequestBuilder::new(conventions, signer, credentials, nonces),
            transport,
        }
    }

    /// Client configured from a config section
    ///
    /// Credentials come from the configured key file, or from the
    /// environment when none is set.
    ///
    /// # Errors
    /// Returns `CredentialFormat` for malformed credentials and `Config` if
    /// the transport cannot be created
    pub fn from_config(exchange: ExchangeId, config: &ExchangeConfig) -> Result<Self> {
        let mut conventions = Conventions::for_exchange(exchange);
        config.apply(&mut conventions);
        let credentials = config.credentials(exchange)?;
        let transport = HttpTransport::new(&config.transport_config())?;
        let nonces = NonceGenerator::new(conventions.nonce);
        info!(
            "{} client for {} ({})",
            exchange,
            conventions.base_url,
            if credentials.is_some() { "authenticated" } else { "public only" }
        );
        Ok(Self::with_parts(
            conventions,
            signer_for(exchange),
            credentials,
            nonces,
            Arc::new(transport),
        ))
    }

    /// Exchange served by this client
    #[must_use]
    pub const fn exchange(&self) -> ExchangeId {
        self.builder.exchange()
    }

    /// True when credentials are loaded
    #[must_use]
    pub const fn has_credentials(&self) -> bool {
        self.builder.has_credentials()
    }

    /// Request builder in use
    #[must_use]
    pub const fn builder(&self) -> &RequestBuilder {
        &self.builder
    }

    /// Issue a request and return the raw response
    ///
    /// # Errors
    /// - `Authentication` if `authenticate` is set without credentials; the
    ///   transport is not called
    /// - `SignatureComputation` if signing fails
    /// - `Transport` if no response was received
    /// - `ExchangeApi` for non-2xx responses
    pub fn query(
        &self,
        method: Method,
        endpoint: &str,
        params: &Params,
        authenticate: bool,
    ) -> Result<RawResponse> {
        self.query_with(method, endpoint, params, authenticate, &RequestOptions::default())
    }

    /// [`ApiClient::query`] with per-call transport options
    ///
    /// # Errors
    /// See [`ApiClient::query`]
    pub fn query_with(
        &self,
        method: Method,
        endpoint: &str,
        params: &Params,
        authenticate: bool,
        options: &RequestOptions,
    ) -> Result<RawResponse> {
        let request = self.builder.build(method, endpoint, params, authenticate)?;
        self.send(&request, options)
    }

    /// Send an already built request
    ///
    /// # Errors
    /// `Transport` or `ExchangeApi`, as for [`ApiClient::query`]
    pub fn send(&self, request: &SignedRequest, options: &RequestOptions) -> Result<RawResponse> {
        let exchange = self.exchange();
        let started = Instant::now();
        debug!("{}: {} {}", exchange, request.method, request.path);

        let response = self
            .transport
            .execute(request, options)
            .map_err(|failure| {
                warn!("{}: {} {} failed: {}", exchange, request.method, request.path, failure);
                Error::Transport {
                    exchange,
                    endpoint: request.path.clone(),
                    kind: failure.kind,
                    message: failure.message,
                }
            })?;

        let elapsed = started.elapsed();
        if !response.is_success() {
            warn!(
                "{}: {} {} returned {} in {:?}",
                exchange, request.method, request.path, response.status, elapsed
            );
            return Err(Error::ExchangeApi {
                exchange,
                endpoint: request.path.clone(),
                status: response.status,
                body: response.body,
            });
        }

        debug!(
            "{}: {} {} returned {} in {:?}",
            exchange, request.method, request.path, response.status, elapsed
        );
        Ok(response)
    }
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("builder", &self.builder)
            .finish_non_exhaustive()
    }
}
