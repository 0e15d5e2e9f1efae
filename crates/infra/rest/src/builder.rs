//! Request builder
//!
//! Assembles the outbound request from an endpoint, caller parameters and,
//! for authenticated calls, the signer's artifacts. The payload placed on the
//! wire is `Params::signed_payload(additions, params)` encoded exactly as the
//! signer encoded it, so order-sensitive signatures stay valid.

use crate::conventions::Conventions;
use auth::{Credentials, Nonce, NonceGenerator, Signer, SigningRequest};
use common::{Encoding, Error, ExchangeId, Method, Params, Result};
use std::fmt;
use tracing::debug;

/// Fully assembled request, ready for the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// HTTP verb
    pub method: Method,
    /// Absolute URL including any query string
    pub url: String,
    /// Path component, used in logs and errors
    pub path: String,
    /// Headers in the order they were added
    pub headers: Vec<(String, String)>,
    /// Encoded body, if any
    pub body: Option<String>,
    /// Payload that was sent (signer additions followed by caller parameters)
    pub params: Params,
    /// Nonce used to sign, for authenticated requests
    pub nonce: Option<Nonce>,
}

impl SignedRequest {
    /// Case-insensitive header lookup
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Builds plain and signed requests for one exchange
pub struct RequestBuilder {
    conventions: Conventions,
    signer: Box<dyn Signer>,
    credentials: Option<Credentials>,
    nonces: NonceGenerator,
}

impl RequestBuilder {
    /// Create a builder; `credentials` may be absent for public-only use
    #[must_use]
    pub fn new(
        conventions: Conventions,
        signer: Box<dyn Signer>,
        credentials: Option<Credentials>,
        nonces: NonceGenerator,
    ) -> Self {
        Self {
            conventions,
            signer,
            credentials,
            nonces,
        }
    }

    /// Exchange this builder targets
    #[must_use]
    pub const fn exchange(&self) -> ExchangeId {
        self.conventions.exchange
    }

    /// Conventions in use
    #[must_use]
    pub const fn conventions(&self) -> &Conventions {
        &self.conventions
    }

    /// True when credentials are loaded
    #[must_use]
    pub const fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Nonce source shared by every signed request of this builder
    #[must_use]
    pub const fn nonces(&self) -> &NonceGenerator {
        &self.nonces
    }

    /// Assemble a request
    ///
    /// # Errors
    /// - `Authentication` if `authenticate` is set and no credentials are
    ///   loaded; no nonce is consumed in that case
    /// - `SignatureComputation` if the signer rejects the credentials
    /// - `Config` if the endpoint does not form a valid URL
    pub fn build(
        &self,
        method: Method,
        endpoint: &str,
        params: &Params,
        authenticate: bool,
    ) -> Result<SignedRequest> {
        let (url, path) = self.conventions.resolve(endpoint)?;
        let encoding = self.conventions.encoding(method, authenticate);

        let (payload, mut headers, nonce) = if authenticate {
            let credentials = self.credentials.as_ref().ok_or_else(|| Error::Authentication {
                exchange: self.exchange(),
                endpoint: path.clone(),
            })?;
            let nonce = self.nonces.next();
            let request = SigningRequest {
                method,
                url: &url,
                path: &path,
                params,
                encoding,
            };
            let artifacts = self.signer.sign(&request, credentials, nonce)?;
            debug!(
                "{}: signed {} {} with nonce {} (key {})",
                self.exchange(),
                method,
                path,
                nonce,
                credentials.key_hint()
            );
            (
                Params::signed_payload(&artifacts.body_additions, params),
                artifacts.headers,
                Some(nonce),
            )
        } else {
            (params.clone(), Vec::new(), None)
        };

        let (url, body) = match encoding {
            Encoding::Query if !payload.is_empty() => (format!("{url}?{}", payload.to_form()), None),
            _ => (url, payload.body(encoding)),
        };

        if body.is_some() && !headers.iter().any(|(k, _)| k.eq_ignore_ascii_case("content-type")) {
            if let Some(content_type) = encoding.content_type() {
                headers.push(("Content-Type".to_string(), content_type.to_string()));
            }
        }

        Ok(SignedRequest {
            method,
            url,
            path,
            headers,
            body,
            params: payload,
            nonce,
        })
    }
}

impl fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("conventions", &self.conventions)
            .field("credentials", &self.credentials)
            .field("nonces", &self.nonces)
            .finish_non_exhaustive()
    }
}
