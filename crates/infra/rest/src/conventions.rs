//! Per-exchange wire conventions
//!
//! Exchanges differ in base URL, path prefix, how parameters travel and which
//! nonce resolution they accept. These differences are data, not behaviour,
//! so one [`RequestBuilder`](crate::RequestBuilder) serves every exchange by
//! reading its `Conventions`.

use auth::NoncePolicy;
use common::{Encoding, Error, ExchangeId, Method, Result};
use url::Url;

/// How a payload is encoded for a given verb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingRule {
    /// Same encoding for every verb
    Fixed(Encoding),
    /// Verbs without a body use `read`, the rest use `write`
    ByMethod {
        /// Encoding for GET/DELETE
        read: Encoding,
        /// Encoding for POST/PUT
        write: Encoding,
    },
}

impl EncodingRule {
    /// Encoding for `method`
    #[must_use]
    pub const fn resolve(&self, method: Method) -> Encoding {
        match self {
            Self::Fixed(encoding) => *encoding,
            Self::ByMethod { read, write } => {
                if method.has_body() {
                    *write
                } else {
                    *read
                }
            }
        }
    }
}

const QUERY_OR_FORM: EncodingRule = EncodingRule::ByMethod {
    read: Encoding::Query,
    write: Encoding::Form,
};

const QUERY_OR_JSON: EncodingRule = EncodingRule::ByMethod {
    read: Encoding::Query,
    write: Encoding::Json,
};

/// Wire conventions of one exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conventions {
    /// Exchange these conventions describe
    pub exchange: ExchangeId,
    /// Scheme, host and fixed path prefix
    pub base_url: String,
    /// Version segment inserted between base URL and endpoint
    pub version: Option<String>,
    /// Encoding of unauthenticated requests
    pub public: EncodingRule,
    /// Encoding of signed requests
    pub private: EncodingRule,
    /// Nonce resolution the exchange expects
    pub nonce: NoncePolicy,
}

impl Conventions {
    /// Built-in conventions for `exchange`
    #[must_use]
    pub fn for_exchange(exchange: ExchangeId) -> Self {
        let (base_url, version, public, private, nonce) = match exchange {
            ExchangeId::Kraken => (
                "https://api.kraken.com",
                Some("0"),
                QUERY_OR_FORM,
                EncodingRule::Fixed(Encoding::Form),
                NoncePolicy::Millis,
            ),
            ExchangeId::Bitstamp => (
                "https://www.bitstamp.net/api",
                Some("v2"),
                QUERY_OR_FORM,
                EncodingRule::Fixed(Encoding::Form),
                NoncePolicy::Millis,
            ),
            ExchangeId::Bitfinex => (
                "https://api.bitfinex.com",
                Some("v1"),
                QUERY_OR_JSON,
                EncodingRule::Fixed(Encoding::Json),
                NoncePolicy::Micros,
            ),
            ExchangeId::Bittrex => (
                "https://bittrex.com/api",
                Some("v1.1"),
                EncodingRule::Fixed(Encoding::Query),
                EncodingRule::Fixed(Encoding::Query),
                NoncePolicy::Millis,
            ),
            ExchangeId::Gdax => (
                "https://api.gdax.com",
                None,
                QUERY_OR_JSON,
                QUERY_OR_JSON,
                NoncePolicy::Millis,
            ),
            ExchangeId::Poloniex => (
                "https://poloniex.com",
                None,
                QUERY_OR_FORM,
                EncodingRule::Fixed(Encoding::Form),
                NoncePolicy::Millis,
            ),
            ExchangeId::Gemini => (
                "https://api.gemini.com",
                Some("v1"),
                QUERY_OR_JSON,
                EncodingRule::Fixed(Encoding::HeaderOnly),
                NoncePolicy::Millis,
            ),
            ExchangeId::Quoine => (
                "https://api.quoine.com",
                None,
                QUERY_OR_JSON,
                QUERY_OR_JSON,
                NoncePolicy::Millis,
            ),
        };

        Self {
            exchange,
            base_url: base_url.to_string(),
            version: version.map(str::to_string),
            public,
            private,
            nonce,
        }
    }

    /// Encoding for a request
    #[must_use]
    pub const fn encoding(&self, method: Method, authenticate: bool) -> Encoding {
        if authenticate {
            self.private.resolve(method)
        } else {
            self.public.resolve(method)
        }
    }

    /// Absolute URL and its path component for `endpoint`
    ///
    /// # Errors
    /// Returns `Config` if the base URL does not form a valid URL
    pub fn resolve(&self, endpoint: &str) -> Result<(String, String)> {
        let mut url = self.base_url.trim_end_matches('/').to_string();
        if let Some(version) = self.version.as_deref().filter(|v| !v.is_empty()) {
            url.push('/');
            url.push_str(version.trim_matches('/'));
        }
        url.push('/');
        url.push_str(endpoint.trim_start_matches('/'));

        let parsed = Url::parse(&url).map_err(|e| Error::Config {
            path: format!("{} base_url", self.exchange),
            reason: format!("'{url}' is not a valid URL: {e}"),
        })?;
        Ok((url, parsed.path().to_string()))
    }
}
