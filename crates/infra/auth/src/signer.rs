//! Request signing
//!
//! A [`Signer`] turns a request description, the client's credentials and a
//! freshly allocated nonce into the headers and extra body fields an exchange
//! expects. Signers are pure: the same inputs always produce the same
//! artifacts, and nothing is sent or logged from here.

use crate::credentials::Credentials;
use crate::nonce::Nonce;
use crate::{bitfinex, bitstamp, bittrex, gdax, gemini, kraken, poloniex, quoine};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use common::{Encoding, ExchangeId, Method, Params, Result};
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};

type HmacSha256 = Hmac<Sha256>;
type HmacSha384 = Hmac<Sha384>;
type HmacSha512 = Hmac<Sha512>;

/// Everything a signer may look at
#[derive(Debug, Clone, Copy)]
pub struct SigningRequest<'a> {
    /// HTTP verb
    pub method: Method,
    /// Absolute URL without query string
    pub url: &'a str,
    /// Path component of `url`, starting with `/`
    pub path: &'a str,
    /// Caller parameters, in order
    pub params: &'a Params,
    /// How the payload travels
    pub encoding: Encoding,
}

impl SigningRequest<'_> {
    /// Path plus query string as it will appear on the wire
    #[must_use]
    pub fn target(&self, payload: &Params) -> String {
        if self.encoding == Encoding::Query && !payload.is_empty() {
            format!("{}?{}", self.path, payload.to_form())
        } else {
            self.path.to_string()
        }
    }
}

/// Output of a signer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignatureArtifacts {
    /// Headers to attach, in order
    pub headers: Vec<(String, String)>,
    /// Fields placed in front of the caller parameters
    pub body_additions: Params,
}

impl SignatureArtifacts {
    /// Look up a header by exact name
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Per-exchange authentication scheme
pub trait Signer: Send + Sync {
    /// Exchange this signer serves
    fn exchange(&self) -> ExchangeId;

    /// Compute authentication artifacts for one request
    ///
    /// # Errors
    /// Returns `SignatureComputation` when the credentials do not satisfy the
    /// scheme (missing extra field, secret not valid base64, ...)
    fn sign(
        &self,
        request: &SigningRequest<'_>,
        credentials: &Credentials,
        nonce: Nonce,
    ) -> Result<SignatureArtifacts>;
}

/// Signer for an exchange
#[must_use]
pub fn signer_for(exchange: ExchangeId) -> Box<dyn Signer> {
    match exchange {
        ExchangeId::Kraken => Box::new(kraken::KrakenSigner),
        ExchangeId::Bitstamp => Box::new(bitstamp::BitstampSigner),
        ExchangeId::Bitfinex => Box::new(bitfinex::BitfinexSigner),
        ExchangeId::Bittrex => Box::new(bittrex::BittrexSigner),
        ExchangeId::Gdax => Box::new(gdax::GdaxSigner),
        ExchangeId::Poloniex => Box::new(poloniex::PoloniexSigner),
        ExchangeId::Gemini => Box::new(gemini::GeminiSigner),
        ExchangeId::Quoine => Box::new(quoine::QuoineSigner),
    }
}

/// HMAC digest family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgo {
    /// HMAC-SHA256
    Sha256,
    /// HMAC-SHA384
    Sha384,
    /// HMAC-SHA512
    Sha512,
}

macro_rules! mac_digest {
    ($mac:ty, $exchange:expr, $key:expr, $message:expr) => {{
        let mut mac = <$mac>::new_from_slice($key)
            .map_err(|e| common::Error::signature($exchange, format!("HMAC key error: {e}")))?;
        mac.update($message);
        Ok(mac.finalize().into_bytes().to_vec())
    }};
}

/// Raw HMAC of `message` under `key`
///
/// # Errors
/// Returns `SignatureComputation` if the key is rejected by the MAC
pub fn hmac_digest(
    exchange: ExchangeId,
    algo: HashAlgo,
    key: &[u8],
    message: &[u8],
) -> Result<Vec<u8>> {
    match algo {
        HashAlgo::Sha256 => mac_digest!(HmacSha256, exchange, key, message),
        HashAlgo::Sha384 => mac_digest!(HmacSha384, exchange, key, message),
        HashAlgo::Sha512 => mac_digest!(HmacSha512, exchange, key, message),
    }
}

/// Secrets some exchanges issue base64 encoded
///
/// # Errors
/// Returns `SignatureComputation` if the secret is not valid base64
pub fn decode_base64_secret(exchange: ExchangeId, secret: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(secret.trim())
        .map_err(|e| common::Error::signature(exchange, format!("secret is not valid base64: {e}")))
}

/// Standard base64 encoding
#[must_use]
pub fn b64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}
