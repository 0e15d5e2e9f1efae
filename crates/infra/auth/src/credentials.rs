//! Credential store
//!
//! Key material is loaded once, when a client is built, and never changes
//! afterwards. Loading is strict about shape (missing lines fail here) but
//! lazy about presence: a client without credentials is valid and only fails
//! when an authenticated request is attempted.

use common::{Error, ExchangeId, Result};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Extra credential fields an exchange needs, in key-file order
#[must_use]
pub const fn required_extras(exchange: ExchangeId) -> &'static [&'static str] {
    match exchange {
        ExchangeId::Bitstamp => &["customer_id"],
        ExchangeId::Gdax => &["passphrase"],
        ExchangeId::Kraken
        | ExchangeId::Bitfinex
        | ExchangeId::Bittrex
        | ExchangeId::Poloniex
        | ExchangeId::Gemini
        | ExchangeId::Quoine => &[],
    }
}

/// API secret, zeroed on drop and never printed
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Secret(String);

impl Secret {
    /// Wrap a secret value
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the secret for signing; do not store or log the result
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// True when the secret is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// Key, secret and exchange-specific extras (passphrase, customer id, ...)
#[derive(Clone)]
pub struct Credentials {
    key: String,
    secret: Secret,
    extra: Vec<String>,
}

impl Credentials {
    /// Build credentials from explicit values
    ///
    /// # Errors
    /// Returns `CredentialFormat` if the key or secret is empty
    pub fn new(key: impl Into<String>, secret: impl Into<String>, extra: Vec<String>) -> Result<Self> {
        Self::validated(key.into(), Secret::new(secret), extra, "explicit credentials")
    }

    fn validated(key: String, secret: Secret, extra: Vec<String>, origin: &str) -> Result<Self> {
        if key.trim().is_empty() {
            return Err(Error::CredentialFormat {
                origin: origin.to_string(),
                reason: "API key is empty".to_string(),
            });
        }
        if secret.is_empty() {
            return Err(Error::CredentialFormat {
                origin: origin.to_string(),
                reason: "API secret is empty".to_string(),
            });
        }
        Ok(Self { key, secret, extra })
    }

    /// Load a key file holding `extras` exchange-specific lines followed by
    /// the key and the secret
    ///
    /// Values are trimmed; blank lines and `#` comments (whole-line, or after
    /// whitespace at the end of a value) are ignored.
    ///
    /// # Errors
    /// Returns `CredentialFormat` if the file cannot be read or does not hold
    /// exactly `extras + 2` values
    pub fn from_file(path: impl AsRef<Path>, extras: usize) -> Result<Self> {
        let path = path.as_ref();
        let origin = format!("key file {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| Error::CredentialFormat {
            origin: origin.clone(),
            reason: e.to_string(),
        })?;

        let mut values: Vec<String> = content.lines().filter_map(strip_comment).collect();
        let expected = extras + 2;
        if values.len() != expected {
            return Err(Error::CredentialFormat {
                origin,
                reason: format!("expected {expected} values, found {}", values.len()),
            });
        }

        let secret = Secret::new(values.pop().unwrap_or_default());
        let key = values.pop().unwrap_or_default();
        debug!("Loaded {} credential values from {}", expected, path.display());
        Self::validated(key, secret, values, &origin)
    }

    /// Load a key file using the extras layout of `exchange`
    ///
    /// # Errors
    /// See [`Credentials::from_file`]
    pub fn from_file_for(exchange: ExchangeId, path: impl AsRef<Path>) -> Result<Self> {
        Self::from_file(path, required_extras(exchange).len())
    }

    /// Read `<EXCHANGE>_API_KEY`, `<EXCHANGE>_API_SECRET` and one
    /// `<EXCHANGE>_API_<FIELD>` per extra field
    ///
    /// Returns `Ok(None)` when neither key nor secret is set.
    ///
    /// # Errors
    /// Returns `CredentialFormat` when the variables are only partly set
    pub fn from_env(exchange: ExchangeId) -> Result<Option<Self>> {
        let prefix = exchange.env_prefix();
        let key = std::env::var(format!("{prefix}_API_KEY")).ok();
        let secret = std::env::var(format!("{prefix}_API_SECRET")).ok();
        let origin = format!("{prefix}_API_* environment variables");

        let (key, secret) = match (key, secret) {
            (None, None) => return Ok(None),
            (Some(key), Some(secret)) => (key, secret),
            _ => {
                return Err(Error::CredentialFormat {
                    origin,
                    reason: "both key and secret must be set".to_string(),
                });
            }
        };

        let extra = required_extras(exchange)
            .iter()
            .map(|field| {
                let var = format!("{prefix}_API_{}", field.to_uppercase());
                std::env::var(&var).map_err(|_| Error::CredentialFormat {
                    origin: origin.clone(),
                    reason: format!("{var} is not set"),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        info!("Loaded {} credentials from environment", exchange);
        Self::validated(key.trim().to_string(), Secret::new(secret.trim()), extra, &origin).map(Some)
    }

    /// API key
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// API secret
    #[must_use]
    pub fn secret(&self) -> &Secret {
        &self.secret
    }

    /// Extra field at `index`
    #[must_use]
    pub fn extra(&self, index: usize) -> Option<&str> {
        self.extra.get(index).map(String::as_str)
    }

    /// All extra fields in order
    #[must_use]
    pub fn extras(&self) -> &[String] {
        &self.extra
    }

    /// First characters of the key, for log lines
    #[must_use]
    pub fn key_hint(&self) -> String {
        let hint: String = self.key.chars().take(4).collect();
        format!("{hint}...")
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key_hint())
            .field("secret", &self.secret)
            .field("extra", &self.extra.len())
            .finish()
    }
}

/// Trim a key-file line and drop comments; `None` for lines without a value
fn strip_comment(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.starts_with('#') {
        return None;
    }
    let value = trimmed
        .find(" #")
        .or_else(|| trimmed.find("\t#"))
        .map_or(trimmed, |idx| &trimmed[..idx])
        .trim();
    (!value.is_empty()).then(|| value.to_string())
}
