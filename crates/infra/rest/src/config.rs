//! Client configuration
//!
//! A TOML file with one table per exchange. Every field is optional and falls
//! back to the exchange's built-in conventions:
//!
//! ```toml
//! [kraken]
//! key_file = "~/.config/exchange/kraken.key"
//! timeout_ms = 3000
//!
//! [gdax]
//! base_url = "https://api-public.sandbox.gdax.com"
//! nonce = "millis"
//! ```

use crate::conventions::Conventions;
use crate::transport::TransportConfig;
use auth::{Credentials, NoncePolicy};
use common::{Error, ExchangeId, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Settings for one exchange client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExchangeConfig {
    /// Overrides the base URL (sandbox, proxy gateway, ...)
    pub base_url: Option<String>,
    /// Overrides the version path segment; empty string removes it
    pub version: Option<String>,
    /// Credential file; `~` expands to the home directory
    pub key_file: Option<PathBuf>,
    /// Request timeout in milliseconds
    pub timeout_ms: Option<u64>,
    /// Nonce policy override
    pub nonce: Option<NoncePolicy>,
    /// `User-Agent` override
    pub user_agent: Option<String>,
    /// Proxy URL
    pub proxy: Option<String>,
}

impl ExchangeConfig {
    /// Apply URL and nonce overrides to `conventions`
    pub fn apply(&self, conventions: &mut Conventions) {
        if let Some(base_url) = &self.base_url {
            conventions.base_url.clone_from(base_url);
        }
        if let Some(version) = &self.version {
            conventions.version = (!version.is_empty()).then(|| version.clone());
        }
        if let Some(nonce) = self.nonce {
            conventions.nonce = nonce;
        }
    }

    /// Transport settings derived from this config
    #[must_use]
    pub fn transport_config(&self) -> TransportConfig {
        let defaults = TransportConfig::default();
        TransportConfig {
            timeout: self
                .timeout_ms
                .map_or(defaults.timeout, Duration::from_millis),
            proxy: self.proxy.clone(),
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
        }
    }

    /// Key file path with `~` expanded
    #[must_use]
    pub fn key_file_path(&self) -> Option<PathBuf> {
        self.key_file.as_deref().map(expand_home)
    }

    /// Credentials from the key file, or from the environment when no key
    /// file is configured
    ///
    /// # Errors
    /// Returns `CredentialFormat` if the key file or variables are malformed
    pub fn credentials(&self, exchange: ExchangeId) -> Result<Option<Credentials>> {
        match self.key_file_path() {
            Some(path) => Credentials::from_file_for(exchange, path).map(Some),
            None => Credentials::from_env(exchange),
        }
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir().map_or_else(|| path.to_path_buf(), |home| home.join(rest)),
        Err(_) => path.to_path_buf(),
    }
}

/// Configuration for several exchange clients
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientsConfig {
    exchanges: BTreeMap<ExchangeId, ExchangeConfig>,
}

impl ClientsConfig {
    /// Read and parse a TOML file
    ///
    /// # Errors
    /// Returns `Config` if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config = Self::from_toml_str(&content, &path.display().to_string())?;
        debug!("Loaded {} exchange sections from {}", config.exchanges.len(), path.display());
        Ok(config)
    }

    /// Parse TOML text; `origin` names the source in errors
    ///
    /// # Errors
    /// Returns `Config` on syntax errors, unknown fields or unknown exchanges
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self> {
        let raw: BTreeMap<String, ExchangeConfig> =
            toml::from_str(content).map_err(|e| Error::Config {
                path: origin.to_string(),
                reason: e.to_string(),
            })?;
        let exchanges = raw
            .into_iter()
            .map(|(name, config)| {
                let id = name.parse::<ExchangeId>().map_err(|_| Error::Config {
                    path: origin.to_string(),
                    reason: format!("unknown exchange section [{name}]"),
                })?;
                Ok((id, config))
            })
            .collect::<Result<_>>()?;
        Ok(Self { exchanges })
    }

    /// Settings for `exchange`, defaults when it has no section
    #[must_use]
    pub fn get(&self, exchange: ExchangeId) -> ExchangeConfig {
        self.exchanges.get(&exchange).cloned().unwrap_or_default()
    }

    /// Exchanges with a section
    pub fn exchanges(&self) -> impl Iterator<Item = ExchangeId> + '_ {
        self.exchanges.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
        [kraken]
        timeout_ms = 2500
        nonce = "micros"

        [gdax]
        base_url = "https://api-public.sandbox.gdax.com"
        version = ""
        proxy = "http://127.0.0.1:3128"
    "#;

    #[test]
    fn test_parse_sections() -> Result<()> {
        let config = ClientsConfig::from_toml_str(SAMPLE, "sample")?;
        let exchanges: Vec<_> = config.exchanges().collect();
        assert_eq!(exchanges, vec![ExchangeId::Kraken, ExchangeId::Gdax]);

        let kraken = config.get(ExchangeId::Kraken);
        assert_eq!(kraken.timeout_ms, Some(2500));
        assert_eq!(kraken.transport_config().timeout, Duration::from_millis(2500));

        let mut conventions = Conventions::for_exchange(ExchangeId::Kraken);
        kraken.apply(&mut conventions);
        assert_eq!(conventions.nonce, NoncePolicy::Micros);
        assert_eq!(conventions.base_url, "https://api.kraken.com");
        Ok(())
    }

    #[test]
    fn test_overrides_base_url() -> Result<()> {
        let config = ClientsConfig::from_toml_str(SAMPLE, "sample")?;
        let mut conventions = Conventions::for_exchange(ExchangeId::Gdax);
        config.get(ExchangeId::Gdax).apply(&mut conventions);
        assert_eq!(conventions.base_url, "https://api-public.sandbox.gdax.com");
        assert_eq!(conventions.version, None);
        Ok(())
    }

    #[test]
    fn test_missing_section_defaults() -> Result<()> {
        let config = ClientsConfig::from_toml_str(SAMPLE, "sample")?;
        assert_eq!(config.get(ExchangeId::Gemini), ExchangeConfig::default());
        Ok(())
    }

    #[test]
    fn test_unknown_exchange_rejected() {
        let err = ClientsConfig::from_toml_str("[mtgox]\ntimeout_ms = 1\n", "bad.toml")
            .expect_err("unknown exchange");
        assert!(err.to_string().contains("mtgox"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(ClientsConfig::from_toml_str("[kraken]\ntimeout = 1\n", "bad.toml").is_err());
    }

    #[test]
    fn test_home_expansion() {
        let config = ExchangeConfig {
            key_file: Some(PathBuf::from("~/keys/kraken.key")),
            ..ExchangeConfig::default()
        };
        let path = config.key_file_path().expect("key file configured");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(path, home.join("keys/kraken.key"));
        }

        let absolute = ExchangeConfig {
            key_file: Some(PathBuf::from("/etc/kraken.key")),
            ..ExchangeConfig::default()
        };
        assert_eq!(absolute.key_file_path(), Some(PathBuf::from("/etc/kraken.key")));
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let dir = tempfile::tempdir().map_err(|e| Error::Config {
            path: "tempdir".into(),
            reason: e.to_string(),
        })?;
        let path = dir.path().join("clients.toml");
        fs::write(&path, SAMPLE).map_err(|e| Error::Config {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config = ClientsConfig::load(&path)?;
        assert_eq!(config.exchanges().count(), 2);
        assert!(ClientsConfig::load(dir.path().join("missing.toml")).is_err());
        Ok(())
    }
}
