//! Error taxonomy shared by every layer
//!
//! Errors are never swallowed or retried by the library. Each variant names
//! the exchange it came from and, where a request was involved, the endpoint,
//! so a failure can be diagnosed without re-running with verbose logging.

use crate::types::ExchangeId;
use std::fmt;
use thiserror::Error;

/// Result alias used across the workspace
pub type Result<T> = std::result::Result<T, Error>;

/// Classification of transport failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// The configured timeout elapsed before a response arrived
    Timeout,
    /// The connection could not be established
    ConnectionFailed,
    /// The request could not be built or sent
    Request,
    /// The response body could not be read
    Body,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Timeout => "timeout",
            Self::ConnectionFailed => "connection failed",
            Self::Request => "request error",
            Self::Body => "body error",
        };
        f.write_str(name)
    }
}

/// Errors surfaced to callers
#[derive(Debug, Error)]
pub enum Error {
    /// Key material is missing values or malformed
    #[error("Malformed credentials from {origin}: {reason}")]
    CredentialFormat {
        /// Where the credentials came from (file path, environment, ...)
        origin: String,
        /// What is wrong with them
        reason: String,
    },

    /// An authenticated request was issued by a client without credentials
    #[error("{exchange}: {endpoint} requires authentication but no credentials are loaded")]
    Authentication {
        /// Exchange the request was meant for
        exchange: ExchangeId,
        /// Endpoint that was requested
        endpoint: String,
    },

    /// The signer could not produce authentication artifacts
    #[error("{exchange}: signature computation failed: {reason}")]
    SignatureComputation {
        /// Exchange whose signer failed
        exchange: ExchangeId,
        /// Violated precondition or encoding failure
        reason: String,
    },

    /// The HTTP transport failed before a response was received
    #[error("{exchange}: {kind} on {endpoint}: {message}")]
    Transport {
        /// Exchange the request was meant for
        exchange: ExchangeId,
        /// Endpoint that was requested
        endpoint: String,
        /// Failure class
        kind: TransportErrorKind,
        /// Transport-level detail
        message: String,
    },

    /// Non-2xx response, or an error payload reported by the exchange
    #[error("{exchange}: {endpoint} returned HTTP {status}: {body}")]
    ExchangeApi {
        /// Exchange that answered
        exchange: ExchangeId,
        /// Endpoint that was requested
        endpoint: String,
        /// HTTP status code of the response
        status: u16,
        /// Response body, or the extracted error message
        body: String,
    },

    /// A response could not be mapped to the canonical shape
    #[error("{exchange}: cannot normalize {operation} response: {reason}")]
    Normalization {
        /// Exchange that answered
        exchange: ExchangeId,
        /// Canonical operation being normalized
        operation: &'static str,
        /// Unexpected schema detail
        reason: String,
    },

    /// The exchange has no endpoint for a canonical operation
    #[error("{exchange} does not support {operation}")]
    UnsupportedOperation {
        /// Exchange lacking the operation
        exchange: ExchangeId,
        /// Canonical operation name
        operation: &'static str,
    },

    /// An order request is incomplete for its type
    #[error("{exchange}: invalid order: {reason}")]
    InvalidOrder {
        /// Exchange the order was meant for
        exchange: ExchangeId,
        /// Missing or inconsistent field
        reason: String,
    },

    /// A trading pair could not be parsed or mapped
    #[error("Invalid trading pair: {input}")]
    InvalidPair {
        /// Offending input
        input: String,
    },

    /// Configuration file is unreadable or malformed
    #[error("Invalid configuration {path}: {reason}")]
    Config {
        /// Configuration file path
        path: String,
        /// Parse or I/O failure
        reason: String,
    },
}

impl Error {
    /// Exchange the error relates to, if any
    #[must_use]
    pub fn exchange(&self) -> Option<ExchangeId> {
        match self {
            Self::Authentication { exchange, .. }
            | Self::SignatureComputation { exchange, .. }
            | Self::Transport { exchange, .. }
            | Self::ExchangeApi { exchange, .. }
            | Self::Normalization { exchange, .. }
            | Self::UnsupportedOperation { exchange, .. }
            | Self::InvalidOrder { exchange, .. } => Some(*exchange),
            Self::CredentialFormat { .. } | Self::InvalidPair { .. } | Self::Config { .. } => {
                None
            }
        }
    }

    /// True for transport timeouts
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Transport {
                kind: TransportErrorKind::Timeout,
                ..
            }
        )
    }

    /// Shorthand for a normalization failure
    pub fn normalization(
        exchange: ExchangeId,
        operation: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::Normalization {
            exchange,
            operation,
            reason: reason.into(),
        }
    }

    /// Shorthand for a signer precondition failure
    pub fn signature(exchange: ExchangeId, reason: impl Into<String>) -> Self {
        Self::SignatureComputation {
            exchange,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let err = Error::ExchangeApi {
            exchange: ExchangeId::Kraken,
            endpoint: "/0/private/Balance".to_string(),
            status: 403,
            body: "EAPI:Invalid key".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("kraken"));
        assert!(message.contains("/0/private/Balance"));
        assert!(message.contains("403"));
        assert_eq!(err.exchange(), Some(ExchangeId::Kraken));
    }

    #[test]
    fn test_timeout_detection() {
        let err = Error::Transport {
            exchange: ExchangeId::Gdax,
            endpoint: "/products".to_string(),
            kind: TransportErrorKind::Timeout,
            message: "operation timed out".to_string(),
        };
        assert!(err.is_timeout());
        assert!(!Error::InvalidPair { input: "?".into() }.is_timeout());
    }
}
