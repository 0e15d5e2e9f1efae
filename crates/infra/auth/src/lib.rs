//! Exchange authentication
//!
//! Credential loading, nonce allocation and the per-exchange request signers.

#![deny(clippy::all)]
#![allow(clippy::multiple_crate_versions)]

pub mod credentials;
pub mod nonce;
pub mod signer;

// One module per exchange signature scheme
pub mod bitfinex;
pub mod bitstamp;
pub mod bittrex;
pub mod gdax;
pub mod gemini;
pub mod kraken;
pub mod poloniex;
pub mod quoine;

pub use credentials::{Credentials, Secret, required_extras};
pub use nonce::{Clock, Nonce, NonceGenerator, NoncePolicy, SystemClock};
pub use signer::{HashAlgo, SignatureArtifacts, Signer, SigningRequest, signer_for};
