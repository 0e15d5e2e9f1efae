//! Exchange REST plumbing
//!
//! - [`Conventions`]: base URL, versioning and payload encoding per exchange
//! - [`RequestBuilder`]: turns endpoint + params into a [`SignedRequest`]
//! - [`Transport`]: the network seam, with a blocking `reqwest` implementation
//! - [`ApiClient`]: `query(method, endpoint, params, authenticate)`

#![deny(clippy::all)]
#![allow(clippy::multiple_crate_versions)]

pub mod builder;
pub mod client;
pub mod config;
pub mod conventions;
pub mod transport;

pub use builder::{RequestBuilder, SignedRequest};
pub use client::ApiClient;
pub use config::{ClientsConfig, ExchangeConfig};
pub use conventions::{Conventions, EncodingRule};
pub use transport::{
    HttpTransport, RawResponse, RequestOptions, Transport, TransportConfig, TransportFailure,
};
