//! Factories for credentials and clients wired to a mock transport

use crate::mocks::MockTransport;
use auth::{Credentials, NonceGenerator, NoncePolicy, required_extras, signer_for};
use common::ExchangeId;
use rest::{ApiClient, Conventions};
use std::sync::Arc;

/// API key used by every factory
pub const TEST_KEY: &str = "AK1";

/// Base64-decodable secret used by every factory
pub const TEST_SECRET: &str = "deadbeef";

/// Placeholder for an extra credential field
#[must_use]
pub fn extra_value(field: &str) -> String {
    match field {
        "customer_id" => "123456".to_string(),
        "passphrase" => "test-passphrase".to_string(),
        other => format!("test-{other}"),
    }
}

/// Valid credentials with every extra field `exchange` needs
///
/// # Panics
/// Never; the constants are non-empty
#[must_use]
pub fn credentials_for(exchange: ExchangeId) -> Credentials {
    let extras = required_extras(exchange).iter().map(|f| extra_value(f)).collect();
    Credentials::new(TEST_KEY, TEST_SECRET, extras).expect("test credentials are valid")
}

/// Key file lines for `exchange`: extras, then key, then secret
#[must_use]
pub fn key_file_lines(exchange: ExchangeId) -> Vec<String> {
    required_extras(exchange)
        .iter()
        .map(|f| extra_value(f))
        .chain([TEST_KEY.to_string(), TEST_SECRET.to_string()])
        .collect()
}

/// Client whose requests go to `transport`, with a counter nonce
#[must_use]
pub fn mock_client(
    exchange: ExchangeId,
    transport: &Arc<MockTransport>,
    credentials: Option<Credentials>,
) -> ApiClient {
    ApiClient::with_parts(
        Conventions::for_exchange(exchange),
        signer_for(exchange),
        credentials,
        NonceGenerator::new(NoncePolicy::Counter),
        transport.clone(),
    )
}

/// Authenticated mock client
#[must_use]
pub fn private_client(exchange: ExchangeId, transport: &Arc<MockTransport>) -> ApiClient {
    mock_client(exchange, transport, Some(credentials_for(exchange)))
}

/// Mock client without credentials
#[must_use]
pub fn public_client(exchange: ExchangeId, transport: &Arc<MockTransport>) -> ApiClient {
    mock_client(exchange, transport, None)
}
