//! `ApiClient` over the real HTTP transport against a local mock server

use common::{Error, ExchangeId, Method, Params, TransportErrorKind};
use rest::{ApiClient, ExchangeConfig, RawResponse};
use std::path::PathBuf;
use std::time::Duration;
use test_utils::{TEST_KEY, key_file_lines, write_key_file};
use wiremock::matchers::{body_string_contains, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Run one query on a blocking client pointed at `base_url`
///
/// The blocking client owns its own runtime, so it is created, used and
/// dropped on the blocking pool.
async fn query(
    exchange: ExchangeId,
    config: ExchangeConfig,
    http_method: Method,
    endpoint: &'static str,
    params: Params,
    authenticate: bool,
) -> common::Result<RawResponse> {
    tokio::task::spawn_blocking(move || {
        let client = ApiClient::from_config(exchange, &config)?;
        client.query(http_method, endpoint, &params, authenticate)
    })
    .await
    .expect("blocking task panicked")
}

fn config(server: &MockServer, key_file: Option<PathBuf>) -> ExchangeConfig {
    ExchangeConfig {
        base_url: Some(server.uri()),
        key_file,
        timeout_ms: Some(2_000),
        ..ExchangeConfig::default()
    }
}

#[tokio::test]
async fn test_public_get_sends_query_string() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/0/public/Ticker"))
        .and(query_param("pair", "XXBTZEUR"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"error":[],"result":{}}"#))
        .expect(1)
        .mount(&server)
        .await;

    let response = query(
        ExchangeId::Kraken,
        config(&server, None),
        Method::Get,
        "public/Ticker",
        Params::new().with("pair", "XXBTZEUR"),
        false,
    )
    .await
    .expect("public query succeeds");

    assert_eq!(response.status, 200);
    assert_eq!(response.body, r#"{"error":[],"result":{}}"#);
}

#[tokio::test]
async fn test_signed_post_carries_key_signature_and_nonce() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/0/private/Balance"))
        .and(header("API-Key", TEST_KEY))
        .and(header_exists("API-Sign"))
        .and(header("Content-Type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("nonce="))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"error":[],"result":{"ZEUR":"1.0"}}"#))
        .expect(1)
        .mount(&server)
        .await;

    let key_file = write_key_file(&key_file_lines(ExchangeId::Kraken)).expect("key file written");
    let response = query(
        ExchangeId::Kraken,
        config(&server, Some(key_file.path().to_path_buf())),
        Method::Post,
        "private/Balance",
        Params::new(),
        true,
    )
    .await
    .expect("signed query succeeds");

    assert!(response.body.contains("ZEUR"));
}

#[tokio::test]
async fn test_gdax_headers_reach_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/accounts"))
        .and(header("CB-ACCESS-KEY", TEST_KEY))
        .and(header("CB-ACCESS-PASSPHRASE", "test-passphrase"))
        .and(header_exists("CB-ACCESS-SIGN"))
        .and(header_exists("CB-ACCESS-TIMESTAMP"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(1)
        .mount(&server)
        .await;

    let key_file = write_key_file(&key_file_lines(ExchangeId::Gdax)).expect("key file written");
    let response = query(
        ExchangeId::Gdax,
        config(&server, Some(key_file.path().to_path_buf())),
        Method::Get,
        "accounts",
        Params::new(),
        true,
    )
    .await
    .expect("signed query succeeds");

    assert_eq!(response.body, "[]");
}

#[tokio::test]
async fn test_non_success_status_is_exchange_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/ticker/btceur/"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .mount(&server)
        .await;

    let mut config = config(&server, None);
    config.version = Some("v2".to_string());
    let err = query(
        ExchangeId::Bitstamp,
        config,
        Method::Get,
        "ticker/btceur/",
        Params::new(),
        false,
    )
    .await
    .expect_err("404 is an error");

    match err {
        Error::ExchangeApi {
            exchange,
            endpoint,
            status,
            body,
        } => {
            assert_eq!(exchange, ExchangeId::Bitstamp);
            assert_eq!(endpoint, "/v2/ticker/btceur/");
            assert_eq!(status, 404);
            assert_eq!(body, "Not found");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("{}")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = ExchangeConfig {
        timeout_ms: Some(200),
        ..config(&server, None)
    };
    let err = query(
        ExchangeId::Poloniex,
        config,
        Method::Get,
        "public",
        Params::new().with("command", "returnTicker"),
        false,
    )
    .await
    .expect_err("request exceeds its timeout");

    assert!(err.is_timeout(), "{err}");
    assert_eq!(err.exchange(), Some(ExchangeId::Poloniex));
}

#[tokio::test]
async fn test_private_query_without_credentials_never_connects() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = config(&server, None);
    let outcome = tokio::task::spawn_blocking(move || {
        let client = ApiClient::from_config(ExchangeId::Quoine, &config)?;
        if client.has_credentials() {
            return Ok(None);
        }
        client
            .query(Method::Post, "orders", &Params::new(), true)
            .map(Some)
    })
    .await
    .expect("blocking task panicked");

    // Skipped when the environment happens to hold Quoine credentials
    match outcome {
        Ok(None) => {}
        Ok(Some(response)) => panic!("unexpected response {response:?}"),
        Err(e) => assert!(matches!(e, Error::Authentication { .. }), "{e}"),
    }
}

#[tokio::test]
async fn test_refused_connection_is_transport_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let config = ExchangeConfig {
        base_url: Some(uri),
        ..ExchangeConfig::default()
    };
    let err = query(
        ExchangeId::Gemini,
        config,
        Method::Get,
        "symbols",
        Params::new(),
        false,
    )
    .await
    .expect_err("nothing listens");

    assert!(
        matches!(
            err,
            Error::Transport {
                kind: TransportErrorKind::ConnectionFailed | TransportErrorKind::Request,
                ..
            }
        ),
        "{err}"
    );
}
