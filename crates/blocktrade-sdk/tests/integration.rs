//! Integration tests for the Blocktrade SDK
//!
//! REST traffic goes to a wiremock server, the notification stream runs over
//! the in-memory transport.

use blocktrade_sdk::prelude::*;
use blocktrade_ws::{MockHandle, MockTransport};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> BlocktradeClient {
    BlocktradeClient::builder()
        .with_base_url(format!("{}/api/v1", server.uri()))
        .with_credentials(Credentials::new("key", "secret").unwrap())
        .build()
        .unwrap()
}

async fn mount_user(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/api/v1/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_id": 7,
            "email": "trader@example.com",
            "kyc_status": "OK",
            "websocket_auth_token": "ws-token-7",
            "account_type": "INDIVIDUAL"
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn connect(client: &BlocktradeClient) -> (CloseSignal, MockHandle) {
    let (sink, source, handle) = MockTransport::pair();
    let closed = client.connect_stream_with(sink, source).await;
    (closed, handle)
}

// =============================================================================
// Private topics
// =============================================================================

#[tokio::test]
async fn test_subscribe_user_orders_uses_profile_token() {
    let server = MockServer::start().await;
    mount_user(&server, 1).await;

    let client = client(&server);
    let (_closed, handle) = connect(&client).await;
    let (tx, mut rx) = mpsc::unbounded_channel();

    client
        .subscribe_user_orders(move |order| {
            let _ = tx.send(order.map(|o| o.customer_order_id));
        })
        .await
        .unwrap();

    let sent: serde_json::Value = serde_json::from_str(&handle.sent_texts()[0]).unwrap();
    assert_eq!(sent, json!({"subscribe_user_orders": {"auth_token": "ws-token-7"}}));

    handle.push_text(
        r#"{"message_type":"user_orders","payload":{"data":[{"id":1,"customer_order_id":"a"},{"id":2,"customer_order_id":"b"}]}}"#,
    );

    for expected in ["a", "b"] {
        let id = timeout(Duration::from_secs(2), rx.recv()).await.unwrap().unwrap();
        assert_eq!(id.unwrap(), expected);
    }
}

#[tokio::test]
async fn test_failed_token_fetch_registers_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/user"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "invalid signature"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let (_closed, handle) = connect(&client).await;

    let err = client
        .subscribe_user_trades(Some(Duration::from_secs(60)), |_| {})
        .await
        .unwrap_err();

    match err {
        BlocktradeError::Rest(RestError::Api { code, message }) => {
            assert_eq!(code, 401);
            assert_eq!(message, "invalid signature");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(handle.sent().is_empty());
}

#[tokio::test]
async fn test_subscribe_user_trades_with_replay() {
    let server = MockServer::start().await;
    mount_user(&server, 2).await;

    let client = client(&server);
    let (_closed, handle) = connect(&client).await;

    client
        .subscribe_user_trades(Some(Duration::from_secs(600)), |_| {})
        .await
        .unwrap();
    client.unsubscribe_user_trades().await.unwrap();
    client.subscribe_user_trades(None, |_| {}).await.unwrap();

    let texts = handle.sent_texts();
    let first: serde_json::Value = serde_json::from_str(&texts[0]).unwrap();
    assert_eq!(first["subscribe_user_trades"]["auth_token"], "ws-token-7");
    assert!(first["subscribe_user_trades"]["start_time"].as_i64().unwrap() > 0);

    assert_eq!(texts[1], r#"{"unsubscribe_user_trades":{}}"#);

    let third: serde_json::Value = serde_json::from_str(&texts[2]).unwrap();
    assert!(third["subscribe_user_trades"].get("start_time").is_none());
}

// =============================================================================
// Public data
// =============================================================================

#[tokio::test]
async fn test_ticker_stream_and_cached_pair_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/trading_pairs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 5, "base_asset_id": 1, "quote_asset_id": 2, "decimal_precision": 2, "lot_size": "0.0001", "tick_size": "0.01"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let pair = client.trading_pair_by_assets(1, 2).await.unwrap();
    assert_eq!(client.trading_pair(5).await.unwrap(), pair);

    let (_closed, handle) = connect(&client).await;
    let last_prices = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&last_prices);
    let (tx, mut rx) = mpsc::unbounded_channel();

    client
        .subscribe_ticker(pair.id, move |update| {
            let update = update.unwrap();
            sink.lock().unwrap().push(update.data.last_price);
            let _ = tx.send(());
        })
        .await
        .unwrap();

    handle.push_text(r#"{"message_type":"ticker","payload":{"trading_pair_id":5,"data":{"last_price":"100.25","volume":"3"}}}"#);
    timeout(Duration::from_secs(2), rx.recv()).await.unwrap();

    assert_eq!(*last_prices.lock().unwrap(), vec![Some(Decimal::new(10025, 2))]);
}

#[tokio::test]
async fn test_rate_limit_surfaces_default_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/order_book/5"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = client(&server).order_book(5).await.unwrap_err();
    assert!(err.is_rate_limited());
    assert_eq!(err.to_string(), "API Error: Code(429) Too Many Requests");
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn test_reconnect_requires_resubscribe() {
    let server = MockServer::start().await;
    let client = client(&server);
    let old_calls = Arc::new(AtomicUsize::new(0));

    let (closed, handle) = connect(&client).await;
    let calls = Arc::clone(&old_calls);
    client
        .subscribe_ticker(1, move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
        })
        .await
        .unwrap();

    handle.push_close();
    assert!(matches!(closed.await, StreamError::Closed));

    // A new connection starts with an empty registry
    let (closed, handle) = connect(&client).await;
    client.unsubscribe_ticker(1).await.unwrap();
    assert_eq!(handle.sent_texts(), vec![r#"{"unsubscribe_ticker":{"trading_pair_id":1}}"#]);

    // The close signal fires only after earlier frames were dispatched
    handle.push_text(r#"{"message_type":"ticker","payload":{"trading_pair_id":1,"data":{"last_price":"2"}}}"#);
    handle.push_close();
    assert!(matches!(closed.await, StreamError::Closed));

    assert_eq!(old_calls.load(Ordering::SeqCst), 0);
    assert!(server.received_requests().await.unwrap().is_empty());
}
