//! Stream connection tests over the in-memory transport
//!
//! The network test at the bottom dials the production endpoint.
//! Run it with: cargo test -p blocktrade-ws --test stream_tests -- --ignored

use blocktrade_types::{Decimal, Direction, Topic};
use blocktrade_ws::{
    ConnectionConfig, MockHandle, MockTransport, SentFrame, StreamConnection, StreamError,
    TransportError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

fn connect() -> (StreamConnection, blocktrade_ws::CloseSignal, MockHandle) {
    let (sink, source, handle) = MockTransport::pair();
    let config = ConnectionConfig::new().with_queue_capacity(4);
    let (conn, closed) = StreamConnection::with_transport(sink, source, &config);
    (conn, closed, handle)
}

fn trade_json(id: i64) -> String {
    format!(
        r#"{{"id":{id},"order_id":9,"trading_pair_id":1,"symbol":"BTC/EUR","direction":"SELL","amount":"0.1","price":"25000","date":1700000000000,"fee_value":"0.5","trade_value":"2500","maker":true}}"#
    )
}

async fn next<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> T {
    timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("Timed out waiting for handler")
        .expect("Handler channel closed")
}

#[tokio::test]
async fn test_subscribe_wire_format() {
    let (conn, _closed, handle) = connect();

    conn.subscribe_user_orders("tok-1", |_| {}).await.unwrap();
    conn.subscribe_user_trades("tok-1", None, |_| {}).await.unwrap();
    conn.subscribe_ticker(42, |_| {}).await.unwrap();
    conn.unsubscribe_ticker(42).await.unwrap();

    let sent: Vec<serde_json::Value> = handle
        .sent_texts()
        .iter()
        .map(|t| serde_json::from_str(t).unwrap())
        .collect();

    assert_eq!(sent[0], serde_json::json!({"subscribe_user_orders": {"auth_token": "tok-1"}}));
    assert_eq!(sent[1], serde_json::json!({"subscribe_user_trades": {"auth_token": "tok-1"}}));
    assert_eq!(sent[2], serde_json::json!({"subscribe_ticker": {"trading_pair_id": 42}}));
    assert_eq!(sent[3], serde_json::json!({"unsubscribe_ticker": {"trading_pair_id": 42}}));
    assert!(!conn.is_subscribed(Topic::Ticker));
}

#[tokio::test]
async fn test_trades_replay_sends_start_time() {
    let (conn, _closed, handle) = connect();
    let before = chrono::Utc::now().timestamp_millis();

    conn.subscribe_user_trades("tok", Some(Duration::from_secs(3600)), |_| {})
        .await
        .unwrap();

    let sent: serde_json::Value = serde_json::from_str(&handle.sent_texts()[0]).unwrap();
    let start = sent["subscribe_user_trades"]["start_time"].as_i64().unwrap();
    assert!(start <= before - 3_600_000 + 1_000);
    assert!(start >= before - 3_600_000 - 1_000);
}

#[tokio::test]
async fn test_trades_delivered_in_frame_order() {
    let (conn, _closed, handle) = connect();
    let (tx, mut rx) = mpsc::unbounded_channel();

    conn.subscribe_user_trades("tok", None, move |trade| {
        let _ = tx.send(trade);
    })
    .await
    .unwrap();

    handle.push_text(format!(
        r#"{{"message_type":"user_trades","payload":{{"data":[{},{}]}}}}"#,
        trade_json(1),
        trade_json(2)
    ));
    handle.push_text(format!(
        r#"{{"message_type":"user_trades","payload":{{"data":[{}]}}}}"#,
        trade_json(3)
    ));

    let mut ids = Vec::new();
    for _ in 0..3 {
        let trade = next(&mut rx).await.unwrap();
        assert_eq!(trade.direction, Direction::Sell);
        assert!(trade.maker);
        assert_eq!(trade.price, Decimal::from(25000));
        ids.push(trade.id);
    }
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_decode_error_reaches_handler_and_stream_continues() {
    let (conn, _closed, handle) = connect();
    let (tx, mut rx) = mpsc::unbounded_channel();

    conn.subscribe_user_orders("tok", move |order| {
        let _ = tx.send(order);
    })
    .await
    .unwrap();

    handle.push_text(r#"{"message_type":"user_orders","payload":{"data":[{"id":"not-a-number"}]}}"#);
    handle.push_text(r#"{"message_type":"user_orders","payload":{"data":[{"id":5,"customer_order_id":"c-5"}]}}"#);

    assert!(matches!(next(&mut rx).await, Err(StreamError::Decode(_))));
    let order = next(&mut rx).await.unwrap();
    assert_eq!(order.id, 5);
    assert_eq!(order.customer_order_id, "c-5");
}

#[tokio::test]
async fn test_unknown_and_unregistered_topics_are_ignored() {
    let (conn, _closed, handle) = connect();
    let (tx, mut rx) = mpsc::unbounded_channel();

    conn.subscribe_ticker(3, move |update| {
        let _ = tx.send(update.map(|u| u.trading_pair_id));
    })
    .await
    .unwrap();

    handle.push_text(r#"{"message_type":"heartbeat"}"#);
    handle.push_text("garbage");
    handle.push_text(r#"{"message_type":"user_orders","payload":{"data":[{"id":1}]}}"#);
    handle.push_text(r#"{"message_type":"ticker","payload":{"trading_pair_id":3,"data":{"last_price":"1.5"}}}"#);

    assert_eq!(next(&mut rx).await.unwrap(), 3);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_frames_after_unsubscribe_reach_no_handler() {
    let (conn, _closed, handle) = connect();
    let ticker_calls = Arc::new(AtomicUsize::new(0));
    let (tx, mut rx) = mpsc::unbounded_channel();

    let calls = Arc::clone(&ticker_calls);
    conn.subscribe_ticker(3, move |_| {
        calls.fetch_add(1, Ordering::SeqCst);
    })
    .await
    .unwrap();
    conn.subscribe_user_orders("tok", move |order| {
        let _ = tx.send(order.map(|o| o.id));
    })
    .await
    .unwrap();

    conn.unsubscribe_ticker(3).await.unwrap();
    assert!(!conn.is_subscribed(Topic::Ticker));

    handle.push_text(r#"{"message_type":"ticker","payload":{"trading_pair_id":3,"data":{"last_price":"1.5"}}}"#);
    // Frames dispatch in order, so once this order arrives the ticker frame was handled
    handle.push_text(r#"{"message_type":"user_orders","payload":{"data":[{"id":8}]}}"#);

    assert_eq!(next(&mut rx).await.unwrap(), 8);
    assert_eq!(ticker_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_null_order_list_calls_nothing() {
    let (conn, _closed, handle) = connect();
    let (tx, mut rx) = mpsc::unbounded_channel();

    conn.subscribe_user_orders("tok", move |order| {
        let _ = tx.send(order.map(|o| o.id));
    })
    .await
    .unwrap();

    handle.push_text(r#"{"message_type":"user_orders","payload":{"data":null}}"#);
    handle.push_text(r#"{"message_type":"user_orders"}"#);
    handle.push_text(r#"{"message_type":"user_orders","payload":{"data":[{"id":2}]}}"#);

    assert_eq!(next(&mut rx).await.unwrap(), 2);
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_close_signal_fires_once_with_first_error() {
    let (_conn, closed, handle) = connect();

    handle.push_pong();
    handle.push_error(TransportError::ReceiveFailed("connection reset".into()));
    handle.push_close();

    let err = timeout(Duration::from_secs(2), closed).await.unwrap();
    match err {
        StreamError::Transport(TransportError::ReceiveFailed(msg)) => {
            assert_eq!(msg, "connection reset")
        }
        other => panic!("unexpected close reason: {:?}", other),
    }
}

#[tokio::test]
async fn test_frames_before_close_are_dispatched() {
    let (conn, closed, handle) = connect();
    let (tx, mut rx) = mpsc::unbounded_channel();

    conn.subscribe_user_orders("tok", move |order| {
        let _ = tx.send(order.map(|o| o.id));
    })
    .await
    .unwrap();

    for id in 0..10 {
        handle.push_text(format!(
            r#"{{"message_type":"user_orders","payload":{{"data":[{{"id":{id}}}]}}}}"#
        ));
    }
    handle.push_close();

    assert!(matches!(closed.await, StreamError::Closed));
    for id in 0..10 {
        assert_eq!(next(&mut rx).await.unwrap(), id);
    }
}

#[tokio::test]
async fn test_unsubscribe_write_failure_keeps_handler() {
    let (conn, _closed, handle) = connect();
    conn.subscribe_user_trades("tok", None, |_| {}).await.unwrap();

    handle.set_fail_send(true);
    let err = conn.unsubscribe_user_trades().await.unwrap_err();
    assert!(matches!(err, StreamError::Transport(TransportError::SendFailed(_))));
    assert!(conn.is_subscribed(Topic::UserTrades));
}

#[tokio::test(start_paused = true)]
async fn test_heartbeat_pings_until_cancelled() {
    let (conn, _closed, handle) = connect();
    let heartbeat = conn.start_heartbeat(Duration::from_secs(30));

    tokio::time::sleep(Duration::from_secs(29)).await;
    assert_eq!(handle.ping_count(), 0);

    tokio::time::sleep(Duration::from_secs(62)).await;
    assert_eq!(handle.ping_count(), 3);

    heartbeat.cancel();
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(handle.ping_count(), 3);
    assert!(handle.sent().iter().all(|f| *f == SentFrame::Ping));
}

#[tokio::test]
#[ignore = "Makes real WebSocket connection"]
async fn test_live_ticker_stream() {
    let (conn, closed) = StreamConnection::connect(&ConnectionConfig::new())
        .await
        .expect("Should connect");
    let (tx, mut rx) = mpsc::unbounded_channel();

    conn.subscribe_ticker(1, move |update| {
        let _ = tx.send(update);
    })
    .await
    .expect("Should subscribe");

    let update = timeout(Duration::from_secs(30), rx.recv()).await;
    assert!(update.is_ok(), "Timed out waiting for ticker update");

    conn.close().await.ok();
    let _ = timeout(Duration::from_secs(5), closed).await;
}
