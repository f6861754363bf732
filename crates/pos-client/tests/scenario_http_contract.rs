//! HTTP contract of `HttpOrderApi` against a mock backend.
//!
//! GREEN when:
//! - each call hits the documented method, path and query
//! - float amounts from the backend decode to whole colones
//! - the POST body carries integer amounts and the chosen wait time
//! - a 404 on PATCH surfaces as `ApiError::Status { code: 404 }`
//! - a malformed 2xx body surfaces as `ApiError::Decode`

use std::time::Duration;

use httpmock::prelude::*;
use httpmock::Method::PATCH;
use pos_client::{ApiError, HttpOrderApi, OrderApi};
use pos_schemas::{NewOrder, OrderItem, OrderStatus, PaymentMethod};
use serde_json::json;

fn order_json(id: &str, number: u32, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "order_number": number,
        "items": [{"name": "Combo 8", "quantity": 2, "price": 9000.0}],
        "total_price": 18000.0,
        "payment_method": "CASH",
        "customer_name": "",
        "status": status,
        "created_at": "2025-01-10T14:03:22.123456",
        "estimated_wait_time": 20
    })
}

fn api(server: &MockServer) -> HttpOrderApi {
    HttpOrderApi::new(&server.base_url(), Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn list_orders_decodes_backend_shape() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/orders");
            then.status(200)
                .json_body(json!([order_json("a1", 1, "PENDING"), order_json("b2", 2, "READY")]));
        })
        .await;

    let orders = api(&server).list_orders().await.unwrap();
    m.assert_async().await;

    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].total_price, 18_000);
    assert_eq!(orders[1].status, OrderStatus::Ready);
}

#[tokio::test]
async fn queue_stats_path() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/queue-stats");
            then.status(200)
                .json_body(json!({"total_estimated_wait_time": 24, "active_orders_count": 3}));
        })
        .await;

    let stats = api(&server).queue_stats().await.unwrap();
    m.assert_async().await;
    assert_eq!(stats.total_estimated_wait_time, 24);
    assert_eq!(stats.active_orders_count, 3);
}

#[tokio::test]
async fn update_status_sends_query_param_without_body() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/api/orders/a1/status")
                .query_param("status", "READY");
            then.status(200).json_body(order_json("a1", 1, "READY"));
        })
        .await;

    let order = api(&server)
        .update_status("a1", OrderStatus::Ready)
        .await
        .unwrap();
    m.assert_async().await;
    assert_eq!(order.status, OrderStatus::Ready);
}

#[tokio::test]
async fn update_status_unknown_id_is_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(PATCH).path("/api/orders/missing/status");
            then.status(404).json_body(json!({"detail": "Order not found"}));
        })
        .await;

    let err = api(&server)
        .update_status("missing", OrderStatus::Completed)
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "{err}");
    assert!(err.to_string().contains("Order not found"));
}

#[tokio::test]
async fn create_order_posts_integer_amounts() {
    let server = MockServer::start_async().await;
    let m = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/orders").json_body(json!({
                "items": [{"name": "Combo 8", "quantity": 2, "price": 9000}],
                "total_price": 18000,
                "payment_method": "CASH",
                "customer_name": null,
                "estimated_wait_time": 20
            }));
            then.status(200).json_body(order_json("c3", 5, "PENDING"));
        })
        .await;

    let body = NewOrder {
        items: vec![OrderItem::new("Combo 8", 2, 9_000)],
        total_price: 18_000,
        payment_method: PaymentMethod::Cash,
        customer_name: None,
        estimated_wait_time: Some(20),
    };
    let created = api(&server).create_order(&body).await.unwrap();
    m.assert_async().await;
    assert_eq!(created.order_number, 5);
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/orders");
            then.status(200).body("not json");
        })
        .await;

    let err = api(&server).list_orders().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)), "{err:?}");
}

#[tokio::test]
async fn server_error_carries_status_and_body() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/analytics");
            then.status(500).body("boom");
        })
        .await;

    let err = api(&server).analytics().await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Status {
            code: 500,
            body: "boom".to_string()
        }
    );
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    // Port 9 (discard) on localhost is closed on any sane test host.
    let api = HttpOrderApi::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
    let err = api.list_orders().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "{err:?}");
}
