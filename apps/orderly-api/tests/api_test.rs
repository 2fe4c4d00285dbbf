//! End-to-end tests over the HTTP router, backed by an in-memory database
//! and a channel publisher.

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use orderly_api::auth::JwtManager;
use orderly_api::config::DEV_JWT_SECRET;
use orderly_api::publisher::ChannelPublisher;
use orderly_api::{ApiConfig, AppState};
use orderly_core::{OrderEvent, OrderEventKind};
use orderly_db::{Database, DbConfig};
use serde_json::{json, Value};
use tokio::sync::mpsc::UnboundedReceiver;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    events: UnboundedReceiver<OrderEvent>,
    token: String,
}

impl TestApp {
    async fn new() -> Self {
        let config = ApiConfig::from_lookup(|_| None).unwrap();
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let (publisher, events) = ChannelPublisher::new();
        let state = AppState::new(config, db, Arc::new(publisher), None).unwrap();
        let router = orderly_api::app(state);

        let mut app = TestApp {
            router,
            events,
            token: String::new(),
        };

        let (status, body) = app
            .send(Request::post("/token?username=user&password=password").body(Body::empty()).unwrap())
            .await;
        assert_eq!(status, StatusCode::OK);
        app.token = body["access_token"].as_str().unwrap().to_string();
        app
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(AUTHORIZATION, format!("Bearer {}", self.token));

        let request = match body {
            Some(json) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        };

        self.send(request.unwrap()).await
    }

    async fn create_product(&self, name: &str, price: f64) -> i64 {
        let (status, body) = self
            .call(
                Method::POST,
                "/products/",
                Some(json!({"name": name, "description": "", "price": price})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }

    async fn create_order(&self, customer_name: &str, total_amount: f64) -> i64 {
        let (status, body) = self
            .call(
                Method::POST,
                "/orders/",
                Some(json!({"customer_name": customer_name, "total_amount": total_amount})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_i64().unwrap()
    }

    fn drain_events(&mut self) -> Vec<OrderEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

// =============================================================================
// Token endpoint
// =============================================================================

#[tokio::test]
async fn test_login_with_query_params() {
    let app = TestApp::new().await;

    let (status, body) = app
        .send(Request::post("/token?username=user&password=password").body(Body::empty()).unwrap())
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["access_token"].is_string());
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["expires_in"], 1800);
}

#[tokio::test]
async fn test_login_with_form_body() {
    let app = TestApp::new().await;

    let request = Request::post("/token")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("username=user&password=password"))
        .unwrap();
    let (status, body) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["access_token"].is_string());
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let app = TestApp::new().await;

    let response = app
        .router
        .clone()
        .oneshot(Request::post("/token?username=user&password=nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()[WWW_AUTHENTICATE], "Bearer");

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_login_without_credentials() {
    let app = TestApp::new().await;

    let (status, body) = app.send(Request::post("/token").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

// =============================================================================
// Bearer token enforcement
// =============================================================================

#[tokio::test]
async fn test_missing_token_rejected() {
    let app = TestApp::new().await;

    let (status, body) = app.send(Request::get("/orders/").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_bad_tokens_rejected() {
    let app = TestApp::new().await;

    let expired = JwtManager::new(DEV_JWT_SECRET, -1).issue("user").unwrap();
    let forged = JwtManager::new("some-other-secret", 1800).issue("user").unwrap();

    for token in [expired.access_token, forged.access_token, "garbage".to_string()] {
        let request = Request::get("/orders/")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        let (status, _) = app.send(request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_rejected_mutation_has_no_effect() {
    let mut app = TestApp::new().await;

    let request = Request::post("/orders/")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"customer_name": "Jane", "total_amount": 50.0}).to_string()))
        .unwrap();
    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, body) = app.call(Method::GET, "/orders/", None).await;
    assert_eq!(body, json!([]));
    assert!(app.drain_events().is_empty());

    let (status, body) = app
        .call(
            Method::POST,
            "/orders/",
            Some(json!({"customer_name": "Jane", "total_amount": 50.0})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].is_i64());
    assert_eq!(body["status"], "pending");
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn test_create_order() {
    let mut app = TestApp::new().await;

    let (status, body) = app
        .call(
            Method::POST,
            "/orders/",
            Some(json!({"customer_name": "John Doe", "total_amount": 100.0})),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["customer_name"], "John Doe");
    assert_eq!(body["total_amount"], 100.0);
    assert_eq!(body["status"], "pending");
    let id = body["id"].as_i64().unwrap();

    let events = app.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, OrderEventKind::OrderCreated);
    assert_eq!(events[0].message, format!("Order {id} created"));
}

#[tokio::test]
async fn test_create_order_validation() {
    let mut app = TestApp::new().await;

    let (status, _) = app
        .call(
            Method::POST,
            "/orders/",
            Some(json!({"customer_name": "John Doe", "total_amount": -5.0})),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .call(Method::POST, "/orders/", Some(json!({"customer_name": "John Doe"})))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let request = Request::post("/orders/")
        .header(AUTHORIZATION, format!("Bearer {}", app.token))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    assert!(app.drain_events().is_empty());
}

#[tokio::test]
async fn test_read_orders_paging() {
    let app = TestApp::new().await;
    for i in 0..12 {
        app.create_order(&format!("Customer {i}"), 10.0).await;
    }

    let (status, body) = app.call(Method::GET, "/orders/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 10);

    let (_, first) = app.call(Method::GET, "/orders/?skip=0&limit=4", None).await;
    let (_, second) = app.call(Method::GET, "/orders/?skip=4&limit=4", None).await;
    let ids = |page: &Value| -> Vec<i64> {
        page.as_array().unwrap().iter().map(|o| o["id"].as_i64().unwrap()).collect()
    };
    assert!(ids(&second).iter().all(|id| !ids(&first).contains(id)));

    let (_, body) = app.call(Method::GET, "/orders/?skip=10&limit=5", None).await;
    let page = body.as_array().unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0]["customer_name"], "Customer 10");

    let (status, _) = app.call(Method::GET, "/orders/?limit=0", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app.call(Method::GET, "/orders/?skip=-1", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_paths_without_trailing_slash() {
    let app = TestApp::new().await;
    let id = app.create_order("John Doe", 1.0).await;

    let (status, _) = app.call(Method::GET, "/orders", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .call(Method::GET, &format!("/orders/{id}/details"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_read_order() {
    let app = TestApp::new().await;
    let id = app.create_order("John Doe", 100.0).await;

    let (status, body) = app.call(Method::GET, &format!("/orders/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"id": id, "customer_name": "John Doe", "total_amount": 100.0, "status": "pending"})
    );
}

#[tokio::test]
async fn test_missing_order_is_404() {
    let mut app = TestApp::new().await;

    let (status, body) = app.call(Method::GET, "/orders/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"code": "NOT_FOUND", "detail": "Order not found"}));

    let (status, _) = app
        .call(
            Method::PUT,
            "/orders/999",
            Some(json!({"customer_name": "Nobody", "total_amount": 1.0})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.call(Method::DELETE, "/orders/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert!(app.drain_events().is_empty());
}

#[tokio::test]
async fn test_non_numeric_id_is_422() {
    let app = TestApp::new().await;

    let (status, _) = app.call(Method::GET, "/orders/abc", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_update_order() {
    let mut app = TestApp::new().await;
    let id = app.create_order("John Doe", 100.0).await;
    app.drain_events();

    let (status, body) = app
        .call(
            Method::PUT,
            &format!("/orders/{id}"),
            Some(json!({"customer_name": "Jane Doe", "total_amount": 150.0})),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
    assert_eq!(body["customer_name"], "Jane Doe");
    assert_eq!(body["total_amount"], 150.0);
    assert_eq!(body["status"], "pending");

    let events = app.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, OrderEventKind::OrderUpdated);
}

#[tokio::test]
async fn test_delete_order() {
    let mut app = TestApp::new().await;
    let id = app.create_order("John Doe", 100.0).await;
    app.drain_events();

    let (status, body) = app.call(Method::DELETE, &format!("/orders/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Order deleted"}));

    let (status, _) = app.call(Method::GET, &format!("/orders/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.call(Method::DELETE, &format!("/orders/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let kinds: Vec<_> = app.drain_events().into_iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![OrderEventKind::OrderDeleted]);
}

// =============================================================================
// Order details
// =============================================================================

#[tokio::test]
async fn test_create_and_list_order_details() {
    let mut app = TestApp::new().await;
    let product_id = app.create_product("Espresso", 2.5).await;
    let order_id = app.create_order("John Doe", 12.5).await;
    app.drain_events();

    let (status, body) = app
        .call(
            Method::POST,
            &format!("/orders/{order_id}/details/"),
            Some(json!({"product_id": product_id, "quantity": 5})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["product_id"], product_id);
    assert_eq!(body["order_id"], order_id);
    assert_eq!(body["quantity"], 5);
    let detail_id = body["id"].as_i64().unwrap();

    let (status, body) = app
        .call(Method::GET, &format!("/orders/{order_id}/details/"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{"id": detail_id, "order_id": order_id, "product_id": product_id, "quantity": 5}])
    );

    let events = app.drain_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, OrderEventKind::OrderDetailCreated);
    assert_eq!(
        events[0].message,
        format!("Order detail {detail_id} created for order {order_id}")
    );
}

#[tokio::test]
async fn test_order_detail_for_missing_order() {
    let mut app = TestApp::new().await;
    let product_id = app.create_product("Espresso", 2.5).await;

    let (status, body) = app
        .call(
            Method::POST,
            "/orders/999/details/",
            Some(json!({"product_id": product_id, "quantity": 1})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Order not found");

    let (status, _) = app.call(Method::GET, "/orders/999/details/", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert!(app.drain_events().is_empty());
}

#[tokio::test]
async fn test_order_detail_validation() {
    let mut app = TestApp::new().await;
    let product_id = app.create_product("Espresso", 2.5).await;
    let order_id = app.create_order("John Doe", 1.0).await;
    app.drain_events();

    let uri = format!("/orders/{order_id}/details/");

    let (status, body) = app
        .call(Method::POST, &uri, Some(json!({"product_id": 999, "quantity": 1})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Product not found");

    let (status, _) = app
        .call(Method::POST, &uri, Some(json!({"product_id": product_id, "quantity": 0})))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, body) = app.call(Method::GET, &uri, None).await;
    assert_eq!(body, json!([]));
    assert!(app.drain_events().is_empty());
}

#[tokio::test]
async fn test_delete_order_removes_details() {
    let app = TestApp::new().await;
    let product_id = app.create_product("Espresso", 2.5).await;
    let order_id = app.create_order("John Doe", 5.0).await;
    app.call(
        Method::POST,
        &format!("/orders/{order_id}/details/"),
        Some(json!({"product_id": product_id, "quantity": 2})),
    )
    .await;

    let (status, _) = app
        .call(Method::DELETE, &format!("/products/{product_id}"), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .call(Method::DELETE, &format!("/orders/{order_id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    // No line references the product any more
    let (status, body) = app
        .call(Method::DELETE, &format!("/products/{product_id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product deleted");
}

// =============================================================================
// Products
// =============================================================================

#[tokio::test]
async fn test_product_crud() {
    let mut app = TestApp::new().await;

    let (status, body) = app
        .call(
            Method::POST,
            "/products/",
            Some(json!({"name": "Latte", "description": "Milky", "price": 3.75})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["price"], 3.75);
    let id = body["id"].as_i64().unwrap();

    let (status, body) = app
        .call(
            Method::PUT,
            &format!("/products/{id}"),
            Some(json!({"name": "Oat Latte", "price": 4.25})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"id": id, "name": "Oat Latte", "description": "", "price": 4.25})
    );

    let (_, body) = app.call(Method::GET, "/products", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = app.call(Method::DELETE, &format!("/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.call(Method::GET, &format!("/products/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Product not found");

    // Catalogue changes are not order events
    assert!(app.drain_events().is_empty());
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_needs_no_token() {
    let app = TestApp::new().await;

    let (status, body) = app.send(Request::get("/health").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], true);
}
