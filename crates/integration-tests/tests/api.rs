//! End-to-end HTTP tests against a running Pomelo server.
//!
//! These tests require:
//! - A running `PostgreSQL` database with `POMELO_TEST_DATABASE_URL` set
//! - The server running (cargo run -p pomelo-server) at `POMELO_BASE_URL`
//!
//! Admin-only endpoints are exercised by signing a user up through the API
//! and promoting it to the `admin` scope directly in the database.

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use pomelo_integration_tests::{base_url, test_pool, unique_digits};

/// Sign a fresh user up and return `(client headers token, phone, password)`.
async fn signup(client: &Client) -> (String, String, String) {
    let phone = format!("+1{}", unique_digits(10));
    let password = "correct-horse-battery".to_string();

    let resp = client
        .post(format!("{}/auth/signup", base_url()))
        .json(&json!({
            "nid": unique_digits(10),
            "first_name": "Integration",
            "last_name": "Test",
            "phone": phone,
            "password": password,
            "re_password": password,
        }))
        .send()
        .await
        .expect("signup request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({"phone": phone, "password": password}))
        .send()
        .await
        .expect("login request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("login response not JSON");
    let token = body["access_token"]
        .as_str()
        .expect("missing access_token")
        .to_string();

    (token, phone, password)
}

/// Grant the `admin` scope to a user by phone, bypassing the API.
async fn promote_to_admin(phone: &str) {
    let pool = test_pool().await;
    sqlx::query("UPDATE app_user SET scopes = 'user admin' WHERE phone = $1")
        .bind(phone)
        .execute(&pool)
        .await
        .expect("failed to promote user");
}

/// Create an address for the given token, returning its id.
async fn create_address(client: &Client, token: &str) -> i64 {
    let resp = client
        .post(format!("{}/address", base_url()))
        .header("x-api-key", token)
        .json(&json!({
            "state": "Test State",
            "city": "Test City",
            "description": "42 Test Road",
            "postal_code": "12345",
        }))
        .send()
        .await
        .expect("address create failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.expect("address response not JSON");
    body["id"].as_i64().expect("missing address id")
}

/// Create a product as admin, returning its id.
async fn create_product(client: &Client, admin_token: &str, price: i64, quantity: i64) -> i64 {
    let resp = client
        .post(format!("{}/product", base_url()))
        .header("x-api-key", admin_token)
        .json(&json!({
            "category": "fruit",
            "info": {"name": "pomelo"},
            "price": price,
            "quantity": quantity,
        }))
        .send()
        .await
        .expect("product create failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.expect("product response not JSON");
    body["id"].as_i64().expect("missing product id")
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
#[ignore = "requires running server"]
async fn health_endpoints_respond() {
    let client = Client::new();

    let resp = client
        .get(format!("{}/health", base_url()))
        .send()
        .await
        .expect("health request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{}/health/ready", base_url()))
        .send()
        .await
        .expect("readiness request failed");
    assert_eq!(resp.status(), StatusCode::OK);
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
#[ignore = "requires running server"]
async fn signup_login_me_roundtrip() {
    let client = Client::new();
    let (token, phone, _) = signup(&client).await;

    let resp = client
        .get(format!("{}/auth/me", base_url()))
        .header("x-api-key", &token)
        .send()
        .await
        .expect("me request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("me response not JSON");
    assert_eq!(body["phone"].as_str(), Some(phone.as_str()));
    // The password hash and scopes must never appear in responses.
    assert!(body.get("password_hash").is_none());
    assert!(body.get("scopes").is_none());
}

#[tokio::test]
#[ignore = "requires running server"]
async fn wrong_password_is_unauthorized() {
    let client = Client::new();
    let (_, phone, _) = signup(&client).await;

    let resp = client
        .post(format!("{}/auth/login", base_url()))
        .json(&json!({"phone": phone, "password": "wrong-password"}))
        .send()
        .await
        .expect("login request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = resp.json().await.expect("error body not JSON");
    assert!(body["detail"].is_string());
}

#[tokio::test]
#[ignore = "requires running server"]
async fn missing_token_is_unauthorized() {
    let client = Client::new();

    let resp = client
        .get(format!("{}/auth/me", base_url()))
        .send()
        .await
        .expect("me request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
#[ignore = "requires running server and database"]
async fn product_writes_require_admin_scope() {
    let client = Client::new();
    let (token, _, _) = signup(&client).await;

    let resp = client
        .post(format!("{}/product", base_url()))
        .header("x-api-key", &token)
        .json(&json!({
            "category": "fruit",
            "info": {},
            "price": 100,
            "quantity": 1,
        }))
        .send()
        .await
        .expect("product create failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "requires running server and database"]
async fn product_read_is_public() {
    let client = Client::new();
    let (admin_token, admin_phone, _) = signup(&client).await;
    promote_to_admin(&admin_phone).await;

    let product_id = create_product(&client, &admin_token, 250, 3).await;

    // No token on the read.
    let resp = client
        .get(format!("{}/product/{product_id}", base_url()))
        .send()
        .await
        .expect("product read failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("product response not JSON");
    assert_eq!(body["price"].as_i64(), Some(250));
    assert_eq!(body["quantity"].as_i64(), Some(3));
}

#[tokio::test]
#[ignore = "requires running server"]
async fn unknown_product_is_not_found() {
    let client = Client::new();

    let resp = client
        .get(format!("{}/product/{}", base_url(), i32::MAX))
        .send()
        .await
        .expect("product read failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Orders
// ============================================================================

#[tokio::test]
#[ignore = "requires running server and database"]
async fn order_placement_end_to_end() {
    let client = Client::new();
    let (admin_token, admin_phone, _) = signup(&client).await;
    promote_to_admin(&admin_phone).await;
    let (token, _, _) = signup(&client).await;

    let address_id = create_address(&client, &token).await;
    let product_id = create_product(&client, &admin_token, 500, 10).await;

    // Place an order for 4 units.
    let resp = client
        .post(format!("{}/order", base_url()))
        .header("x-api-key", &token)
        .json(&json!({
            "address_id": address_id,
            "lines": [{"product_id": product_id, "quantity": 4}],
        }))
        .send()
        .await
        .expect("order request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let order: Value = resp.json().await.expect("order response not JSON");
    assert_eq!(order["status"].as_str(), Some("created"));
    assert_eq!(order["lines"][0]["quantity"].as_i64(), Some(4));
    assert_eq!(order["lines"][0]["price"].as_i64(), Some(500));

    // Stock went from 10 to 6, visible through the public read.
    let resp = client
        .get(format!("{}/product/{product_id}", base_url()))
        .send()
        .await
        .expect("product read failed");
    let product: Value = resp.json().await.expect("product response not JSON");
    assert_eq!(product["quantity"].as_i64(), Some(6));

    // The order is readable by its owner.
    let order_id = order["id"].as_i64().expect("missing order id");
    let resp = client
        .get(format!("{}/order/{order_id}", base_url()))
        .header("x-api-key", &token)
        .send()
        .await
        .expect("order read failed");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires running server and database"]
async fn overselling_is_a_conflict() {
    let client = Client::new();
    let (admin_token, admin_phone, _) = signup(&client).await;
    promote_to_admin(&admin_phone).await;
    let (token, _, _) = signup(&client).await;

    let address_id = create_address(&client, &token).await;
    let product_id = create_product(&client, &admin_token, 500, 10).await;

    let resp = client
        .post(format!("{}/order", base_url()))
        .header("x-api-key", &token)
        .json(&json!({
            "address_id": address_id,
            "lines": [{"product_id": product_id, "quantity": 11}],
        }))
        .send()
        .await
        .expect("order request failed");
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let body: Value = resp.json().await.expect("error body not JSON");
    assert!(body["detail"].is_string());

    // Stock is untouched after the failed order.
    let resp = client
        .get(format!("{}/product/{product_id}", base_url()))
        .send()
        .await
        .expect("product read failed");
    let product: Value = resp.json().await.expect("product response not JSON");
    assert_eq!(product["quantity"].as_i64(), Some(10));
}

#[tokio::test]
#[ignore = "requires running server and database"]
async fn foreign_address_is_rejected() {
    let client = Client::new();
    let (admin_token, admin_phone, _) = signup(&client).await;
    promote_to_admin(&admin_phone).await;
    let (alice_token, _, _) = signup(&client).await;
    let (bob_token, _, _) = signup(&client).await;

    let bobs_address = create_address(&client, &bob_token).await;
    let product_id = create_product(&client, &admin_token, 500, 10).await;

    let resp = client
        .post(format!("{}/order", base_url()))
        .header("x-api-key", &alice_token)
        .json(&json!({
            "address_id": bobs_address,
            "lines": [{"product_id": product_id, "quantity": 1}],
        }))
        .send()
        .await
        .expect("order request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Addresses
// ============================================================================

#[tokio::test]
#[ignore = "requires running server"]
async fn address_crud_is_caller_scoped() {
    let client = Client::new();
    let (alice_token, _, _) = signup(&client).await;
    let (bob_token, _, _) = signup(&client).await;

    let address_id = create_address(&client, &alice_token).await;

    // Bob cannot see, update or delete Alice's address.
    let resp = client
        .get(format!("{}/address/{address_id}", base_url()))
        .header("x-api-key", &bob_token)
        .send()
        .await
        .expect("address read failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .delete(format!("{}/address/{address_id}", base_url()))
        .header("x-api-key", &bob_token)
        .send()
        .await
        .expect("address delete failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Alice can.
    let resp = client
        .put(format!("{}/address/{address_id}", base_url()))
        .header("x-api-key", &alice_token)
        .json(&json!({
            "state": "New State",
            "city": "New City",
            "description": "1 New Road",
            "postal_code": "54321",
        }))
        .send()
        .await
        .expect("address update failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .delete(format!("{}/address/{address_id}", base_url()))
        .header("x-api-key", &alice_token)
        .send()
        .await
        .expect("address delete failed");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}
