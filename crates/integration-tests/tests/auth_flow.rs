//! Integration tests for tenant registration, login, and profile.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The server running (cargo run -p storepulse-server)
//!
//! Run with: cargo test -p storepulse-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::expect_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use storepulse_integration_tests::TestContext;

// ============================================================================
// Registration Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_register_returns_token_and_profile() {
    let ctx = TestContext::new();
    let tenant = ctx.register_tenant().await;

    assert!(!tenant.token.is_empty());

    let resp = ctx.get_authed("/api/auth/profile", &tenant.token).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    assert_eq!(body["tenant"]["email"], tenant.email.as_str());
    assert_eq!(body["tenant"]["storeName"], tenant.store_name.as_str());
    assert_eq!(body["tenant"]["hasAccessToken"], false);
}

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_register_duplicate_email_conflicts() {
    let ctx = TestContext::new();
    let tenant = ctx.register_tenant().await;

    let resp = ctx
        .client
        .post(format!("{}/api/auth/register", ctx.base_url))
        .json(&json!({
            "email": tenant.email,
            "password": "another-password",
            "storeName": format!("{}-other", tenant.store_name),
        }))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);
}

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_register_rejects_short_password() {
    let ctx = TestContext::new();
    let resp = ctx
        .client
        .post(format!("{}/api/auth/register", ctx.base_url))
        .json(&json!({
            "email": "short-password@example.com",
            "password": "short",
            "storeName": "short-password-store",
        }))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// Login Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_login_round_trip() {
    let ctx = TestContext::new();
    let tenant = ctx.register_tenant().await;

    let resp = ctx
        .client
        .post(format!("{}/api/auth/login", ctx.base_url))
        .json(&json!({"email": tenant.email, "password": tenant.password}))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
}

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_login_wrong_password_unauthorized() {
    let ctx = TestContext::new();
    let tenant = ctx.register_tenant().await;

    let resp = ctx
        .client
        .post(format!("{}/api/auth/login", ctx.base_url))
        .json(&json!({"email": tenant.email, "password": "wrong-password"}))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Profile Tests
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_profile_requires_token() {
    let ctx = TestContext::new();
    let resp = ctx
        .client
        .get(format!("{}/api/auth/profile", ctx.base_url))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_update_profile_sets_access_token() {
    let ctx = TestContext::new();
    let tenant = ctx.register_tenant().await;

    let resp = ctx
        .put_authed(
            "/api/auth/profile",
            &tenant.token,
            &json!({"storeAccessToken": "shpat_integration_test"}),
        )
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["tenant"]["hasAccessToken"], true);
    // Store name untouched
    assert_eq!(body["tenant"]["storeName"], tenant.store_name.as_str());
}
