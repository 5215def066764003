//! Integration tests for the sync trigger, status, and job endpoints.
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

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_sync_without_access_token_reports_missing_credentials() {
    let ctx = TestContext::new();
    // Registered without a store access token, so a sync cannot start.
    let tenant = ctx.register_tenant().await;

    let resp = ctx.post_authed("/api/sync", &tenant.token, &json!({})).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);
    assert_eq!(body["missingCredentials"]["accessToken"], true);
    // The store URL is derived at registration, so it is never missing here.
    assert_eq!(body["missingCredentials"]["storeUrl"], false);
}

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_sync_status_before_first_sync() {
    let ctx = TestContext::new();
    let tenant = ctx.register_tenant().await;

    let resp = ctx.get_authed("/api/sync/status", &tenant.token).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    assert_eq!(body["hasSynced"], false);
    assert!(body["lastSyncAt"].is_null());
    assert!(
        body["storeUrl"]
            .as_str()
            .is_some_and(|url| url.contains(&tenant.store_name))
    );
}

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_scheduler_jobs_listed() {
    let ctx = TestContext::new();
    let tenant = ctx.register_tenant().await;

    let resp = ctx.get_authed("/api/sync/jobs", &tenant.token).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse response");
    let jobs = body["jobs"].as_array().expect("jobs missing");
    assert!(jobs.iter().any(|job| job["name"] == "tenant-sync"));
}

#[tokio::test]
#[ignore = "Requires running server and PostgreSQL"]
async fn test_sync_requires_auth() {
    let ctx = TestContext::new();
    let resp = ctx
        .client
        .post(format!("{}/api/sync", ctx.base_url))
        .send()
        .await
        .expect("Request failed");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running server, PostgreSQL, and store credentials"]
async fn test_full_sync_against_real_store() {
    // Exercises a real end-to-end sync. Needs a tenant whose store
    // credentials are valid; set them via the profile endpoint first.
    let store_name = match std::env::var("TEST_STORE_NAME") {
        Ok(name) => name,
        Err(_) => return, // no real store configured
    };
    let access_token = std::env::var("TEST_STORE_ACCESS_TOKEN").expect("token for test store");

    let ctx = TestContext::new();
    let tenant = ctx.register_tenant().await;
    let resp = ctx
        .put_authed(
            "/api/auth/profile",
            &tenant.token,
            &json!({"storeName": store_name, "storeAccessToken": access_token}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ctx.post_authed("/api/sync", &tenant.token, &json!({})).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    assert!(body["stats"]["customers"]["created"].is_number());

    // A completed run stamps last_sync_at.
    let resp = ctx.get_authed("/api/sync/status", &tenant.token).await;
    let body: Value = resp.json().await.expect("Failed to parse response");
    assert_eq!(body["hasSynced"], true);
}
