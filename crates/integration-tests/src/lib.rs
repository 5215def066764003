//! Integration tests for StorePulse.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and apply migrations
//! cargo run -p storepulse-cli -- migrate
//!
//! # Start the server
//! cargo run -p storepulse-server
//!
//! # Run integration tests (ignored by default)
//! cargo test -p storepulse-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `auth_flow` - Registration, login, and profile management
//! - `sync_api` - Sync trigger, status, and scheduler endpoints
//! - `analytics_api` - Dashboard analytics endpoints
//!
//! Tests register throwaway tenants with unique emails, so they can run
//! repeatedly against the same database.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the server API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("SERVER_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// Shared context for one test: an HTTP client pointed at the server.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

/// A registered throwaway tenant and its session token.
pub struct TestTenant {
    pub email: String,
    pub password: String,
    pub store_name: String,
    pub token: String,
}

impl TestContext {
    /// Build a context from the environment.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be constructed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url(),
        }
    }

    /// Register a fresh tenant with a unique email and store name and
    /// return its session token.
    ///
    /// # Panics
    ///
    /// Panics if registration does not succeed.
    pub async fn register_tenant(&self) -> TestTenant {
        let suffix = Uuid::new_v4().simple().to_string();
        let email = format!("integration-{suffix}@example.com");
        let password = "integration-password".to_string();
        let store_name = format!("itest-{suffix}");

        let resp = self
            .client
            .post(format!("{}/api/auth/register", self.base_url))
            .json(&json!({
                "email": email,
                "password": password,
                "storeName": store_name,
            }))
            .send()
            .await
            .expect("Failed to register tenant");
        assert_eq!(resp.status(), 201, "registration failed");

        let body: Value = resp.json().await.expect("Failed to parse response");
        let token = body["token"]
            .as_str()
            .expect("registration response missing token")
            .to_string();

        TestTenant {
            email,
            password,
            store_name,
            token,
        }
    }

    /// GET an endpoint with a bearer token.
    ///
    /// # Panics
    ///
    /// Panics if the request fails to send.
    pub async fn get_authed(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{path}", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .expect("Request failed")
    }

    /// PUT a JSON body to an endpoint with a bearer token.
    ///
    /// # Panics
    ///
    /// Panics if the request fails to send.
    pub async fn put_authed(&self, path: &str, token: &str, body: &Value) -> reqwest::Response {
        self.client
            .put(format!("{}{path}", self.base_url))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("Request failed")
    }

    /// POST a JSON body to an endpoint with a bearer token.
    ///
    /// # Panics
    ///
    /// Panics if the request fails to send.
    pub async fn post_authed(&self, path: &str, token: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("Request failed")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
