//! Admin API client for the remote commerce platform.
//!
//! Fetches customers, products, and orders as raw JSON pages. Pagination is
//! cursor-based: each page asks for ids strictly greater than the last id of
//! the previous page, until a short or empty page arrives.
//!
//! # API Reference
//!
//! - Base URL: `https://{store}.myshopify.com/admin/api/{version}`
//! - Authentication: access token via `X-Shopify-Access-Token` header
//! - Page size: 250 (the platform maximum)

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use thiserror::Error;

use crate::models::StoreCredentials;
use crate::sync::source::{SourceFactory, StoreSource};

/// Records requested per page, the platform maximum.
const PAGE_SIZE: usize = 250;

/// Access token header name.
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Errors that can occur when talking to the remote Admin API.
#[derive(Debug, Error)]
pub enum StoreApiError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Access token was rejected.
    #[error("Unauthorized: invalid access token")]
    Unauthorized,

    /// Response was not the expected JSON envelope.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Admin API client for one tenant's store.
///
/// Cheap to clone; connection pool and credentials are shared.
#[derive(Clone)]
pub struct StoreClient {
    inner: Arc<StoreClientInner>,
}

struct StoreClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl StoreClient {
    /// Create a client for `https://{store_name}.myshopify.com`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreApiError::Parse`] if the access token is not a valid
    /// header value, [`StoreApiError::Http`] if the HTTP client fails to
    /// build.
    pub fn new(
        store_name: &str,
        access_token: &str,
        api_version: &str,
    ) -> Result<Self, StoreApiError> {
        let base_url = format!("https://{store_name}.myshopify.com/admin/api/{api_version}");
        Self::with_base_url(base_url, access_token)
    }

    /// Create a client against an explicit base URL. Used by tests to point
    /// at a local mock server.
    ///
    /// # Errors
    ///
    /// Same as [`StoreClient::new`].
    pub fn with_base_url(base_url: String, access_token: &str) -> Result<Self, StoreApiError> {
        let mut headers = HeaderMap::new();
        let mut token_value = HeaderValue::from_str(access_token)
            .map_err(|e| StoreApiError::Parse(format!("invalid access token format: {e}")))?;
        token_value.set_sensitive(true);
        headers.insert(ACCESS_TOKEN_HEADER, token_value);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            inner: Arc::new(StoreClientInner { client, base_url }),
        })
    }

    /// Fetch one page of `resource`, unwrapped from its `envelope_key`
    /// object, containing records with ids strictly greater than `since_id`.
    async fn fetch_page(
        &self,
        resource: &str,
        envelope_key: &str,
        since_id: i64,
        extra_query: &[(&str, &str)],
    ) -> Result<Vec<Value>, StoreApiError> {
        let url = format!("{}/{resource}.json", self.inner.base_url);
        let limit = PAGE_SIZE.to_string();
        let since = since_id.to_string();
        let mut query: Vec<(&str, &str)> = vec![("limit", &limit), ("since_id", &since)];
        query.extend_from_slice(extra_query);

        let response = self.inner.client.get(&url).query(&query).send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(StoreApiError::Unauthorized);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let mut envelope: Value = response.json().await?;
        match envelope.get_mut(envelope_key).map(Value::take) {
            Some(Value::Array(records)) => Ok(records),
            _ => Err(StoreApiError::Parse(format!(
                "response missing `{envelope_key}` array"
            ))),
        }
    }

    /// Fetch every page of `resource` and concatenate the records.
    ///
    /// The cursor advances to the numeric `id` of each page's last record;
    /// a record without one ends the walk with the records fetched so far.
    async fn fetch_all(
        &self,
        resource: &str,
        envelope_key: &str,
        extra_query: &[(&str, &str)],
    ) -> Result<Vec<Value>, StoreApiError> {
        let mut records = Vec::new();
        let mut since_id = 0_i64;

        loop {
            let page = self
                .fetch_page(resource, envelope_key, since_id, extra_query)
                .await?;
            let page_len = page.len();
            let last_id = page.last().and_then(|r| r.get("id")).and_then(Value::as_i64);
            records.extend(page);

            tracing::debug!(resource, page_len, total = records.len(), "fetched page");

            if page_len < PAGE_SIZE {
                break;
            }
            match last_id {
                Some(id) => since_id = id,
                None => break,
            }
        }

        Ok(records)
    }

    /// All customers in the store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreApiError`] if any page fails; no partial result is
    /// returned.
    pub async fn fetch_customers(&self) -> Result<Vec<Value>, StoreApiError> {
        self.fetch_all("customers", "customers", &[]).await
    }

    /// All products in the store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreApiError`] if any page fails.
    pub async fn fetch_products(&self) -> Result<Vec<Value>, StoreApiError> {
        self.fetch_all("products", "products", &[]).await
    }

    /// All orders in the store, regardless of status.
    ///
    /// # Errors
    ///
    /// Returns [`StoreApiError`] if any page fails.
    pub async fn fetch_orders(&self) -> Result<Vec<Value>, StoreApiError> {
        self.fetch_all("orders", "orders", &[("status", "any")]).await
    }
}

impl StoreSource for StoreClient {
    fn fetch_customers(
        &self,
    ) -> impl Future<Output = Result<Vec<Value>, StoreApiError>> + Send {
        Self::fetch_customers(self)
    }

    fn fetch_products(&self) -> impl Future<Output = Result<Vec<Value>, StoreApiError>> + Send {
        Self::fetch_products(self)
    }

    fn fetch_orders(&self) -> impl Future<Output = Result<Vec<Value>, StoreApiError>> + Send {
        Self::fetch_orders(self)
    }
}

/// Builds [`StoreClient`]s from tenant credentials.
///
/// Holds the configured API version; tests override the base URL to reach a
/// mock server instead of the real platform.
#[derive(Clone)]
pub struct ShopifyFactory {
    api_version: String,
    base_url_override: Option<String>,
}

impl ShopifyFactory {
    /// Create a factory for the given Admin API version.
    #[must_use]
    pub const fn new(api_version: String) -> Self {
        Self {
            api_version,
            base_url_override: None,
        }
    }

    /// Point every client at a fixed base URL instead of the tenant's store
    /// domain.
    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url_override = Some(base_url);
        self
    }
}

impl SourceFactory for ShopifyFactory {
    type Source = StoreClient;

    fn connect(&self, credentials: &StoreCredentials) -> Result<StoreClient, StoreApiError> {
        match &self.base_url_override {
            Some(base_url) => {
                StoreClient::with_base_url(base_url.clone(), &credentials.access_token)
            }
            None => StoreClient::new(
                &credentials.store_name,
                &credentials.access_token,
                &self.api_version,
            ),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn customer_page(ids: impl IntoIterator<Item = i64>) -> Value {
        let customers: Vec<Value> = ids
            .into_iter()
            .map(|id| json!({"id": id, "email": format!("c{id}@example.com")}))
            .collect();
        json!({"customers": customers})
    }

    async fn client_for(server: &MockServer) -> StoreClient {
        StoreClient::with_base_url(server.uri(), "shpat_test_token").unwrap()
    }

    #[tokio::test]
    async fn test_fetch_customers_single_short_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/customers.json"))
            .and(query_param("limit", "250"))
            .and(query_param("since_id", "0"))
            .and(header(ACCESS_TOKEN_HEADER, "shpat_test_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(customer_page(1..=3)))
            .expect(1)
            .mount(&server)
            .await;

        let records = client_for(&server).await.fetch_customers().await.unwrap();
        assert_eq!(records.len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_paginates_until_short_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/customers.json"))
            .and(query_param("since_id", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(customer_page(1..=250)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/customers.json"))
            .and(query_param("since_id", "250"))
            .respond_with(ResponseTemplate::new(200).set_body_json(customer_page(251..=260)))
            .expect(1)
            .mount(&server)
            .await;

        let records = client_for(&server).await.fetch_customers().await.unwrap();
        assert_eq!(records.len(), 260);
        assert_eq!(records.last().unwrap().get("id").unwrap(), 260);
    }

    #[tokio::test]
    async fn test_fetch_stops_on_empty_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products.json"))
            .and(query_param("since_id", "0"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({
                    "products": (1..=250).map(|id| json!({"id": id})).collect::<Vec<_>>()
                })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/products.json"))
            .and(query_param("since_id", "250"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"products": []})))
            .mount(&server)
            .await;

        let records = client_for(&server).await.fetch_products().await.unwrap();
        assert_eq!(records.len(), 250);
    }

    #[tokio::test]
    async fn test_fetch_stops_when_last_record_has_no_id() {
        let server = MockServer::start().await;
        let full_page: Vec<Value> = (1..250)
            .map(|id| json!({"id": id}))
            .chain(std::iter::once(json!({"title": "no id"})))
            .collect();
        Mock::given(method("GET"))
            .and(path("/products.json"))
            .and(query_param("since_id", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"products": full_page})))
            .expect(1)
            .mount(&server)
            .await;

        let records = client_for(&server).await.fetch_products().await.unwrap();
        assert_eq!(records.len(), 250);
    }

    #[tokio::test]
    async fn test_fetch_orders_requests_any_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/orders.json"))
            .and(query_param("status", "any"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"orders": [{"id": 1, "total_price": "9.99"}]})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let records = client_for(&server).await.fetch_orders().await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_dedicated_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/customers.json"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"errors": "bad token"})))
            .mount(&server)
            .await;

        let err = client_for(&server).await.fetch_customers().await.unwrap_err();
        assert!(matches!(err, StoreApiError::Unauthorized));
    }

    #[tokio::test]
    async fn test_server_error_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/orders.json"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream broke"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.fetch_orders().await.unwrap_err();
        match err {
            StoreApiError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "upstream broke");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_envelope_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/customers.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
            .mount(&server)
            .await;

        let err = client_for(&server).await.fetch_customers().await.unwrap_err();
        assert!(matches!(err, StoreApiError::Parse(_)));
    }
}
