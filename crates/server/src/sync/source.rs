//! Abstraction over the remote platform, so the engine can run against a
//! fake in tests.

use serde_json::Value;

use crate::models::StoreCredentials;
use crate::shopify::StoreApiError;

/// A connected remote store, yielding raw records per entity kind.
pub trait StoreSource: Send + Sync {
    /// Fetch all customers as raw JSON records.
    fn fetch_customers(&self) -> impl Future<Output = Result<Vec<Value>, StoreApiError>> + Send;

    /// Fetch all products as raw JSON records.
    fn fetch_products(&self) -> impl Future<Output = Result<Vec<Value>, StoreApiError>> + Send;

    /// Fetch all orders (any status) as raw JSON records, line items inline.
    fn fetch_orders(&self) -> impl Future<Output = Result<Vec<Value>, StoreApiError>> + Send;
}

/// Builds a [`StoreSource`] for one tenant's credentials.
pub trait SourceFactory: Send + Sync {
    type Source: StoreSource;

    /// Construct a client for the given credentials.
    ///
    /// # Errors
    ///
    /// Returns [`StoreApiError`] if a client cannot be built, e.g. a token
    /// that is not a valid header value.
    fn connect(&self, credentials: &StoreCredentials) -> Result<Self::Source, StoreApiError>;
}
