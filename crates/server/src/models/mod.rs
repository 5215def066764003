//! Domain models for tenants and mirrored store entities.

pub mod customer;
pub mod order;
pub mod product;
pub mod tenant;

pub use customer::NewCustomer;
pub use order::{NewOrder, NewOrderItem};
pub use product::NewProduct;
pub use tenant::{StoreCredentials, Tenant, TenantProfile};
