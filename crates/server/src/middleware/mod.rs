//! HTTP middleware stack.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. CORS
//! 4. Rate limiting on auth endpoints (governor)

pub mod auth;
pub mod rate_limit;

pub use auth::AuthTenant;
pub use rate_limit::auth_rate_limiter;
