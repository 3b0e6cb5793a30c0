//! HTTP middleware and extractors.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction)
//! 2. CORS
//! 3. `TraceLayer` (request span with status and latency)
//! 4. Request ID (recorded on the span, echoed in the response)

pub mod auth;
pub mod request_id;

pub use auth::AuthUser;
pub use request_id::request_id_middleware;
