//! Shared cache-control policies for HTTP handlers.

use actix_web::http::header::{CACHE_CONTROL, HeaderName};

/// Token-bearing responses are private and must be revalidated before
/// reuse.
pub const PRIVATE_NO_CACHE_MUST_REVALIDATE: &str = "private, no-cache, must-revalidate";

/// Probe responses are never cached.
pub const NO_STORE: &str = "no-store";

/// Header tuple for responses that carry a version token.
pub const fn private_no_cache_header() -> (HeaderName, &'static str) {
    (CACHE_CONTROL, PRIVATE_NO_CACHE_MUST_REVALIDATE)
}
