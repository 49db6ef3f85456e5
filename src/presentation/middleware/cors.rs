//! CORS Middleware Configuration
//!
//! An empty `allowed_origins` list is the explicit development default and
//! allows any origin. A non-empty list is authoritative: entries that fail
//! to parse are logged and dropped, and if none survive the layer allows no
//! cross-origin callers at all rather than falling open.

use axum::http::HeaderValue;
use tower_http::cors::{Any, CorsLayer};

use crate::config::CorsSettings;

/// Create CORS layer from settings
pub fn create_cors_layer(settings: &CorsSettings) -> CorsLayer {
    if settings.allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    CorsLayer::new()
        .allow_origin(parse_origins(&settings.allowed_origins))
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Parse configured origins, warning on and dropping unparsable entries.
fn parse_origins(raw_origins: &[String]) -> Vec<HeaderValue> {
    raw_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Dropping unparsable CORS origin");
                None
            }
        })
        .collect()
}
