//! CORS middleware configuration
//!
//! Only the configured viewer origin may call the API cross-origin.

use axum::http::header;
use axum::http::{HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tracing::{debug, warn};

/// Create a CORS layer permitting a single origin
pub fn cors_layer(client_origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    match client_origin.trim().parse::<HeaderValue>() {
        Ok(origin) => {
            debug!("CORS: Allowing origin {}", client_origin);
            layer.allow_origin(origin)
        }
        Err(_) => {
            warn!("CORS: Invalid client origin {:?}, cross-origin access disabled", client_origin);
            layer
        }
    }
}
