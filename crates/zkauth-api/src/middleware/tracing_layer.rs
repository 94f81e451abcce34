//! # Request Tracing
//!
//! `tower_http::trace::TraceLayer` for structured request logging. Applied
//! to the core API routes and to the mounted plugin routes alike.

use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::TraceLayer;

/// Each request gets a span with method, URI, and status code.
pub fn layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}
