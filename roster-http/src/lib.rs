//! HTTP transport for the reviewer roster
//!
//! Exposes the roster services as JSON endpoints on an axum router, with
//! request ids, tracing spans, panic recovery and a per-request timeout.

pub mod dto;
pub mod error;
pub mod routes;
pub mod server;

use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::Router;
use roster_core::Services;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiErr;
pub use server::{serve, shutdown_on_ctrl_c};

/// Shared state for the axum routes
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
}

/// Build the full application router
///
/// A request that exceeds `request_timeout` is dropped, which rolls back its
/// unit of work, and answered with 408.
pub fn router(services: Services, request_timeout: Duration) -> Router {
    routes::api_routes()
        .with_state(AppState { services })
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CatchPanicLayer::new())
                .layer(TimeoutLayer::new(request_timeout)),
        )
}
