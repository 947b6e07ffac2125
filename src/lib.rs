use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::Method,
    routing::get,
};
use std::error::Error;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::assets::serve_embedded;
use crate::handler::{AppState, healthcheck};

pub mod api;
pub mod assets;
pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod handler;
pub mod model;
pub mod screening;

/// Builds the HTTP application. `max_upload_bytes` bounds request bodies.
pub fn app(state: AppState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(healthcheck))
        .merge(screening::routes())
        .fallback(serve_embedded)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .with_state(state)
}

pub fn unpack_error(err: &(dyn Error)) -> String {
    let mut parts = Vec::new();
    parts.push(err.to_string());
    let mut current = err.source();
    while let Some(source) = current {
        parts.push(source.to_string());
        current = source.source();
    }
    parts.join(": ")
}
