use axum::{
    Router,
    routing::{get, post},
};

use super::handler;
use crate::handler::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/keywords", get(handler::list_keywords))
        .route("/analyze", post(handler::analyze))
        .route("/export/csv", post(handler::export_csv))
        .route("/export/xlsx", post(handler::export_xlsx))
}
