use std::sync::Arc;

use axum::{Json, response::IntoResponse};
use tracing::info;

use crate::api::APIResponse;
use crate::screening::KeywordSet;

#[derive(Clone)]
pub struct AppState {
    pub keywords: Arc<KeywordSet>,
}

impl AppState {
    pub fn new(keywords: KeywordSet) -> Self {
        AppState {
            keywords: Arc::new(keywords),
        }
    }
}

pub async fn healthcheck() -> impl IntoResponse {
    info!("got healthcheck request");
    Json(APIResponse::new("ok"))
}
