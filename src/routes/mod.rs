pub mod resource;

use axum::{Router, routing::get};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(resource::latest_payload))
        .route("/info", get(resource::info))
        .route("/cache.json", get(resource::latest_item))
        .route("/latest.json", get(resource::latest_item))
}
