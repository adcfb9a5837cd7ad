use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::SharedState;

pub async fn service_info(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "gateway": state.config.base_url,
    }))
}
