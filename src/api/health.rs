use axum::{Extension, response::Json};
use serde_json::{Value, json};

use crate::server::SharedState;

pub async fn health(Extension(state): Extension<SharedState>) -> Json<Value> {
    let authorized = matches!(state.tokens.load().await, Ok(Some(_)));
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "authorized": authorized
    }))
}
