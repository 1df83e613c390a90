use axum::{Extension, Json};

use crate::{error::ApiError, server::SharedState, types::Token};

/// `POST /token/refresh`
pub async fn refresh(Extension(state): Extension<SharedState>) -> Result<Json<Token>, ApiError> {
    let token = state.tokens.refresh(&state.client).await?;
    Ok(Json(token))
}

/// `GET /tokens`
pub async fn tokens(Extension(state): Extension<SharedState>) -> Result<Json<Token>, ApiError> {
    match state.tokens.load().await? {
        Some(token) => Ok(Json(token)),
        None => Err(ApiError::Unauthorized(
            "no token stored, authorize via /auth/login".to_string(),
        )),
    }
}
