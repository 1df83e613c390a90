use axum::{
    Extension, Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
};

use crate::{
    api::shops::shop_context,
    error::ApiError,
    listing::{self, ListingPipeline},
    server::SharedState,
    types::{ListingDraft, ListingOutcome},
};

/// `POST /listings`
///
/// Validation runs before anything touches Etsy so a bad request never needs
/// a stored token.
pub async fn create_listing(
    Extension(state): Extension<SharedState>,
    payload: Result<Json<ListingDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<ListingOutcome>), ApiError> {
    let Json(draft) = payload.map_err(|e| ApiError::Validation(vec![e.body_text()]))?;

    if let Err(errors) = listing::validate(&draft) {
        tracing::info!(violations = errors.len(), "listing request rejected");
        return Err(ApiError::Validation(errors));
    }

    let (token, shop_id) = shop_context(&state).await?;
    let outcome = ListingPipeline::new(&state.client, &token, shop_id)
        .run(&draft)
        .await?;

    Ok((StatusCode::CREATED, Json(outcome)))
}
