use axum::{Extension, Json, extract::Query};
use serde_json::Value;

use crate::{error::ApiError, server::SharedState, types::ShopListingsQuery};

/// Resolves a valid access token and the shop it acts for.
///
/// A configured `ETSY_SHOP_ID` wins, otherwise the shop of the authorized
/// user is used.
pub(crate) async fn shop_context(state: &SharedState) -> Result<(String, u64), ApiError> {
    if let Some(shop_id) = state.client.config().shop_id {
        let token = state.tokens.get_valid_token(&state.client).await?;
        return Ok((token, shop_id));
    }

    let (token, user) = state.tokens.current_user(&state.client).await?;
    match user["shop_id"].as_u64() {
        Some(shop_id) => Ok((token, shop_id)),
        None => Err(ApiError::BadRequest(
            "the authorized Etsy user has no shop".to_string(),
        )),
    }
}

/// `GET /me`
pub async fn me(Extension(state): Extension<SharedState>) -> Result<Json<Value>, ApiError> {
    let (_, user) = state.tokens.current_user(&state.client).await?;
    Ok(Json(user))
}

/// `GET /shops/listings`
pub async fn shop_listings(
    Query(query): Query<ShopListingsQuery>,
    Extension(state): Extension<SharedState>,
) -> Result<Json<Value>, ApiError> {
    let (token, shop_id) = shop_context(&state).await?;
    let listings = state
        .client
        .shop_listings(&token, shop_id, &query)
        .await
        .inspect_err(|e| {
            tracing::warn!(status = ?e.status(), "fetching shop listings failed: {}", e);
        })?;
    Ok(Json(listings))
}

/// `GET /shops/shipping-profiles`
pub async fn shipping_profiles(
    Extension(state): Extension<SharedState>,
) -> Result<Json<Value>, ApiError> {
    let (token, shop_id) = shop_context(&state).await?;
    let profiles = state
        .client
        .shipping_profiles(&token, shop_id)
        .await
        .inspect_err(|e| {
            tracing::warn!(status = ?e.status(), "fetching shipping profiles failed: {}", e);
        })?;
    Ok(Json(profiles))
}

/// `GET /return-policies`
pub async fn return_policies(
    Extension(state): Extension<SharedState>,
) -> Result<Json<Value>, ApiError> {
    let (token, shop_id) = shop_context(&state).await?;
    let policies = state
        .client
        .return_policies(&token, shop_id)
        .await
        .inspect_err(|e| {
            tracing::warn!(status = ?e.status(), "fetching return policies failed: {}", e);
        })?;
    Ok(Json(policies))
}

/// `GET /etsy/seller-taxonomy/nodes`
pub async fn seller_taxonomy_nodes(
    Extension(state): Extension<SharedState>,
) -> Result<Json<Value>, ApiError> {
    let nodes = state
        .client
        .seller_taxonomy_nodes()
        .await
        .inspect_err(|e| {
            tracing::warn!(status = ?e.status(), "fetching seller taxonomy failed: {}", e);
        })?;
    Ok(Json(nodes))
}
