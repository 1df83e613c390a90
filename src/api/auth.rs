use axum::{
    Extension,
    extract::Query,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};

use crate::{error::ApiError, server::SharedState, types::CallbackParams, utils};

/// Starts the PKCE flow and redirects the browser to Etsy's consent page.
pub async fn login(Extension(state): Extension<SharedState>) -> Result<Response, ApiError> {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);
    let oauth_state = utils::generate_state();

    let auth_url = state
        .client
        .authorize_url(&oauth_state, &code_challenge)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    state.sessions.insert(oauth_state, code_verifier).await;
    tracing::info!("redirecting to Etsy for authorization");

    Ok((StatusCode::FOUND, [(header::LOCATION, auth_url)]).into_response())
}

/// Completes the PKCE flow: exchanges the code for a token and stores it.
pub async fn callback(
    Query(params): Query<CallbackParams>,
    Extension(state): Extension<SharedState>,
) -> Result<Html<&'static str>, ApiError> {
    if let Some(error) = params.error {
        let reason = params.error_description.unwrap_or(error);
        tracing::warn!("authorization denied: {}", reason);
        return Err(ApiError::BadRequest(format!("authorization denied: {reason}")));
    }

    let (Some(code), Some(oauth_state)) = (params.code, params.state) else {
        return Err(ApiError::BadRequest(
            "missing code or state parameter".to_string(),
        ));
    };

    let Some(session) = state.sessions.take(&oauth_state).await else {
        tracing::warn!("callback with unknown or expired state");
        return Err(ApiError::InvalidSession);
    };

    match state
        .client
        .exchange_code(&code, &session.code_verifier)
        .await
    {
        Ok(token) => {
            state.tokens.persist(&token).await?;
            tracing::info!(
                access_token = %utils::mask_secret(&token.access_token),
                scope = %token.scope,
                "authorization completed"
            );
            Ok(Html(
                "<h2>Authentication successful.</h2><p>You can close this window.</p>",
            ))
        }
        Err(e) => {
            tracing::warn!(status = ?e.status(), "token exchange failed: {}", e);
            state.sessions.restore(oauth_state, session).await;
            Err(e.into())
        }
    }
}
