use crate::{
    config::Config, error, etsy::EtsyClient, management::TokenManager, success, utils,
};

/// Refreshes the stored token from the terminal.
pub async fn refresh(config: Config) {
    let tokens = TokenManager::new(config.token_file.clone());
    let client = EtsyClient::new(config);

    match tokens.refresh(&client).await {
        Ok(token) => success!(
            "Token refreshed ({}), expires in {}s",
            utils::mask_secret(&token.access_token),
            token.expires_in
        ),
        Err(e) => error!("Failed to refresh token: {}", e),
    }
}
