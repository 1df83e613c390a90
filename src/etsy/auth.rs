use chrono::Utc;
use url::Url;

use crate::{
    error::EtsyError,
    etsy::EtsyClient,
    types::{Token, TokenResponse},
};

impl EtsyClient {
    /// Builds the Etsy consent URL the user is redirected to.
    ///
    /// The challenge must be the S256 transform of the verifier kept for
    /// `state`; Etsy echoes `state` back on the callback.
    pub fn authorize_url(&self, state: &str, code_challenge: &str) -> Result<String, EtsyError> {
        let cfg = self.config();
        let mut url = Url::parse(&cfg.oauth_connect_url)
            .map_err(|e| EtsyError::Decode(format!("invalid connect url: {e}")))?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &cfg.keystring)
            .append_pair("redirect_uri", &cfg.redirect_uri)
            .append_pair("scope", &cfg.scopes)
            .append_pair("state", state)
            .append_pair("code_challenge", code_challenge)
            .append_pair("code_challenge_method", "S256");
        Ok(url.into())
    }

    /// Exchanges an authorization code and its PKCE verifier for a token.
    pub async fn exchange_code(&self, code: &str, verifier: &str) -> Result<Token, EtsyError> {
        let cfg = self.config();
        let builder = self.http.post(&cfg.oauth_token_url).form(&[
            ("grant_type", "authorization_code"),
            ("client_id", cfg.keystring.as_str()),
            ("redirect_uri", cfg.redirect_uri.as_str()),
            ("code", code),
            ("code_verifier", verifier),
        ]);

        let token = Self::send_token(builder).await?;
        if token.refresh_token.is_empty() {
            return Err(EtsyError::Decode(
                "token response is missing refresh_token".to_string(),
            ));
        }
        Ok(token)
    }

    /// Exchanges a refresh token for a new token pair.
    ///
    /// When Etsy does not rotate the refresh token the old one is kept.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Token, EtsyError> {
        let cfg = self.config();
        let builder = self.http.post(&cfg.oauth_token_url).form(&[
            ("grant_type", "refresh_token"),
            ("client_id", cfg.keystring.as_str()),
            ("refresh_token", refresh_token),
        ]);

        let mut token = Self::send_token(builder).await?;
        if token.refresh_token.is_empty() {
            token.refresh_token = refresh_token.to_string();
        }
        Ok(token)
    }

    async fn send_token(builder: reqwest::RequestBuilder) -> Result<Token, EtsyError> {
        let json = Self::send_json(builder).await?;
        let res: TokenResponse =
            serde_json::from_value(json).map_err(|e| EtsyError::Decode(e.to_string()))?;

        Ok(Token {
            access_token: res.access_token,
            refresh_token: res.refresh_token.unwrap_or_default(),
            expires_in: res.expires_in.unwrap_or(3600),
            scope: res.scope.unwrap_or_default(),
            obtained_at: Utc::now().timestamp(),
        })
    }
}
