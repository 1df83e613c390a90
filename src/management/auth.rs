use std::path::{Path, PathBuf};

use axum::http::StatusCode;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::{
    error::{ApiError, EtsyError},
    etsy::EtsyClient,
    types::Token,
    utils,
};

/// Key under which the single token record lives in the token file.
pub const TOKEN_KEY: &str = "etsy";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("token file i/o failed: {0}")]
    IoError(#[from] std::io::Error),
    #[error("token file is corrupt: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// Owns the token file and the token lifecycle around it.
///
/// The file holds a JSON object; the token is stored under [`TOKEN_KEY`] and
/// other keys are left untouched on write. Writes are serialized through a
/// mutex, the last writer wins.
pub struct TokenManager {
    path: PathBuf,
    lock: Mutex<()>,
}

impl TokenManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Option<Token>, StoreError> {
        let _guard = self.lock.lock().await;
        let Some(doc) = self.read_document().await? else {
            return Ok(None);
        };
        match doc.get(TOKEN_KEY) {
            Some(value) if !value.is_null() => Ok(Some(serde_json::from_value(value.clone())?)),
            _ => Ok(None),
        }
    }

    pub async fn persist(&self, token: &Token) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut doc = self.read_document().await?.unwrap_or_default();
        doc.insert(TOKEN_KEY.to_string(), serde_json::to_value(token)?);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                async_fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_string_pretty(&Value::Object(doc))?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    async fn read_document(&self) -> Result<Option<Map<String, Value>>, StoreError> {
        let content = match async_fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<Value>(&content)? {
            Value::Object(map) => Ok(Some(map)),
            _ => Ok(None),
        }
    }

    /// Exchanges the stored refresh token and overwrites the stored record.
    pub async fn refresh(&self, client: &EtsyClient) -> Result<Token, ApiError> {
        let current = self.load().await?.ok_or_else(no_token)?;
        if current.refresh_token.trim().is_empty() {
            return Err(ApiError::Unauthorized(
                "no refresh token stored, authorize again via /auth/login".to_string(),
            ));
        }

        let token = client.refresh(&current.refresh_token).await.map_err(|e| {
            tracing::warn!(status = ?e.status(), "token refresh failed: {}", e);
            ApiError::from(e)
        })?;
        self.persist(&token).await?;
        tracing::info!(
            access_token = %utils::mask_secret(&token.access_token),
            expires_in = token.expires_in,
            "token refreshed"
        );
        Ok(token)
    }

    /// Returns an access token that Etsy currently accepts.
    ///
    /// The stored token is probed against `GET /users/me`; a probe reporting an
    /// invalid or expired token triggers [`TokenManager::refresh`].
    pub async fn get_valid_token(&self, client: &EtsyClient) -> Result<String, ApiError> {
        let (token, _) = self.probe(client).await?;
        Ok(token)
    }

    /// Like [`TokenManager::get_valid_token`] but also returns the `users/me` body.
    pub async fn current_user(&self, client: &EtsyClient) -> Result<(String, Value), ApiError> {
        match self.probe(client).await? {
            (token, Some(user)) => Ok((token, user)),
            (token, None) => {
                let user = client.me(&token).await?;
                Ok((token, user))
            }
        }
    }

    async fn probe(&self, client: &EtsyClient) -> Result<(String, Option<Value>), ApiError> {
        let stored = self.load().await?.ok_or_else(no_token)?;

        match client.me(&stored.access_token).await {
            Ok(user) => Ok((stored.access_token, Some(user))),
            Err(e) if is_invalid_token(&e) => {
                tracing::info!("stored access token rejected, refreshing");
                let token = self.refresh(client).await?;
                Ok((token.access_token, None))
            }
            Err(e) => {
                tracing::warn!(status = ?e.status(), "token probe failed: {}", e);
                Err(e.into())
            }
        }
    }
}

fn no_token() -> ApiError {
    ApiError::Unauthorized("no token stored, authorize via /auth/login".to_string())
}

/// Whether an upstream failure means the access token is invalid or expired.
pub fn is_invalid_token(err: &EtsyError) -> bool {
    if err.status() == Some(StatusCode::UNAUTHORIZED) {
        return true;
    }
    err.body().is_some_and(|body| {
        let body = body.to_ascii_lowercase();
        body.contains("invalid_token") || body.contains("expired")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(access: &str) -> Token {
        Token {
            access_token: access.to_string(),
            refresh_token: "refresh".to_string(),
            expires_in: 3600,
            scope: "listings_w".to_string(),
            obtained_at: 1_700_000_000,
        }
    }

    #[tokio::test]
    async fn load_of_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let manager = TokenManager::new(dir.path().join("tokens.json"));
        assert!(manager.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn persist_replaces_record_and_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/tokens.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"other": {"keep": true}}"#).unwrap();

        let manager = TokenManager::new(&path);
        manager.persist(&token("first")).await.unwrap();
        manager.persist(&token("second")).await.unwrap();

        assert_eq!(manager.load().await.unwrap(), Some(token("second")));
        let doc: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["other"]["keep"], Value::Bool(true));
    }

    #[test]
    fn invalid_token_detection() {
        let unauthorized = EtsyError::Http {
            status: StatusCode::UNAUTHORIZED,
            body: "{}".to_string(),
        };
        let expired_body = EtsyError::Http {
            status: StatusCode::BAD_REQUEST,
            body: r#"{"error":"invalid_token","error_description":"access token is expired"}"#
                .to_string(),
        };
        let other = EtsyError::Http {
            status: StatusCode::FORBIDDEN,
            body: r#"{"error":"insufficient scope"}"#.to_string(),
        };

        assert!(is_invalid_token(&unauthorized));
        assert!(is_invalid_token(&expired_body));
        assert!(!is_invalid_token(&other));
    }
}
