//! # Etsy Integration Module
//!
//! Thin client over the Etsy Open API v3 used by the REST handlers. It knows
//! the endpoints the proxy needs and nothing more.
//!
//! ## Layout
//!
//! ```text
//! Handlers (api)
//!      ↓
//! EtsyClient
//!     ├── auth      (PKCE authorize URL, code exchange, refresh)
//!     ├── listings  (draft listing, images, inventory, video)
//!     └── shops     (users/me, shop listings, profiles, policies, taxonomy)
//!      ↓
//! reqwest
//! ```
//!
//! Every request carries the `x-api-key` header; calls on behalf of the seller
//! also carry the bearer access token. Responses outside the 2xx range are
//! turned into [`EtsyError::Http`] holding the upstream status and raw body so
//! the handlers can relay them.

pub mod auth;
pub mod listings;
pub mod shops;

use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;

use crate::{config::Config, error::EtsyError};

#[derive(Debug, Clone)]
pub struct EtsyClient {
    http: Client,
    config: Arc<Config>,
}

impl EtsyClient {
    pub fn new(config: Config) -> Self {
        Self {
            http: Client::new(),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self
            .http
            .request(method, self.url(path))
            .header("x-api-key", self.config.api_key());
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send_json(builder: RequestBuilder) -> Result<Value, EtsyError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(EtsyError::Http { status, body });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| EtsyError::Decode(e.to_string()))
    }

    /// Downloads a remote resource, used for image sources given as URLs.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, EtsyError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EtsyError::Http { status, body });
        }
        Ok(response.bytes().await?.to_vec())
    }
}
