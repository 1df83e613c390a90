//! Configuration management for the Etsy proxy.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. Values are collected once into a [`Config`] which is
//! then handed to the Etsy client and the HTTP server.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the current working directory
//! 3. `.env` file in the local data directory
//! 4. Application defaults (where applicable)

use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use thiserror::Error;

pub const DEFAULT_SCOPES: &str = "listings_r listings_w shops_r shops_w profile_r transactions_r";
pub const DEFAULT_OAUTH_CONNECT_URL: &str = "https://www.etsy.com/oauth/connect";
pub const DEFAULT_OAUTH_TOKEN_URL: &str = "https://api.etsy.com/v3/public/oauth/token";
pub const DEFAULT_API_URL: &str = "https://api.etsy.com/v3/application";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:3003";
pub const DEFAULT_VIDEO_PATH: &str = "assets/listing-video.mp4";
pub const DEFAULT_IMAGE_UPLOAD_ATTEMPTS: u32 = 3;
pub const DEFAULT_IMAGE_UPLOAD_RETRY_DELAY_MS: u64 = 2000;
pub const DEFAULT_PKCE_SESSION_TTL_SECS: u64 = 600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value `{value}`")]
    Invalid { name: &'static str, value: String },
}

/// Loads environment variables from a `.env` file.
///
/// The current working directory is tried first, then the platform-specific
/// local data directory under `etsy-proxy/.env`. A missing file is not an
/// error since every value may also come from the process environment.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/etsy-proxy/.env`
/// - macOS: `~/Library/Application Support/etsy-proxy/.env`
/// - Windows: `%LOCALAPPDATA%/etsy-proxy/.env`
///
/// # Errors
///
/// Returns an error if the data directory cannot be created or an existing
/// `.env` file cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    if dotenv::dotenv().is_ok() {
        return Ok(());
    }

    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    match dotenv::from_path(&path) {
        Ok(()) => Ok(()),
        Err(dotenv::Error::Io(_)) => Ok(()),
        Err(e) => Err(format!("{}: {}", path.display(), e)),
    }
}

/// Returns the local data directory of the application.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("etsy-proxy");
    path
}

/// Runtime configuration of the proxy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Etsy app keystring, also the OAuth client id.
    pub keystring: String,
    pub shared_secret: Option<String>,
    pub redirect_uri: String,
    pub scopes: String,
    pub shop_id: Option<u64>,
    pub oauth_connect_url: String,
    pub oauth_token_url: String,
    pub api_url: String,
    pub server_addr: SocketAddr,
    pub token_file: PathBuf,
    pub video_path: PathBuf,
    pub image_upload_attempts: u32,
    pub image_upload_retry_delay: Duration,
    pub pkce_session_ttl: Duration,
    /// Where remote images are staged before upload.
    pub image_download_dir: PathBuf,
}

impl Config {
    /// Builds the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Fails when `ETSY_KEYSTRING` or `ETSY_REDIRECT_URI` is missing, or when a
    /// numeric or address value cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let keystring = get("ETSY_KEYSTRING").ok_or(ConfigError::Missing("ETSY_KEYSTRING"))?;
        let redirect_uri =
            get("ETSY_REDIRECT_URI").ok_or(ConfigError::Missing("ETSY_REDIRECT_URI"))?;

        Ok(Self {
            keystring,
            shared_secret: get("ETSY_SHARED_SECRET"),
            redirect_uri,
            scopes: get("ETSY_SCOPES").unwrap_or_else(|| DEFAULT_SCOPES.to_string()),
            shop_id: parse_opt("ETSY_SHOP_ID", get("ETSY_SHOP_ID"))?,
            oauth_connect_url: get("ETSY_OAUTH_CONNECT_URL")
                .unwrap_or_else(|| DEFAULT_OAUTH_CONNECT_URL.to_string()),
            oauth_token_url: get("ETSY_OAUTH_TOKEN_URL")
                .unwrap_or_else(|| DEFAULT_OAUTH_TOKEN_URL.to_string()),
            api_url: trim_slash(get("ETSY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string())),
            server_addr: parse_opt("SERVER_ADDRESS", get("SERVER_ADDRESS"))?
                .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3003))),
            token_file: get("TOKEN_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir().join("tokens.json")),
            video_path: PathBuf::from(
                get("LISTING_VIDEO_PATH").unwrap_or_else(|| DEFAULT_VIDEO_PATH.to_string()),
            ),
            image_upload_attempts: parse_opt("IMAGE_UPLOAD_ATTEMPTS", get("IMAGE_UPLOAD_ATTEMPTS"))?
                .unwrap_or(DEFAULT_IMAGE_UPLOAD_ATTEMPTS)
                .max(1),
            image_upload_retry_delay: Duration::from_millis(
                parse_opt(
                    "IMAGE_UPLOAD_RETRY_DELAY_MS",
                    get("IMAGE_UPLOAD_RETRY_DELAY_MS"),
                )?
                .unwrap_or(DEFAULT_IMAGE_UPLOAD_RETRY_DELAY_MS),
            ),
            pkce_session_ttl: Duration::from_secs(
                parse_opt("PKCE_SESSION_TTL_SECS", get("PKCE_SESSION_TTL_SECS"))?
                    .unwrap_or(DEFAULT_PKCE_SESSION_TTL_SECS),
            ),
            image_download_dir: get("IMAGE_DOWNLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
        })
    }

    /// Value of the `x-api-key` header sent with every Etsy request.
    pub fn api_key(&self) -> String {
        match &self.shared_secret {
            Some(secret) => format!("{}:{}", self.keystring, secret),
            None => self.keystring.clone(),
        }
    }
}

fn parse_opt<T: FromStr>(
    name: &'static str,
    value: Option<String>,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|v| {
            v.trim()
                .parse::<T>()
                .map_err(|_| ConfigError::Invalid { name, value: v })
        })
        .transpose()
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults_are_applied() {
        let cfg = Config::from_lookup(lookup(&[
            ("ETSY_KEYSTRING", "key"),
            ("ETSY_REDIRECT_URI", "http://localhost:3003/auth/callback"),
        ]))
        .unwrap();

        assert_eq!(cfg.scopes, DEFAULT_SCOPES);
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        assert_eq!(cfg.server_addr.to_string(), DEFAULT_SERVER_ADDRESS);
        assert_eq!(cfg.image_upload_attempts, 3);
        assert_eq!(cfg.shop_id, None);
        assert_eq!(cfg.api_key(), "key");
        assert_eq!(cfg.image_download_dir, env::temp_dir());
    }

    #[test]
    fn missing_keystring_is_reported_by_name() {
        let err = Config::from_lookup(lookup(&[("ETSY_REDIRECT_URI", "x")])).unwrap_err();
        assert_eq!(err.to_string(), "ETSY_KEYSTRING must be set");
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("ETSY_KEYSTRING", "key"),
            ("ETSY_REDIRECT_URI", "x"),
            ("ETSY_SHOP_ID", "shop"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "ETSY_SHOP_ID", .. }));
    }

    #[test]
    fn shared_secret_joins_api_key() {
        let cfg = Config::from_lookup(lookup(&[
            ("ETSY_KEYSTRING", "key"),
            ("ETSY_SHARED_SECRET", "secret"),
            ("ETSY_REDIRECT_URI", "x"),
            ("ETSY_API_URL", "http://127.0.0.1:9000/v3/application/"),
        ]))
        .unwrap();
        assert_eq!(cfg.api_key(), "key:secret");
        assert_eq!(cfg.api_url, "http://127.0.0.1:9000/v3/application");
    }
}
