//! Error types of the proxy.
//!
//! [`EtsyError`] is produced by the upstream client, [`ApiError`] is what the
//! HTTP handlers return. Upstream failures keep their status code and body so
//! they can be relayed to the caller unchanged.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EtsyError {
    #[error("Etsy responded with {status}: {body}")]
    Http { status: StatusCode, body: String },
    #[error("request to Etsy failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unexpected response from Etsy: {0}")]
    Decode(String),
}

impl EtsyError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            EtsyError::Http { status, .. } => Some(*status),
            EtsyError::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// Raw upstream body, when the failure came with one.
    pub fn body(&self) -> Option<&str> {
        match self {
            EtsyError::Http { body, .. } => Some(body),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),
    #[error("invalid session")]
    InvalidSession,
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("upstream error {status}")]
    Upstream { status: StatusCode, body: String },
    #[error("{0}")]
    Internal(String),
}

impl From<EtsyError> for ApiError {
    fn from(err: EtsyError) -> Self {
        match err {
            EtsyError::Http { status, body } => ApiError::Upstream { status, body },
            other => match other.status() {
                Some(status) => ApiError::Upstream {
                    status,
                    body: other.to_string(),
                },
                None => ApiError::Internal(other.to_string()),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
            }
            ApiError::InvalidSession => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "invalid session" })),
            )
                .into_response(),
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "error": msg }))).into_response()
            }
            ApiError::Upstream { status, body } => {
                let payload = serde_json::from_str::<Value>(&body)
                    .unwrap_or_else(|_| json!({ "error": body }));
                (status, Json(payload)).into_response()
            }
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": msg }))).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_errors_keep_upstream_status() {
        let err: ApiError = EtsyError::Http {
            status: StatusCode::CONFLICT,
            body: r#"{"error":"busy"}"#.to_string(),
        }
        .into();

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn errors_without_status_default_to_500() {
        let err: ApiError = EtsyError::Decode("missing field".to_string()).into();
        assert!(matches!(err, ApiError::Internal(_)));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_maps_to_400() {
        let response = ApiError::Validation(vec!["title is required".into()]).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
