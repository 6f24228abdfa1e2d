//! HTTP error response conversion
//!
//! Every failure leaves the API as the same JSON envelope: `{"error": ...}`
//! plus upstream diagnostics for 502s and, outside production, `details` for
//! internal faults. Handlers return `HttpRelayError` (or convert a
//! `RelayError` into one) and never build error bodies by hand.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use zipdrop_core::{ErrorMetadata, LogLevel, RelayError, UpstreamFailure};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Upstream diagnostics (`status`, `contentType`, `bodyPreview`, `details`, `raw`).
    #[serde(flatten)]
    pub upstream: Option<UpstreamFailure>,
    /// Internal error chain; never set in production.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            upstream: None,
            details: None,
        }
    }
}

/// Wrapper type for RelayError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for RelayError (external type from zipdrop-core)
///
/// `is_production` comes from the loaded `Config`; it decides whether
/// internal `details` reach the client.
#[derive(Debug)]
pub struct HttpRelayError {
    pub error: RelayError,
    pub is_production: bool,
}

impl HttpRelayError {
    pub fn new(error: RelayError, is_production: bool) -> Self {
        Self {
            error,
            is_production,
        }
    }

    /// Wrap an unexpected failure as an internal error.
    pub fn internal(err: anyhow::Error, is_production: bool) -> Self {
        Self::new(RelayError::Internal(format!("{:#}", err)), is_production)
    }
}

fn log_error(error: &RelayError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

/// Build the JSON body for `error`.
pub fn error_body(error: &RelayError, is_production: bool) -> ErrorResponse {
    let mut body = ErrorResponse::new(error.client_message());
    body.upstream = error.upstream().cloned();
    if error.is_sensitive() && !is_production {
        body.details = Some(error.detailed_message());
    }
    body
}

impl IntoResponse for HttpRelayError {
    fn into_response(self) -> Response {
        let relay_error = &self.error;

        let status = StatusCode::from_u16(relay_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(relay_error);

        let body = error_body(relay_error, self.is_production);
        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::METHOD_NOT_ALLOWED {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("POST"));
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_error_body_is_error_only() {
        let body = error_body(&RelayError::NoFiles, false);
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json, serde_json::json!({ "error": "No files" }));
    }

    #[test]
    fn test_upstream_body_carries_diagnostics() {
        let failure = UpstreamFailure::new("File host returned a non-JSON response")
            .with_status(200)
            .with_content_type(Some("text/html".to_string()))
            .with_body_preview("<html>oops</html>");
        let body = error_body(&RelayError::Upstream(failure), true);
        let json = serde_json::to_value(&body).expect("serialize");

        assert_eq!(json["error"], "File host returned a non-JSON response");
        assert_eq!(json["status"], 200);
        assert_eq!(json["contentType"], "text/html");
        assert_eq!(json["bodyPreview"], "<html>oops</html>");
        assert!(json.get("raw").is_none());
    }

    #[test]
    fn test_internal_details_hidden_in_production() {
        let err = RelayError::Internal("zip writer exploded".to_string());

        let dev = serde_json::to_value(error_body(&err, false)).expect("serialize");
        assert_eq!(dev["error"], "Internal server error");
        assert!(dev["details"].as_str().unwrap().contains("zip writer exploded"));

        let prod = serde_json::to_value(error_body(&err, true)).expect("serialize");
        assert_eq!(prod, serde_json::json!({ "error": "Internal server error" }));
    }

    #[test]
    fn test_method_not_allowed_sets_allow_header() {
        let response = HttpRelayError::new(RelayError::MethodNotAllowed("GET".to_string()), true)
            .into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(header::ALLOW).unwrap(), "POST");
    }

    #[test]
    fn test_anyhow_becomes_internal() {
        let err = HttpRelayError::internal(anyhow::anyhow!("boom"), false);
        assert_eq!(err.error.http_status_code(), 500);
    }

    #[tokio::test]
    async fn test_details_follow_configured_environment() {
        let err = || RelayError::Internal("zip writer exploded".to_string());

        let dev = HttpRelayError::new(err(), false).into_response();
        let bytes = axum::body::to_bytes(dev.into_body(), usize::MAX).await.expect("body");
        let dev: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert!(dev["details"].as_str().unwrap().contains("zip writer exploded"));

        let prod = HttpRelayError::new(err(), true).into_response();
        let bytes = axum::body::to_bytes(prod.into_body(), usize::MAX).await.expect("body");
        let prod: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(prod, serde_json::json!({ "error": "Internal server error" }));
    }
}
