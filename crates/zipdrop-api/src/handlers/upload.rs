//! Upload relay handler.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use zipdrop_core::{RelayError, UploadResult};
use zipdrop_services::validate_request;

use crate::error::{ErrorResponse, HttpRelayError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// HTTP rendering of an [`UploadResult`].
pub struct RelayResponse {
    pub result: UploadResult,
    pub is_production: bool,
}

impl RelayResponse {
    pub fn new(result: UploadResult, is_production: bool) -> Self {
        Self {
            result,
            is_production,
        }
    }
}

impl IntoResponse for RelayResponse {
    fn into_response(self) -> Response {
        match self.result {
            UploadResult::Success { url } => {
                (StatusCode::OK, Json(UploadResponse { url })).into_response()
            }
            UploadResult::Failure(err) => {
                HttpRelayError::new(err, self.is_production).into_response()
            }
        }
    }
}

/// Receive a multipart upload, zip it, and hand back a one-time link.
///
/// Method and content type are checked before the body is read, so rejected
/// requests are never buffered.
#[tracing::instrument(
    skip(state, request),
    fields(
        request_id = %uuid::Uuid::new_v4(),
        method = %request.method(),
        path = %request.uri().path(),
    )
)]
pub async fn upload(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let is_production = state.config.is_production();
    let method = request.method().clone();
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    // Checked here as well as in the relay so rejected bodies are never buffered.
    if let Err(err) = validate_request(method.as_str(), content_type.as_deref()) {
        return RelayResponse::new(UploadResult::Failure(err), is_production).into_response();
    }

    let body = match Bytes::from_request(request, &state).await {
        Ok(body) => body,
        Err(rejection) => {
            let err = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                RelayError::PayloadTooLarge(format!(
                    "Upload exceeds {} bytes",
                    state.config.max_upload_size_bytes()
                ))
            } else {
                RelayError::MalformedMultipart(rejection.body_text())
            };
            return RelayResponse::new(UploadResult::Failure(err), is_production).into_response();
        }
    };

    tracing::debug!(body_bytes = body.len(), "Upload body received");

    let result = state
        .relay
        .handle(method.as_str(), content_type.as_deref(), body)
        .await;
    RelayResponse::new(result, is_production).into_response()
}

/// JSON 404 for anything outside the route table.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Not found")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_renders_url_only() {
        let response = RelayResponse::new(
            UploadResult::Success {
                url: "https://file.io/abc".to_string(),
            },
            false,
        )
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_failure_renders_error_status() {
        let response =
            RelayResponse::new(UploadResult::Failure(RelayError::NoFiles), false).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
