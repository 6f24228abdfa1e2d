use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use std::any::Any as PanicPayload;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use zipdrop_core::{Config, RelayError};

use crate::error::HttpRelayError;
use crate::handlers;
use crate::state::AppState;

/// Path the relay has always been reachable at behind a Netlify deploy.
pub const NETLIFY_UPLOAD_PATH: &str = "/.netlify/functions/upload";

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let app = Router::new()
        .route("/upload", any(handlers::upload))
        .route(NETLIFY_UPLOAD_PATH, any(handlers::upload))
        .route("/health", get(handlers::liveness_check))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_upload_size_bytes()))
        .layer(CatchPanicLayer::custom(panic_handler(config.is_production())))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    Ok(app)
}

/// Renders a handler panic as the 500 envelope.
fn panic_handler(
    is_production: bool,
) -> impl Fn(Box<dyn PanicPayload + Send + 'static>) -> Response + Clone {
    move |panic| {
        let message = panic
            .downcast_ref::<String>()
            .cloned()
            .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
            .unwrap_or_else(|| "handler panicked".to_string());

        HttpRelayError::new(RelayError::Internal(message), is_production).into_response()
    }
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;

    fn panicking_router(is_production: bool) -> Router {
        Router::new()
            .route("/boom", get(|| async { panic!("archive index out of range") as () }))
            .layer(CatchPanicLayer::custom(panic_handler(is_production)))
    }

    #[tokio::test]
    async fn test_handler_panic_renders_internal_envelope() {
        let server = TestServer::new(panicking_router(false)).expect("test server");

        let response = server.get("/boom").await;

        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], "Internal server error");
        assert!(body["details"]
            .as_str()
            .unwrap()
            .contains("archive index out of range"));
    }

    #[tokio::test]
    async fn test_handler_panic_hides_details_in_production() {
        let server = TestServer::new(panicking_router(true)).expect("test server");

        let response = server.get("/boom").await;

        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.json::<serde_json::Value>(),
            serde_json::json!({ "error": "Internal server error" })
        );
    }
}
