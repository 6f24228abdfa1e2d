//! Application setup and initialization

pub mod routes;
pub mod server;

use axum::Router;
use std::sync::Arc;
use zipdrop_core::Config;

use crate::state::AppState;

/// Wire the relay from configuration and build the router.
pub fn initialize_app(config: &Config) -> Result<Router, anyhow::Error> {
    let state = AppState::from_config(config.clone())?;

    tracing::info!(
        file_host = %config.file_host_url(),
        archive_file_name = %config.archive_file_name(),
        upload_timeout_secs = config.upload_timeout().as_secs(),
        "Upload relay configured"
    );

    routes::setup_routes(config, Arc::new(state))
}
