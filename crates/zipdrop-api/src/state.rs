//! Application state shared by all handlers.
//!
//! Immutable after startup; requests share nothing mutable.

use std::sync::Arc;
use zipdrop_core::Config;
use zipdrop_services::{FileIoClient, UploadRelay};

use crate::multipart::MultipartFormParser;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub relay: UploadRelay,
}

impl AppState {
    pub fn new(config: Config, relay: UploadRelay) -> Self {
        Self { config, relay }
    }

    /// Production wiring: multer-backed parser and the configured file host.
    pub fn from_config(config: Config) -> Result<Self, anyhow::Error> {
        let file_host = FileIoClient::new(config.file_host_url(), config.upload_timeout())?;
        let relay = UploadRelay::new(
            Arc::new(MultipartFormParser),
            Arc::new(file_host),
            config.archive_file_name(),
        );
        Ok(Self::new(config, relay))
    }
}
