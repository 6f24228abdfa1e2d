//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p zipdrop-api --test upload_test`.

#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex};
use zipdrop_api::multipart::MultipartFormParser;
use zipdrop_api::setup::routes;
use zipdrop_api::state::AppState;
use zipdrop_core::{BaseConfig, Config, RelayConfig, UpstreamFailure};
use zipdrop_services::{FileHost, UploadRelay};

pub const TEST_ARCHIVE_NAME: &str = "gan_photos.zip";

pub fn test_config(file_host_url: &str, max_upload_size_bytes: usize) -> Config {
    Config {
        base: BaseConfig {
            server_port: 0,
            cors_origins: vec!["*".to_string()],
            environment: "test".to_string(),
            json_logs: false,
        },
        relay: RelayConfig {
            file_host_url: file_host_url.to_string(),
            archive_file_name: TEST_ARCHIVE_NAME.to_string(),
            upload_timeout_secs: 5,
            max_upload_size_bytes,
        },
    }
}

/// App talking to a real HTTP file host (usually a mockito server).
pub fn setup_http_app(file_host_url: &str) -> TestServer {
    let config = test_config(file_host_url, 1024 * 1024);
    let state = AppState::from_config(config.clone()).expect("state");
    server(&config, state)
}

/// App whose file host records archives instead of sending them.
pub fn setup_capturing_app(max_upload_size_bytes: usize) -> (TestServer, Arc<CapturingHost>) {
    let config = test_config("http://127.0.0.1:1/unused", max_upload_size_bytes);
    let host = Arc::new(CapturingHost::default());
    let relay = UploadRelay::new(
        Arc::new(MultipartFormParser),
        host.clone(),
        config.archive_file_name(),
    );
    let state = AppState::new(config.clone(), relay);
    (server(&config, state), host)
}

fn server(config: &Config, state: AppState) -> TestServer {
    let router = routes::setup_routes(config, Arc::new(state)).expect("routes");
    TestServer::new(router).expect("test server")
}

/// File host that keeps every archive and hands out a fixed link.
#[derive(Default)]
pub struct CapturingHost {
    uploads: Mutex<Vec<(String, Vec<u8>)>>,
}

impl CapturingHost {
    pub const LINK: &'static str = "https://file.io/captured";

    pub fn uploads(&self) -> Vec<(String, Vec<u8>)> {
        self.uploads.lock().expect("lock").clone()
    }
}

#[async_trait]
impl FileHost for CapturingHost {
    async fn upload(&self, archive: Vec<u8>, file_name: &str) -> Result<String, UpstreamFailure> {
        self.uploads
            .lock()
            .expect("lock")
            .push((file_name.to_string(), archive));
        Ok(Self::LINK.to_string())
    }
}

/// Entry names and contents of a ZIP, in archive order.
pub fn zip_entries(archive: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive.to_vec())).expect("valid zip");
    (0..zip.len())
        .map(|i| {
            let mut file = zip.by_index(i).expect("entry");
            let mut data = Vec::new();
            file.read_to_end(&mut data).expect("read entry");
            (file.name().to_string(), data)
        })
        .collect()
}
