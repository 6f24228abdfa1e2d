//! Configuration module
//!
//! Configuration is read from the environment (with `.env` support) once at
//! startup. `BaseConfig` covers the HTTP server, `RelayConfig` the archive and
//! file-host settings.

use std::env;
use std::time::Duration;

const SERVER_PORT: u16 = 3000;
const FILE_HOST_URL: &str = "https://file.io/?auto=1";
const ARCHIVE_FILE_NAME: &str = "gan_photos.zip";
const UPLOAD_TIMEOUT_SECS: u64 = 60;
const MAX_UPLOAD_SIZE_MB: usize = 50;

/// HTTP server configuration
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    /// Emit JSON log lines instead of human-readable ones.
    pub json_logs: bool,
}

/// Archive and upstream file-host configuration
#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// Endpoint receiving the archive; must answer with a one-time link.
    pub file_host_url: String,
    /// Name of the archive as presented to the file host.
    pub archive_file_name: String,
    pub upload_timeout_secs: u64,
    pub max_upload_size_bytes: usize,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub relay: RelayConfig,
}

impl Config {
    /// Load configuration from the process environment and `.env`.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = var("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        if is_production_name(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: match var("PORT") {
                Some(port) => port
                    .parse()
                    .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
                None => SERVER_PORT,
            },
            cors_origins,
            environment,
            json_logs: var("LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        };

        let max_upload_size_mb = var("MAX_UPLOAD_SIZE_MB")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(MAX_UPLOAD_SIZE_MB);
        let max_upload_size_bytes = max_upload_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| {
                anyhow::anyhow!("MAX_UPLOAD_SIZE_MB is too large: {}", max_upload_size_mb)
            })?;

        let relay = RelayConfig {
            file_host_url: var("FILE_HOST_URL").unwrap_or_else(|| FILE_HOST_URL.to_string()),
            archive_file_name: var("ARCHIVE_FILE_NAME")
                .unwrap_or_else(|| ARCHIVE_FILE_NAME.to_string()),
            upload_timeout_secs: var("UPLOAD_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(UPLOAD_TIMEOUT_SECS),
            max_upload_size_bytes,
        };

        let config = Config { base, relay };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let relay = &self.relay;
        if relay.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }
        if relay.upload_timeout_secs == 0 {
            return Err(anyhow::anyhow!("UPLOAD_TIMEOUT_SECS must be greater than 0"));
        }
        if !(relay.file_host_url.starts_with("https://")
            || relay.file_host_url.starts_with("http://"))
        {
            return Err(anyhow::anyhow!(
                "FILE_HOST_URL must be an http(s) URL, got '{}'",
                relay.file_host_url
            ));
        }
        if !relay.archive_file_name.to_lowercase().ends_with(".zip") {
            return Err(anyhow::anyhow!(
                "ARCHIVE_FILE_NAME must end with .zip, got '{}'",
                relay.archive_file_name
            ));
        }
        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.base.environment)
    }

    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn json_logs(&self) -> bool {
        self.base.json_logs
    }

    pub fn file_host_url(&self) -> &str {
        &self.relay.file_host_url
    }

    pub fn archive_file_name(&self) -> &str {
        &self.relay.archive_file_name
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.relay.upload_timeout_secs)
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.relay.max_upload_size_bytes
    }
}

fn is_production_name(environment: &str) -> bool {
    let environment = environment.to_lowercase();
    environment == "production" || environment == "prod"
}
