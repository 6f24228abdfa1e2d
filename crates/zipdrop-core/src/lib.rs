//! zipdrop core library
//!
//! Domain models, name sanitization and resolution, the relay error taxonomy
//! and configuration shared by the service and API crates.

pub mod config;
pub mod error;
pub mod models;
pub mod names;
pub mod sanitize;

// Re-export commonly used types
pub use config::{BaseConfig, Config, RelayConfig};
pub use error::{ErrorMetadata, LogLevel, RelayError, UpstreamFailure};
pub use models::{ArchiveEntry, ParsedForm, UploadResult, UploadedFile};
pub use names::{resolve_names, NameSource, ResolvedNames};
pub use sanitize::sanitize_name;
