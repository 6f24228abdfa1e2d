//! zipdrop services
//!
//! Archive construction, the upstream file-host client, and the `UploadRelay`
//! pipeline tying parsing, naming, archiving and uploading together.

pub mod archive;
pub mod file_host;
pub mod relay;

pub use archive::{
    build_archive, ArchiveWarning, CollectingSink, DiagnosticSink, TracingSink,
};
pub use file_host::{FileHost, FileIoClient};
pub use relay::{validate_request, FormParser, UploadRelay};
