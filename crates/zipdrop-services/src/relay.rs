//! Upload relay pipeline.
//!
//! Validate -> Parse -> ResolveNames -> BuildArchive -> Upload. Each stage runs
//! once, in order; the first failure ends the request.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use zipdrop_core::{resolve_names, ParsedForm, RelayError, UploadResult};

use crate::archive::{build_archive, DiagnosticSink, TracingSink};
use crate::file_host::FileHost;

const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// Multipart body parser.
#[async_trait]
pub trait FormParser: Send + Sync {
    async fn parse(&self, content_type: &str, body: Bytes) -> Result<ParsedForm, RelayError>;
}

/// Reject anything that is not a multipart POST. Never looks at the body.
pub fn validate_request(method: &str, content_type: Option<&str>) -> Result<(), RelayError> {
    if !method.eq_ignore_ascii_case("POST") {
        return Err(RelayError::MethodNotAllowed(method.to_string()));
    }

    let content_type = content_type.unwrap_or_default();
    let is_multipart = content_type
        .trim_start()
        .get(..MULTIPART_FORM_DATA.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(MULTIPART_FORM_DATA));
    if !is_multipart {
        return Err(RelayError::UnsupportedContentType(content_type.to_string()));
    }

    Ok(())
}

/// Packages uploaded files into one archive and hands it to the file host.
#[derive(Clone)]
pub struct UploadRelay {
    parser: Arc<dyn FormParser>,
    file_host: Arc<dyn FileHost>,
    sink: Arc<dyn DiagnosticSink>,
    archive_file_name: String,
}

impl UploadRelay {
    pub fn new(
        parser: Arc<dyn FormParser>,
        file_host: Arc<dyn FileHost>,
        archive_file_name: impl Into<String>,
    ) -> Self {
        Self {
            parser,
            file_host,
            sink: Arc::new(TracingSink),
            archive_file_name: archive_file_name.into(),
        }
    }

    /// Route archive warnings somewhere other than the log.
    pub fn with_diagnostic_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Run the whole pipeline for one request.
    ///
    /// Validation runs first, so a rejected request never reaches the parser.
    pub async fn handle(
        &self,
        method: &str,
        content_type: Option<&str>,
        body: Bytes,
    ) -> UploadResult {
        let result = match validate_request(method, content_type) {
            Ok(()) => self.process(content_type.unwrap_or_default(), body).await,
            Err(err) => Err(err),
        };
        result.into()
    }

    /// Everything after validation: parse, name, archive, upload.
    pub async fn process(&self, content_type: &str, body: Bytes) -> Result<String, RelayError> {
        let form = self.parser.parse(content_type, body).await?;
        if form.files.is_empty() {
            return Err(RelayError::NoFiles);
        }

        let resolved = resolve_names(&form);
        tracing::debug!(
            files = form.files.len(),
            name_source = resolved.source.as_str(),
            "Resolved archive entry names"
        );

        let ParsedForm { files, .. } = form;
        let archive = build_archive(&files, &resolved.names, self.sink.as_ref())
            .map_err(RelayError::Archive)?;
        let entries = files.len();
        drop(files);

        tracing::info!(
            entries,
            archive_bytes = archive.len(),
            "Archive built, uploading to file host"
        );

        let url = self
            .file_host
            .upload(archive, &self.archive_file_name)
            .await?;

        tracing::info!(entries, "Archive uploaded");
        Ok(url)
    }
}
