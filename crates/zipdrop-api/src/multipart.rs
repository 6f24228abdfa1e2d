//! Multipart body parsing for the relay.
//!
//! Uses `multer`, the parser behind axum's `Multipart` extractor, directly on
//! the already-buffered body so the relay's own size limit is the only one in
//! effect.

use async_trait::async_trait;
use bytes::Bytes;
use std::convert::Infallible;
use zipdrop_core::{ParsedForm, RelayError, UploadedFile};
use zipdrop_services::FormParser;

const DEFAULT_FILE_CONTENT_TYPE: &str = "application/octet-stream";

/// Splits a `multipart/form-data` body into file parts and text fields.
///
/// A part with a `filename` parameter (even an empty one) is a file; every
/// other part is a text field.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultipartFormParser;

fn malformed(err: multer::Error) -> RelayError {
    RelayError::MalformedMultipart(err.to_string())
}

#[async_trait]
impl FormParser for MultipartFormParser {
    async fn parse(&self, content_type: &str, body: Bytes) -> Result<ParsedForm, RelayError> {
        let boundary = multer::parse_boundary(content_type).map_err(malformed)?;
        let stream = futures::stream::once(async move { Ok::<Bytes, Infallible>(body) });
        let mut multipart = multer::Multipart::new(stream, boundary);

        let mut form = ParsedForm::default();
        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let field_name = field.name().map(str::to_string).unwrap_or_default();

            match field.file_name().map(str::to_string) {
                Some(filename) => {
                    let content_type = field
                        .content_type()
                        .map(|mime| mime.to_string())
                        .unwrap_or_else(|| DEFAULT_FILE_CONTENT_TYPE.to_string());
                    let content = field.bytes().await.map_err(malformed)?;

                    tracing::debug!(
                        field = %field_name,
                        filename = %filename,
                        bytes = content.len(),
                        "Received file part"
                    );
                    form.files.push(UploadedFile::new(filename, content_type, content));
                }
                None => {
                    let value = field.text().await.map_err(malformed)?;
                    form.push_field(field_name, value);
                }
            }
        }

        Ok(form)
    }
}
