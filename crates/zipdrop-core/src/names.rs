//! Output name resolution.
//!
//! Clients send the desired archive names in one of two shapes, or not at all.
//! Sources are tried in a fixed order and the first one whose length matches
//! the file count wins; a mismatch never fails the request, it only moves on
//! to the next source. The last source (original filenames) always succeeds.

use crate::models::{ParsedForm, UploadedFile};
use crate::sanitize::sanitize_name;
use serde_json::Value;

/// Repeated field carrying one name per file.
pub const REPEATED_NAMES_FIELD: &str = "names[]";

/// Single field carrying a JSON-encoded array of names.
pub const JSON_NAMES_FIELD: &str = "names";

/// Where the resolved names came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource {
    /// Repeated `names[]` field.
    Repeated,
    /// JSON array in the `names` field.
    JsonArray,
    /// Derived from each file's original filename.
    Filenames,
}

impl NameSource {
    /// Resolution order.
    pub const PRECEDENCE: [NameSource; 3] = [
        NameSource::Repeated,
        NameSource::JsonArray,
        NameSource::Filenames,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NameSource::Repeated => "repeated_field",
            NameSource::JsonArray => "json_array",
            NameSource::Filenames => "filenames",
        }
    }

    /// Raw candidate names from this source, or `None` when it yields nothing usable.
    ///
    /// A `None` element means the source has a slot for that file but no usable
    /// name in it; the file's own name is used instead.
    fn candidates(&self, form: &ParsedForm) -> Option<Vec<Option<String>>> {
        match self {
            NameSource::Repeated => {
                let values = form.values(REPEATED_NAMES_FIELD);
                (!values.is_empty()).then(|| values.iter().cloned().map(Some).collect())
            }
            NameSource::JsonArray => form
                .field(JSON_NAMES_FIELD)
                .and_then(|raw| serde_json::from_str::<Vec<Value>>(raw).ok())
                .map(|values| {
                    values
                        .into_iter()
                        .map(|value| match value {
                            Value::String(name) => Some(name),
                            _ => None,
                        })
                        .collect()
                }),
            NameSource::Filenames => {
                Some(form.files.iter().map(|f| Some(f.filename.clone())).collect())
            }
        }
    }
}

/// Names for every file, in file order, already sanitized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNames {
    pub names: Vec<String>,
    pub source: NameSource,
}

/// Placeholder for a file whose name sanitizes to nothing.
pub fn placeholder_name(index: usize) -> String {
    format!("image_{}.jpg", index + 1)
}

/// Name derived from the uploaded file itself.
fn derived_name(file: &UploadedFile, index: usize) -> String {
    let name = sanitize_name(&file.filename);
    if name.is_empty() {
        placeholder_name(index)
    } else {
        name
    }
}

/// Resolve one sanitized name per file in `form.files`.
///
/// The returned list always has exactly `form.files.len()` entries.
pub fn resolve_names(form: &ParsedForm) -> ResolvedNames {
    let file_count = form.files.len();

    for source in NameSource::PRECEDENCE {
        let Some(candidates) = source.candidates(form) else {
            continue;
        };
        if candidates.len() != file_count {
            if source != NameSource::Filenames {
                tracing::debug!(
                    source = source.as_str(),
                    names = candidates.len(),
                    files = file_count,
                    "Name count does not match file count, trying next source"
                );
            }
            continue;
        }

        let names = candidates
            .iter()
            .zip(&form.files)
            .enumerate()
            .map(|(index, (candidate, file))| {
                let name = candidate.as_deref().map(sanitize_name).unwrap_or_default();
                if name.is_empty() {
                    derived_name(file, index)
                } else {
                    name
                }
            })
            .collect();

        return ResolvedNames { names, source };
    }

    // Unreachable in practice: the filename source always matches the file count.
    ResolvedNames {
        names: form
            .files
            .iter()
            .enumerate()
            .map(|(index, file)| derived_name(file, index))
            .collect(),
        source: NameSource::Filenames,
    }
}
