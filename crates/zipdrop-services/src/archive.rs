use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fmt;
use std::io::Write;
use std::sync::Mutex;
use zipdrop_core::{ArchiveEntry, UploadedFile};

/// Non-fatal condition noticed while building an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveWarning {
    /// The uploaded file had no content; an empty entry is still written.
    EmptyFile { index: usize, name: String },
    /// Another entry already used `requested`; this one was stored as `assigned`.
    DuplicateName {
        index: usize,
        requested: String,
        assigned: String,
    },
}

impl fmt::Display for ArchiveWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveWarning::EmptyFile { index, name } => {
                write!(f, "file #{} ({}) is empty", index + 1, name)
            }
            ArchiveWarning::DuplicateName {
                index,
                requested,
                assigned,
            } => write!(
                f,
                "file #{} requested duplicate name '{}', stored as '{}'",
                index + 1,
                requested,
                assigned
            ),
        }
    }
}

/// Receives archive warnings. Warnings never fail the archive.
pub trait DiagnosticSink: Send + Sync {
    fn warn(&self, warning: ArchiveWarning);
}

/// Logs warnings through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn warn(&self, warning: ArchiveWarning) {
        tracing::warn!(warning = %warning, "Archive warning");
    }
}

/// Keeps warnings in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    warnings: Mutex<Vec<ArchiveWarning>>,
}

impl CollectingSink {
    pub fn warnings(&self) -> Vec<ArchiveWarning> {
        self.warnings
            .lock()
            .map(|w| w.clone())
            .unwrap_or_default()
    }
}

impl DiagnosticSink for CollectingSink {
    fn warn(&self, warning: ArchiveWarning) {
        if let Ok(mut warnings) = self.warnings.lock() {
            warnings.push(warning);
        }
    }
}

/// `photo.jpg` -> `photo_2.jpg`; names without an extension get the suffix at the end.
fn suffixed_name(name: &str, n: usize) -> String {
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}_{}{}", &name[..dot], n, &name[dot..]),
        _ => format!("{}_{}", name, n),
    }
}

/// Pair every file with its name, disambiguating repeated names so that no
/// entry overwrites another inside the archive.
pub fn archive_entries(
    files: &[UploadedFile],
    names: &[String],
    sink: &dyn DiagnosticSink,
) -> Result<Vec<ArchiveEntry>> {
    if files.len() != names.len() {
        anyhow::bail!(
            "Name count {} does not match file count {}",
            names.len(),
            files.len()
        );
    }

    let mut used: HashSet<String> = HashSet::with_capacity(files.len());
    let mut entries = Vec::with_capacity(files.len());

    for (index, (file, requested)) in files.iter().zip(names).enumerate() {
        let mut name = requested.clone();
        let mut n = 2;
        while used.contains(&name) {
            name = suffixed_name(requested, n);
            n += 1;
        }
        if name != *requested {
            sink.warn(ArchiveWarning::DuplicateName {
                index,
                requested: requested.clone(),
                assigned: name.clone(),
            });
        }
        if file.content.is_empty() {
            sink.warn(ArchiveWarning::EmptyFile {
                index,
                name: name.clone(),
            });
        }

        used.insert(name.clone());
        entries.push(ArchiveEntry {
            name,
            data: file.content.clone(),
        });
    }

    Ok(entries)
}

/// Write entries into an in-memory ZIP, in order, at maximum deflate level.
pub fn write_zip(entries: &[ArchiveEntry]) -> Result<Vec<u8>> {
    use zip::write::{FileOptions, ZipWriter};
    use zip::CompressionMethod;

    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(std::io::Cursor::new(&mut buffer));
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(9))
            .unix_permissions(0o644);

        for entry in entries {
            zip.start_file(entry.name.as_str(), options)
                .with_context(|| format!("Failed to add file to ZIP: {}", entry.name))?;
            zip.write_all(&entry.data)
                .with_context(|| format!("Failed to write file data to ZIP: {}", entry.name))?;
        }

        zip.finish().context("Failed to finalize ZIP archive")?;
    }

    Ok(buffer)
}

/// Build the complete archive for one request.
///
/// `names` must hold one resolved name per file.
pub fn build_archive(
    files: &[UploadedFile],
    names: &[String],
    sink: &dyn DiagnosticSink,
) -> Result<Vec<u8>> {
    let entries = archive_entries(files, names, sink)?;
    write_zip(&entries)
}
