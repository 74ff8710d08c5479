//! File ingestion: MIME filtering and base64 encoding of attachments.
//!
//! Accepted files (`image/*` and `application/pdf`) are read concurrently
//! and appended to the ingestor as one batch once every read has finished.
//! Anything else is dropped without error.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::future::try_join_all;
use uuid::Uuid;

use crate::plan::request::InlineData;

/// MIME type used for PDF documents.
pub const PDF_MIME: &str = "application/pdf";

/// Fallback MIME type for unrecognised extensions.
pub const OCTET_STREAM_MIME: &str = "application/octet-stream";

/// Errors raised while reading attachments.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Whether a MIME type is one the model accepts as inline input.
pub fn is_accepted_mime(mime: &str) -> bool {
    mime.starts_with("image/") || mime == PDF_MIME
}

/// Infer a MIME type from a file extension.
pub fn mime_from_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        Some("tif" | "tiff") => "image/tiff",
        Some("pdf") => PDF_MIME,
        _ => OCTET_STREAM_MIME,
    }
}

/// Strip a `data:<mime>;base64,` prefix, keeping only the raw payload.
///
/// Input without a prefix is returned unchanged.
pub fn strip_data_url_prefix(data: &str) -> &str {
    if !data.starts_with("data:") {
        return data;
    }
    match data.split_once(',') {
        Some((_, payload)) => payload,
        None => data,
    }
}

/// MIME type declared in a data URL header, if any.
fn data_url_mime(data: &str) -> Option<&str> {
    let header = data.strip_prefix("data:")?.split_once(',')?.0;
    let mime = header.split(';').next()?;
    (!mime.is_empty()).then_some(mime)
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Where a file's bytes come from.
#[derive(Debug, Clone)]
pub enum FileSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// A file offered for ingestion (picker or drop equivalent).
#[derive(Debug, Clone)]
pub struct FileHandle {
    pub name: String,
    pub mime_type: String,
    pub source: FileSource,
}

impl FileHandle {
    /// Handle for a file on disk, with the MIME type inferred from its extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            mime_type: mime_from_path(&path).to_string(),
            source: FileSource::Path(path),
        }
    }

    /// Handle for in-memory bytes with an explicit MIME type.
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            source: FileSource::Bytes(bytes),
        }
    }

    async fn read(self) -> Result<UploadedFile, IngestError> {
        let bytes = match self.source {
            FileSource::Bytes(b) => b,
            FileSource::Path(path) => tokio::fs::read(&path)
                .await
                .map_err(|source| IngestError::Read { path, source })?,
        };
        Ok(UploadedFile {
            id: Uuid::new_v4(),
            name: self.name,
            mime_type: self.mime_type,
            data: STANDARD.encode(bytes),
        })
    }
}

/// An ingested attachment, ready to be sent inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Random correlation key, used for removal.
    pub id: Uuid,
    pub name: String,
    pub mime_type: String,
    /// Standard base64 payload without a data-URL prefix.
    pub data: String,
}

impl UploadedFile {
    pub fn inline_data(&self) -> InlineData {
        InlineData {
            mime_type: self.mime_type.clone(),
            data: self.data.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Ingestor
// ---------------------------------------------------------------------------

/// Accumulates ingested attachments across batches.
#[derive(Debug, Default, Clone)]
pub struct Ingestor {
    files: Vec<UploadedFile>,
}

impl Ingestor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest a batch of handles.
    ///
    /// Rejected MIME types are skipped. Accepted files are read concurrently
    /// and appended only once all reads succeed; on a read failure nothing
    /// from the batch is kept. Returns the entries added by this batch.
    pub async fn ingest(
        &mut self,
        handles: impl IntoIterator<Item = FileHandle>,
    ) -> Result<Vec<UploadedFile>, IngestError> {
        let accepted: Vec<FileHandle> = handles
            .into_iter()
            .filter(|h| {
                let ok = is_accepted_mime(&h.mime_type);
                if !ok {
                    tracing::debug!(name = %h.name, mime = %h.mime_type, "skipping unsupported file");
                }
                ok
            })
            .collect();

        if accepted.is_empty() {
            return Ok(Vec::new());
        }

        let batch = try_join_all(accepted.into_iter().map(FileHandle::read)).await?;
        tracing::info!(
            added = batch.len(),
            total = self.files.len() + batch.len(),
            "files ingested"
        );
        self.files.extend(batch.iter().cloned());
        Ok(batch)
    }

    /// Ingest a browser-style data URL (or a bare base64 payload).
    ///
    /// The MIME type comes from the data URL header, falling back to the
    /// file name's extension. Returns `None` when the type is rejected.
    pub fn ingest_data_url(&mut self, name: &str, data_url: &str) -> Option<UploadedFile> {
        let mime = data_url_mime(data_url)
            .map(str::to_string)
            .unwrap_or_else(|| mime_from_path(Path::new(name)).to_string());
        if !is_accepted_mime(&mime) {
            tracing::debug!(name = %name, mime = %mime, "skipping unsupported file");
            return None;
        }
        let file = UploadedFile {
            id: Uuid::new_v4(),
            name: name.to_string(),
            mime_type: mime,
            data: strip_data_url_prefix(data_url).to_string(),
        };
        self.files.push(file.clone());
        Some(file)
    }

    /// Remove an entry by id. Returns whether anything was removed.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.files.len();
        self.files.retain(|f| f.id != id);
        self.files.len() != before
    }

    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    /// Payloads to attach to a generation request, in ingestion order.
    pub fn inline_payloads(&self) -> Vec<InlineData> {
        self.files.iter().map(UploadedFile::inline_data).collect()
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
