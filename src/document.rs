//! Uploaded documents and content-type dispatch.
//!
//! A [`Document`] is the raw bytes of one upload plus whatever content type
//! the sender declared. Extraction needs to know whether to walk a PDF text
//! layer or OCR an image; the declared type decides when it is specific, and
//! the file's magic bytes decide when it is missing or generic.

use crate::error::ExamQaError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One uploaded file.
#[derive(Debug, Clone)]
pub struct Document {
    /// Raw file contents.
    pub bytes: Vec<u8>,
    /// MIME type declared by the sender, if any.
    pub content_type: Option<String>,
    /// Display name used in logs and error messages.
    pub name: String,
}

impl Document {
    pub fn new(bytes: impl Into<Vec<u8>>, name: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: None,
            name: name.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Resolve which extraction path this document takes.
    pub fn kind(&self) -> Result<DocumentKind, ExamQaError> {
        detect_kind(self.content_type.as_deref(), &self.bytes)
    }
}

/// How text is pulled out of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Text layer via pdfium, OCR fallback for scanned pages.
    Pdf,
    /// Vision-model OCR of the whole image.
    Image,
}

const PDF_MAGIC: &[u8] = b"%PDF";

const IMAGE_TYPES: &[&str] = &[
    "image/png",
    "image/jpeg",
    "image/jpg",
    "image/gif",
    "image/webp",
    "image/tiff",
    "image/bmp",
];

/// Map a declared content type (and the file's bytes) to a [`DocumentKind`].
///
/// Parameters such as `; charset=binary` are ignored. A missing or generic
/// declared type falls back to sniffing the magic bytes.
pub fn detect_kind(content_type: Option<&str>, bytes: &[u8]) -> Result<DocumentKind, ExamQaError> {
    let declared = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .unwrap_or_default();

    match declared.as_str() {
        "application/pdf" | "application/x-pdf" => Ok(DocumentKind::Pdf),
        ct if IMAGE_TYPES.contains(&ct) => Ok(DocumentKind::Image),
        "" | "application/octet-stream" | "binary/octet-stream" => sniff_kind(bytes).ok_or_else(|| {
            ExamQaError::UnsupportedContentType {
                content_type: if declared.is_empty() {
                    "unknown".to_string()
                } else {
                    declared.clone()
                },
            }
        }),
        other => Err(ExamQaError::UnsupportedContentType {
            content_type: other.to_string(),
        }),
    }
}

fn sniff_kind(bytes: &[u8]) -> Option<DocumentKind> {
    if bytes.starts_with(PDF_MAGIC) {
        return Some(DocumentKind::Pdf);
    }
    match image::guess_format(bytes) {
        Ok(
            image::ImageFormat::Png
            | image::ImageFormat::Jpeg
            | image::ImageFormat::Gif
            | image::ImageFormat::WebP
            | image::ImageFormat::Tiff
            | image::ImageFormat::Bmp,
        ) => Some(DocumentKind::Image),
        _ => None,
    }
}

/// Guess a content type from a file extension.
pub fn content_type_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let ct = match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        "bmp" => "image/bmp",
        _ => return None,
    };
    Some(ct)
}
