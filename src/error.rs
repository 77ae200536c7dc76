//! Error types for the exam-qa library.
//!
//! Question segmentation itself never fails. Every other stage of the
//! pipeline (input resolution, text extraction, answering) is fallible and
//! reports through [`ExamQaError`], grouped by the stage that produced it so
//! a caller can map each group to its own transport-level error.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the exam-qa library.
#[derive(Debug, Error)]
pub enum ExamQaError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// Neither the declared content type nor the file's magic bytes name a
    /// PDF or a supported image format.
    #[error("Unsupported content type '{content_type}'\nUpload a PDF or a PNG/JPEG/GIF/WebP/TIFF/BMP image.")]
    UnsupportedContentType { content_type: String },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{name}' is corrupt: {detail}")]
    CorruptPdf { name: String, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{name}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { name: String },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{name}'")]
    WrongPassword { name: String },

    /// pdfium could not rasterise a scanned page for OCR.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// The uploaded image could not be decoded.
    #[error("Image '{name}' could not be decoded: {detail}")]
    ImageDecodeFailed { name: String, detail: String },

    /// The vision model failed to transcribe a page or image.
    #[error("OCR failed for page {page} after {retries} retries: {detail}")]
    OcrFailed {
        page: usize,
        retries: u32,
        detail: String,
    },

    /// Extraction succeeded but produced no text at all.
    #[error("No text could be extracted from '{name}'\nIs this a blank page, or a scan with OCR fallback disabled?")]
    EmptyExtraction { name: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install libpdfium for your platform, or set\n\
PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Answer errors ─────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The LLM could not answer the question after all retries.
    #[error("Answer generation failed after {retries} retries: {detail}")]
    AnswerFailed { retries: u32, detail: String },

    /// An answer was requested but the question list is empty.
    #[error("No questions to answer: the question list is empty")]
    NoQuestions,

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExamQaError {
    /// `true` for failures of the text-extraction stage.
    pub fn is_extraction_error(&self) -> bool {
        matches!(
            self,
            ExamQaError::UnsupportedContentType { .. }
                | ExamQaError::CorruptPdf { .. }
                | ExamQaError::PasswordRequired { .. }
                | ExamQaError::WrongPassword { .. }
                | ExamQaError::RasterisationFailed { .. }
                | ExamQaError::ImageDecodeFailed { .. }
                | ExamQaError::OcrFailed { .. }
                | ExamQaError::EmptyExtraction { .. }
                | ExamQaError::PdfiumBindingFailed(_)
        )
    }

    /// `true` for failures of the answer-generation stage.
    pub fn is_answer_error(&self) -> bool {
        matches!(
            self,
            ExamQaError::ProviderNotConfigured { .. }
                | ExamQaError::AnswerFailed { .. }
                | ExamQaError::NoQuestions
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_content_type_display() {
        let e = ExamQaError::UnsupportedContentType {
            content_type: "text/csv".into(),
        };
        assert!(e.to_string().contains("text/csv"));
        assert!(e.is_extraction_error());
        assert!(!e.is_answer_error());
    }

    #[test]
    fn empty_extraction_display() {
        let e = ExamQaError::EmptyExtraction {
            name: "scan.png".into(),
        };
        assert!(e.to_string().contains("scan.png"));
        assert!(e.is_extraction_error());
    }

    #[test]
    fn answer_failed_display() {
        let e = ExamQaError::AnswerFailed {
            retries: 3,
            detail: "HTTP 503".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("3 retries"), "got: {msg}");
        assert!(msg.contains("HTTP 503"));
        assert!(e.is_answer_error());
    }

    #[test]
    fn ocr_failed_display() {
        let e = ExamQaError::OcrFailed {
            page: 2,
            retries: 1,
            detail: "timeout".into(),
        };
        assert!(e.to_string().contains("page 2"));
    }

    #[test]
    fn input_errors_belong_to_no_stage() {
        let e = ExamQaError::InvalidInput { input: "".into() };
        assert!(!e.is_extraction_error());
        assert!(!e.is_answer_error());
    }
}
