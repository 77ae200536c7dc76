//! Text extraction: the seam between raw uploads and the segmenter.
//!
//! [`TextExtractor`] is the capability the pipeline needs: bytes plus a
//! declared content type in, best-effort plain text out. The default
//! [`DocumentExtractor`] walks the PDF text layer with pdfium and OCRs images
//! and scanned pages with a vision model. Callers with their own OCR engine
//! implement the trait and pass it to [`crate::solve::solve_document`].
//!
//! Extractors may return blank text; deciding that blank text is a failure
//! is the caller's job (see [`crate::solve::solve_document`]).

use crate::config::SolverConfig;
use crate::document::{Document, DocumentKind};
use crate::error::ExamQaError;
use crate::output::ExtractedText;
use crate::pipeline::{encode, ocr, pdf};
use crate::provider::resolve_provider;
use edgequake_llm::LLMProvider;
use once_cell::sync::OnceCell;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

/// Turns one document into plain text.
pub trait TextExtractor: Send + Sync {
    fn extract(
        &self,
        document: &Document,
    ) -> impl Future<Output = Result<ExtractedText, ExamQaError>> + Send;
}

/// pdfium text layer plus vision-model OCR.
///
/// The LLM provider is only resolved the first time OCR is needed, so
/// text-layer PDFs extract without any API key configured.
pub struct DocumentExtractor {
    config: SolverConfig,
    provider: OnceCell<Arc<dyn LLMProvider>>,
}

impl DocumentExtractor {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            provider: OnceCell::new(),
        }
    }

    fn provider(&self) -> Result<&Arc<dyn LLMProvider>, ExamQaError> {
        self.provider
            .get_or_try_init(|| resolve_provider(&self.config))
    }

    async fn extract_pdf(&self, document: &Document) -> Result<ExtractedText, ExamQaError> {
        let scan = pdf::read_pdf(document.bytes.clone(), &document.name, &self.config).await?;
        let page_count = scan.page_texts.len();
        let mut page_texts = scan.page_texts;
        let mut ocr_pages = Vec::new();

        if !scan.scans.is_empty() {
            let provider = self.provider()?;
            let results = ocr::ocr_pages(provider, scan.scans, &self.config).await;
            ocr_pages = merge_ocr_pages(&mut page_texts, results)?;
        }

        Ok(ExtractedText {
            text: page_texts.join("\n"),
            kind: DocumentKind::Pdf,
            page_count,
            ocr_pages,
        })
    }

    async fn extract_image(&self, document: &Document) -> Result<ExtractedText, ExamQaError> {
        let bytes = document.bytes.clone();
        let max_px = self.config.max_rendered_pixels;
        let decoded = tokio::task::spawn_blocking(move || {
            encode::decode_image(&bytes)
                .map(|img| encode::fit_within(img, max_px))
                .and_then(|img| encode::encode_png(&img))
        })
        .await
        .map_err(|e| ExamQaError::Internal(format!("Image task panicked: {}", e)))?;

        let image_data = decoded.map_err(|e| ExamQaError::ImageDecodeFailed {
            name: document.name.clone(),
            detail: e.to_string(),
        })?;

        let provider = self.provider()?;
        let text = ocr::ocr_image(provider, 1, image_data, &self.config).await?;

        Ok(ExtractedText {
            text,
            kind: DocumentKind::Image,
            page_count: 1,
            ocr_pages: vec![1],
        })
    }
}

impl TextExtractor for DocumentExtractor {
    async fn extract(&self, document: &Document) -> Result<ExtractedText, ExamQaError> {
        let kind = document.kind()?;
        info!(
            "Extracting text from '{}' ({:?}, {} bytes)",
            document.name,
            kind,
            document.bytes.len()
        );
        match kind {
            DocumentKind::Pdf => self.extract_pdf(document).await,
            DocumentKind::Image => self.extract_image(document).await,
        }
    }
}

/// Fold per-page OCR results into the text-layer pages and return the
/// 1-based numbers of the pages OCR filled in.
///
/// A failed page is left blank. The first OCR error is returned only when
/// no page ends up with any text.
fn merge_ocr_pages(
    page_texts: &mut [String],
    results: Vec<(usize, Result<String, ExamQaError>)>,
) -> Result<Vec<usize>, ExamQaError> {
    let mut ocr_pages = Vec::new();
    let mut first_err = None;

    for (idx, result) in results {
        match result {
            Ok(text) => {
                page_texts[idx] = text;
                ocr_pages.push(idx + 1);
            }
            Err(e) => {
                warn!("Page {} OCR failed, leaving it blank: {}", idx + 1, e);
                first_err.get_or_insert(e);
            }
        }
    }

    if let Some(e) = first_err {
        if page_texts.iter().all(|t| t.trim().is_empty()) {
            return Err(e);
        }
    }
    Ok(ocr_pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ocr_failed(page: usize) -> ExamQaError {
        ExamQaError::OcrFailed {
            page,
            retries: 3,
            detail: "HTTP 503".into(),
        }
    }

    #[test]
    fn every_scanned_page_is_filled_in() {
        let mut pages = vec![String::new(), "Page 2 text".to_string(), String::new()];
        let results = vec![(0, Ok("1. First.".to_string())), (2, Ok("3. Third.".to_string()))];

        let ocr_pages = merge_ocr_pages(&mut pages, results).unwrap();
        assert_eq!(ocr_pages, vec![1, 3]);
        assert_eq!(pages, vec!["1. First.", "Page 2 text", "3. Third."]);
    }

    #[test]
    fn failed_page_is_left_blank() {
        let mut pages = vec![String::new(), String::new()];
        let results = vec![(0, Ok("1. Define entropy.".to_string())), (1, Err(ocr_failed(2)))];

        let ocr_pages = merge_ocr_pages(&mut pages, results).unwrap();
        assert_eq!(ocr_pages, vec![1]);
        assert_eq!(pages, vec!["1. Define entropy.", ""]);
    }

    #[test]
    fn text_layer_pages_outweigh_ocr_failure() {
        let mut pages = vec!["1. From the text layer.".to_string(), String::new()];
        let results = vec![(1, Err(ocr_failed(2)))];

        let ocr_pages = merge_ocr_pages(&mut pages, results).unwrap();
        assert!(ocr_pages.is_empty());
        assert_eq!(pages[0], "1. From the text layer.");
    }

    #[test]
    fn all_blank_surfaces_first_ocr_error() {
        let mut pages = vec![String::new(), String::new(), String::new()];
        let results = vec![
            (0, Err(ocr_failed(1))),
            (1, Ok("  \n".to_string())),
            (2, Err(ocr_failed(3))),
        ];

        let err = merge_ocr_pages(&mut pages, results).unwrap_err();
        assert!(
            matches!(err, ExamQaError::OcrFailed { page: 1, retries: 3, .. }),
            "got: {err}"
        );
    }

    #[tokio::test]
    async fn unsupported_type_fails_before_any_work() {
        let extractor = DocumentExtractor::new(SolverConfig::default());
        let doc = Document::new(b"a,b,c".to_vec(), "table.csv").with_content_type("text/csv");
        let err = extractor.extract(&doc).await.unwrap_err();
        assert!(matches!(err, ExamQaError::UnsupportedContentType { .. }));
    }

    #[tokio::test]
    async fn undecodable_image_fails_before_provider_lookup() {
        let extractor = DocumentExtractor::new(SolverConfig::default());
        let doc = Document::new(b"not really a png".to_vec(), "scan.png")
            .with_content_type("image/png");
        let err = extractor.extract(&doc).await.unwrap_err();
        assert!(
            matches!(err, ExamQaError::ImageDecodeFailed { ref name, .. } if name == "scan.png"),
            "got: {err}"
        );
    }
}
