//! Result types returned by extraction, answering and the solve pipeline.

use crate::document::DocumentKind;
use serde::{Deserialize, Serialize};

/// Text pulled out of one document, with provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedText {
    /// Full document text, pages joined by newlines.
    pub text: String,
    /// Which extraction path produced the text.
    pub kind: DocumentKind,
    /// Number of pages (1 for images).
    pub page_count: usize,
    /// 1-indexed pages whose text came from OCR rather than a text layer.
    pub ocr_pages: Vec<usize>,
}

impl ExtractedText {
    /// `true` when the text is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// One LLM answer to one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    /// The question that was answered.
    pub question: String,
    /// Natural-language answer.
    pub text: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub duration_ms: u64,
    /// Retries needed before the call succeeded.
    pub retries: u32,
}

/// Summary of the extraction step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub kind: DocumentKind,
    pub page_count: usize,
    pub ocr_pages: Vec<usize>,
    /// Character count of the extracted text.
    pub text_chars: usize,
    pub duration_ms: u64,
}

impl ExtractionStats {
    pub fn from_extracted(extracted: &ExtractedText, duration_ms: u64) -> Self {
        Self {
            kind: extracted.kind,
            page_count: extracted.page_count,
            ocr_pages: extracted.ocr_pages.clone(),
            text_chars: extracted.text.chars().count(),
            duration_ms,
        }
    }
}

/// Output of the full pipeline for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveOutput {
    /// Questions in source order.
    pub questions: Vec<String>,
    /// Answer to the first question, when answering was requested.
    pub answer: Option<Answer>,
    pub extraction: ExtractionStats,
}

impl SolveOutput {
    /// Render the questions the way the chat front end shows them.
    pub fn questions_text(&self) -> String {
        format!("Extracted Questions:\n\n{}", self.questions.join("\n\n"))
    }
}
