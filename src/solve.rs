//! End-to-end entry points: input → text → questions → (optional) answer.
//!
//! Two layers:
//!
//! - [`extract_questions`] / [`solve`] resolve a path or URL and wire up the
//!   default collaborators ([`DocumentExtractor`], [`LlmAnswerer`]) from a
//!   [`SolverConfig`].
//! - [`solve_document`] runs the same steps over caller-supplied
//!   collaborators, so an application with its own OCR engine or LLM client
//!   only has to implement [`TextExtractor`] / [`Answerer`].
//!
//! Only the first question is ever answered per call. Answering a later
//! question means calling [`answer_first`] with the list starting there.

use crate::answer::{Answerer, LlmAnswerer};
use crate::config::SolverConfig;
use crate::document::Document;
use crate::error::ExamQaError;
use crate::extract::{DocumentExtractor, TextExtractor};
use crate::output::{Answer, ExtractionStats, SolveOutput};
use crate::pipeline::{input, segment};
use crate::provider::resolve_provider;
use std::time::Instant;
use tracing::{debug, info};

/// Extract and segment the questions of a PDF or image. No answer is
/// generated, and no LLM is contacted unless a page needs OCR.
///
/// # Example
/// ```rust,no_run
/// use exam_qa::{extract_questions, SolverConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let output = extract_questions("paper.pdf", &SolverConfig::default()).await?;
/// for q in &output.questions {
///     println!("{q}\n");
/// }
/// # Ok(())
/// # }
/// ```
pub async fn extract_questions(
    input_str: impl AsRef<str>,
    config: &SolverConfig,
) -> Result<SolveOutput, ExamQaError> {
    let document = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    let extractor = DocumentExtractor::new(config.clone());
    solve_document(&document, &extractor, None::<&LlmAnswerer>).await
}

/// Extract the questions, then answer the first one.
///
/// The provider is resolved before any download or extraction so that a
/// missing API key fails immediately.
pub async fn solve(
    input_str: impl AsRef<str>,
    config: &SolverConfig,
) -> Result<SolveOutput, ExamQaError> {
    let config = with_resolved_provider(config)?;

    let document = input::resolve_input(input_str.as_ref(), config.download_timeout_secs).await?;
    let extractor = DocumentExtractor::new(config.clone());
    let answerer = LlmAnswerer::from_config(config)?;
    solve_document(&document, &extractor, Some(&answerer)).await
}

/// [`solve`] over an in-memory upload.
///
/// `content_type` is the declared MIME type, if any; when it is missing or
/// generic the bytes are sniffed.
pub async fn solve_bytes(
    bytes: impl Into<Vec<u8>>,
    content_type: Option<&str>,
    name: impl Into<String>,
    answer: bool,
    config: &SolverConfig,
) -> Result<SolveOutput, ExamQaError> {
    let mut document = Document::new(bytes, name);
    if let Some(ct) = content_type {
        document = document.with_content_type(ct);
    }

    if answer {
        let config = with_resolved_provider(config)?;
        let extractor = DocumentExtractor::new(config.clone());
        let answerer = LlmAnswerer::from_config(config)?;
        solve_document(&document, &extractor, Some(&answerer)).await
    } else {
        let extractor = DocumentExtractor::new(config.clone());
        solve_document(&document, &extractor, None::<&LlmAnswerer>).await
    }
}

/// Run extraction, segmentation and (optionally) answering over explicit
/// collaborators.
///
/// # Errors
/// - any extraction error from `extractor`
/// - [`ExamQaError::EmptyExtraction`] when the extracted text is blank
/// - [`ExamQaError::NoQuestions`] when `answerer` is given but no question
///   survived segmentation
/// - any answer error from `answerer`
pub async fn solve_document<E, A>(
    document: &Document,
    extractor: &E,
    answerer: Option<&A>,
) -> Result<SolveOutput, ExamQaError>
where
    E: TextExtractor,
    A: Answerer,
{
    info!("Solving '{}'", document.name);

    // ── Step 1: Extract text ─────────────────────────────────────────────
    let extract_start = Instant::now();
    let extracted = extractor.extract(document).await?;
    let extract_ms = extract_start.elapsed().as_millis() as u64;
    if extracted.is_blank() {
        return Err(ExamQaError::EmptyExtraction {
            name: document.name.clone(),
        });
    }
    debug!(
        "Extracted {} chars from {} page(s) in {}ms ({} via OCR)",
        extracted.text.chars().count(),
        extracted.page_count,
        extract_ms,
        extracted.ocr_pages.len()
    );

    // ── Step 2: Segment ──────────────────────────────────────────────────
    let questions = segment::segment(&extracted.text);
    info!("Found {} question(s)", questions.len());

    // ── Step 3: Answer the first question ────────────────────────────────
    let answer = match answerer {
        Some(a) => Some(answer_first(&questions, a).await?),
        None => None,
    };

    Ok(SolveOutput {
        questions,
        answer,
        extraction: ExtractionStats::from_extracted(&extracted, extract_ms),
    })
}

/// Answer the first question of `questions`.
///
/// The rest of the list is ignored.
pub async fn answer_first<A: Answerer>(
    questions: &[String],
    answerer: &A,
) -> Result<Answer, ExamQaError> {
    let first = questions.first().ok_or(ExamQaError::NoQuestions)?;
    answerer.answer(first).await
}

/// Answer one question directly with the default LLM answerer.
pub async fn answer_question(
    question: &str,
    config: &SolverConfig,
) -> Result<Answer, ExamQaError> {
    if question.trim().is_empty() {
        return Err(ExamQaError::NoQuestions);
    }
    LlmAnswerer::from_config(config.clone())?
        .answer(question)
        .await
}

/// Synchronous wrapper around [`solve`] (or [`extract_questions`] when
/// `answer` is false).
///
/// Creates a temporary tokio runtime internally.
pub fn solve_sync(
    input_str: impl AsRef<str>,
    answer: bool,
    config: &SolverConfig,
) -> Result<SolveOutput, ExamQaError> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| ExamQaError::Internal(format!("Failed to create tokio runtime: {}", e)))?;
    if answer {
        runtime.block_on(solve(input_str, config))
    } else {
        runtime.block_on(extract_questions(input_str, config))
    }
}

/// Pin the provider so OCR and answering share one client.
fn with_resolved_provider(config: &SolverConfig) -> Result<SolverConfig, ExamQaError> {
    let provider = resolve_provider(config)?;
    Ok(SolverConfig {
        provider: Some(provider),
        ..config.clone()
    })
}
