//! # exam-qa
//!
//! Pull the individual questions out of an exam paper (PDF or photo) and
//! answer them one at a time with an LLM.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF / image
//!  │
//!  ├─ 1. Input    resolve local file or download from URL
//!  ├─ 2. Extract  pdfium text layer; vision-model OCR for scans and photos
//!  ├─ 3. Segment  trim header/footer, split at line-start question markers
//!  └─ 4. Answer   first question only, via gpt-4.1-nano / claude / gemini / …
//! ```
//!
//! Step 3 is a pure function, [`segment`], usable on its own:
//!
//! ```rust
//! let text = "Answer all questions.\n1. Define entropy in your own words.\n\
//!             2. State the second law of thermodynamics.\nQuestion Paper Ends";
//! let questions = exam_qa::segment(text);
//! assert_eq!(questions.len(), 2);
//! assert!(questions[1].starts_with("2. State"));
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use exam_qa::{solve, SolverConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / GEMINI_API_KEY
//!     let config = SolverConfig::default();
//!     let output = solve("paper.pdf", &config).await?;
//!     println!("{}", output.questions_text());
//!     if let Some(answer) = output.answer {
//!         println!("\nAnswer:\n{}", answer.text);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `exam-qa` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! exam-qa = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod answer;
pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod provider;
pub mod solve;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use answer::{Answerer, LlmAnswerer};
pub use config::{SolverConfig, SolverConfigBuilder, DEFAULT_MODEL};
pub use document::{detect_kind, Document, DocumentKind};
pub use error::ExamQaError;
pub use extract::{DocumentExtractor, TextExtractor};
pub use output::{Answer, ExtractedText, ExtractionStats, SolveOutput};
pub use pipeline::input::resolve_input;
pub use pipeline::segment::{candidate_spans, segment};
pub use provider::resolve_provider;
pub use solve::{
    answer_first, answer_question, extract_questions, solve, solve_bytes, solve_document,
    solve_sync,
};
