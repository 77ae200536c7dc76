//! Pipeline stages for turning an exam paper into questions and an answer.
//!
//! Each submodule implements exactly one step, so each is independently
//! testable and only [`segment`] is on the path of every request.
//!
//! ## Data Flow
//!
//! ```text
//!                ┌─ pdf ───────────────┐
//! input ──▶ kind ┤   text layer        ├──▶ segment ──▶ llm (answer)
//! (path/URL)     │   └▶ encode ▶ ocr ──┤   (questions)
//!                └─ encode ▶ ocr ──────┘
//!                  (image upload)
//! ```
//!
//! 1. [`input`]  canonicalise a path or URL into an in-memory document
//! 2. [`pdf`]    text layer per page; rasterise blank (scanned) pages
//! 3. [`encode`] decode uploads, cap size, base64 PNG for the vision API
//! 4. [`ocr`]    vision-model transcription with retry/backoff
//! 5. [`postprocess`] clean OCR artefacts that would hide question markers
//! 6. [`segment`] split the text into questions (pure, infallible)
//! 7. [`llm`]    shared chat call with timeout, retry and backoff

pub mod encode;
pub mod input;
pub mod llm;
pub mod ocr;
pub mod pdf;
pub mod postprocess;
pub mod segment;
