//! Configuration for extracting and answering exam questions.
//!
//! Every knob lives in [`SolverConfig`], built via [`SolverConfigBuilder`].
//! Segmentation has no knobs; the settings here drive the collaborators
//! around it: the pdfium text-layer walk, the vision-model OCR fallback for
//! scanned pages, and the LLM that answers a question.

use crate::error::ExamQaError;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::sync::Arc;

/// Default model when a provider is named but no model is.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Configuration for the extract → segment → answer pipeline.
///
/// # Example
/// ```rust
/// use exam_qa::SolverConfig;
///
/// let config = SolverConfig::builder()
///     .model("gpt-4.1-mini")
///     .max_retries(2)
///     .ocr_fallback(false)
///     .build()
///     .unwrap();
/// assert!(!config.ocr_fallback);
/// ```
#[derive(Clone)]
pub struct SolverConfig {
    /// LLM model identifier, e.g. "gpt-4.1-nano". If None, uses provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None along with `provider`, the provider is detected from the environment.
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Sampling temperature for answers. Default: 0.2.
    pub temperature: f32,

    /// Maximum tokens the LLM may generate for one answer. Default: 2048.
    pub max_tokens: usize,

    /// Maximum retry attempts on a transient LLM failure. Default: 3.
    ///
    /// Applies to both OCR calls and answer calls.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds, doubled after each attempt. Default: 500.
    pub retry_backoff_ms: u64,

    /// Custom system prompt for answering. If None, uses the built-in tutor prompt.
    pub answer_prompt: Option<String>,

    /// Custom system prompt for OCR. If None, uses the built-in transcription prompt.
    pub ocr_prompt: Option<String>,

    /// OCR pages whose PDF text layer is blank (scanned papers). Default: true.
    ///
    /// Image uploads are always OCR'd; this only controls the PDF fallback.
    pub ocr_fallback: bool,

    /// Rendering DPI for scanned pages sent to OCR. Range: 72–400. Default: 150.
    pub dpi: u32,

    /// Maximum rendered image dimension in pixels. Default: 2000.
    pub max_rendered_pixels: u32,

    /// Number of scanned pages OCR'd at once. Default: 4.
    pub concurrency: usize,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Per-LLM-call timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            provider: None,
            temperature: 0.2,
            max_tokens: 2048,
            max_retries: 3,
            retry_backoff_ms: 500,
            answer_prompt: None,
            ocr_prompt: None,
            ocr_fallback: true,
            dpi: 150,
            max_rendered_pixels: 2000,
            concurrency: 4,
            password: None,
            download_timeout_secs: 120,
            api_timeout_secs: 60,
        }
    }
}

impl fmt::Debug for SolverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("ocr_fallback", &self.ocr_fallback)
            .field("dpi", &self.dpi)
            .field("concurrency", &self.concurrency)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl SolverConfig {
    /// Create a new builder for `SolverConfig`.
    pub fn builder() -> SolverConfigBuilder {
        SolverConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`SolverConfig`].
#[derive(Debug)]
pub struct SolverConfigBuilder {
    config: SolverConfig,
}

impl SolverConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn answer_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.answer_prompt = Some(prompt.into());
        self
    }

    pub fn ocr_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.ocr_prompt = Some(prompt.into());
        self
    }

    pub fn ocr_fallback(mut self, v: bool) -> Self {
        self.config.ocr_fallback = v;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 400);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SolverConfig, ExamQaError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(ExamQaError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(ExamQaError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        if matches!(c.answer_prompt.as_deref(), Some(p) if p.trim().is_empty()) {
            return Err(ExamQaError::InvalidConfig(
                "answer prompt must not be blank".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = SolverConfig::default();
        assert_eq!(c.max_retries, 3);
        assert_eq!(c.dpi, 150);
        assert!(c.ocr_fallback);
        assert!(c.provider.is_none());
    }

    #[test]
    fn builder_clamps_ranges() {
        let c = SolverConfig::builder()
            .dpi(1000)
            .temperature(5.0)
            .concurrency(0)
            .build()
            .unwrap();
        assert_eq!(c.dpi, 400);
        assert_eq!(c.temperature, 2.0);
        assert_eq!(c.concurrency, 1);
    }

    #[test]
    fn builder_rejects_zero_max_tokens() {
        let err = SolverConfig::builder().max_tokens(0).build().unwrap_err();
        assert!(matches!(err, ExamQaError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_blank_answer_prompt() {
        let err = SolverConfig::builder()
            .answer_prompt("   ")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("answer prompt"));
    }

    #[test]
    fn debug_redacts_password() {
        let c = SolverConfig::builder().password("hunter2").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }
}
